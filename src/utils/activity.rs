// src/utils/activity.rs

//! Structured activity lines.
//!
//! Every significant pipeline step is reported as one JSON object
//! `{timestamp, source, action, details}` on the `jobscout::activity` log
//! target, so the sink (env_logger locally, anything else in deployment)
//! decides where it goes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Log target for activity lines.
pub const TARGET: &str = "jobscout::activity";

/// One activity line.
#[derive(Debug, Clone, Serialize)]
pub struct Activity<'a> {
    pub timestamp: DateTime<Utc>,
    pub source: &'a str,
    pub action: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl<'a> Activity<'a> {
    pub fn new(source: &'a str, action: &'a str, details: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            source,
            action,
            details,
        }
    }

    /// Render as a single JSON line.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("[{}] [{}] {}", self.timestamp, self.source, self.action))
    }
}

/// Emit an info-level activity line.
pub fn record(source: &str, action: &str, details: Value) {
    if log::log_enabled!(target: TARGET, log::Level::Info) {
        log::info!(target: TARGET, "{}", Activity::new(source, action, details).to_line());
    }
}

/// Emit a warn-level activity line.
pub fn warn(source: &str, action: &str, details: Value) {
    if log::log_enabled!(target: TARGET, log::Level::Warn) {
        log::warn!(target: TARGET, "{}", Activity::new(source, action, details).to_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_line_shape() {
        let details = json!({ "title": "Sürücü" });
        let line = Activity::new("boss.az", "Parsed job", details).to_line();
        let parsed: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["source"], "boss.az");
        assert_eq!(parsed["action"], "Parsed job");
        assert_eq!(parsed["details"]["title"], "Sürücü");
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn test_null_details_are_omitted() {
        let line = Activity::new("ejob.az", "Starting parse", Value::Null).to_line();
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert!(parsed.get("details").is_none());
    }
}
