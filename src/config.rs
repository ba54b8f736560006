// src/config.rs

//! Configuration loading and run credentials.
//!
//! Tunables come from `config.toml`; identities and secrets come from the
//! environment so they never land in the config file.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::Config;

pub const ENV_OPERATOR_USER_ID: &str = "OPERATOR_USER_ID";
pub const ENV_PARSER_SECRET: &str = "PARSER_SECRET";
pub const ENV_STORE_URL: &str = "STORE_URL";
pub const ENV_STORE_SERVICE_KEY: &str = "STORE_SERVICE_KEY";
/// Token a trigger presents to `run`, checked against `PARSER_SECRET`
pub const ENV_PARSER_TOKEN: &str = "PARSER_TOKEN";

/// Secrets and identities a run needs.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Account every persisted job is attributed to
    pub operator_id: String,
    /// Shared secret a trigger must present
    pub trigger_secret: Option<String>,
    pub store_url: Option<String>,
    pub store_key: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let operator_id = get(ENV_OPERATOR_USER_ID)
            .ok_or_else(|| AppError::config(format!("{ENV_OPERATOR_USER_ID} is not set")))?;

        Ok(Self {
            operator_id,
            trigger_secret: get(ENV_PARSER_SECRET),
            store_url: get(ENV_STORE_URL),
            store_key: get(ENV_STORE_SERVICE_KEY),
        })
    }

    /// Store URL and service key, required by the REST backend.
    pub fn require_store(&self) -> Result<(&str, &str)> {
        match (self.store_url.as_deref(), self.store_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(AppError::config(format!(
                "{ENV_STORE_URL} and {ENV_STORE_SERVICE_KEY} are required for the rest backend"
            ))),
        }
    }

    /// Check a trigger's bearer token against the shared secret.
    ///
    /// Accepts the raw token or a full `Bearer <token>` header value. Always
    /// false when no secret is configured.
    pub fn authorize(&self, token: &str) -> bool {
        let Some(secret) = self.trigger_secret.as_deref() else {
            return false;
        };
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        !token.is_empty() && token == secret
    }

    /// Gate a triggered run.
    ///
    /// Open when no secret is configured (local runs); otherwise the token
    /// must pass [`Credentials::authorize`].
    pub fn check_trigger(&self, token: Option<&str>) -> Result<()> {
        if self.trigger_secret.is_none() {
            return Ok(());
        }
        match token {
            Some(token) if self.authorize(token) => Ok(()),
            Some(_) => Err(AppError::unauthorized("trigger token does not match")),
            None => Err(AppError::unauthorized(format!(
                "{ENV_PARSER_SECRET} is set but no {ENV_PARSER_TOKEN} was presented"
            ))),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("operator_id", &self.operator_id)
            .field("trigger_secret", &self.trigger_secret.as_ref().map(|_| "***"))
            .field("store_url", &self.store_url)
            .field("store_key", &self.store_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Which credentials are configured, without their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialPresence {
    pub operator_id: bool,
    pub trigger_secret: bool,
    pub store_url: bool,
    pub store_key: bool,
}

impl CredentialPresence {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |name: &str| lookup(name).is_some_and(|v| !v.trim().is_empty());
        Self {
            operator_id: set(ENV_OPERATOR_USER_ID),
            trigger_secret: set(ENV_PARSER_SECRET),
            store_url: set(ENV_STORE_URL),
            store_key: set(ENV_STORE_SERVICE_KEY),
        }
    }
}

impl fmt::Display for CredentialPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |set: bool| if set { "set" } else { "missing" };
        write!(
            f,
            "operator_id={} trigger_secret={} store_url={} store_key={}",
            state(self.operator_id),
            state(self.trigger_secret),
            state(self.store_url),
            state(self.store_key)
        )
    }
}

/// Load configuration from a TOML file.
///
/// A missing file falls back to defaults; a file that exists but does not
/// parse is an error. The result is validated either way.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)?
    } else {
        log::warn!("No config at {:?}, using defaults", path);
        Config::default()
    };
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid config {path:?}: {e}")))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_operator_is_config_error() {
        let err = Credentials::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Credentials::from_lookup(lookup(&[(ENV_OPERATOR_USER_ID, "  ")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_full_credentials() {
        let creds = Credentials::from_lookup(lookup(&[
            (ENV_OPERATOR_USER_ID, "op-7"),
            (ENV_PARSER_SECRET, "s3cret"),
            (ENV_STORE_URL, "https://db.example.com"),
            (ENV_STORE_SERVICE_KEY, "service"),
        ]))
        .unwrap();

        assert_eq!(creds.operator_id, "op-7");
        assert_eq!(
            creds.require_store().unwrap(),
            ("https://db.example.com", "service")
        );
        assert!(!format!("{creds:?}").contains("s3cret"));
    }

    #[test]
    fn test_require_store_without_credentials() {
        let creds = Credentials::from_lookup(lookup(&[(ENV_OPERATOR_USER_ID, "op")])).unwrap();
        assert!(creds.require_store().is_err());
    }

    #[test]
    fn test_authorize() {
        let creds = Credentials {
            operator_id: "op".to_string(),
            trigger_secret: Some("s3cret".to_string()),
            ..Credentials::default()
        };
        assert!(creds.authorize("Bearer s3cret"));
        assert!(creds.authorize("s3cret"));
        assert!(!creds.authorize("Bearer wrong"));
        assert!(!creds.authorize(""));

        let open = Credentials::default();
        assert!(!open.authorize("Bearer anything"));
    }

    #[test]
    fn test_check_trigger() {
        let guarded = Credentials {
            operator_id: "op".to_string(),
            trigger_secret: Some("s3cret".to_string()),
            ..Credentials::default()
        };
        assert!(guarded.check_trigger(Some("Bearer s3cret")).is_ok());
        assert!(matches!(
            guarded.check_trigger(Some("nope")),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            guarded.check_trigger(None),
            Err(AppError::Unauthorized(_))
        ));

        let local = Credentials {
            operator_id: "op".to_string(),
            ..Credentials::default()
        };
        assert!(local.check_trigger(None).is_ok());
        assert!(local.check_trigger(Some("anything")).is_ok());
    }

    #[test]
    fn test_credential_presence_hides_values() {
        let presence = CredentialPresence::from_lookup(lookup(&[
            (ENV_OPERATOR_USER_ID, "op-7"),
            (ENV_PARSER_SECRET, "s3cret"),
            (ENV_STORE_URL, " "),
        ]));

        assert!(presence.operator_id);
        assert!(presence.trigger_secret);
        assert!(!presence.store_url);
        assert!(!presence.store_key);

        let line = presence.to_string();
        assert_eq!(
            line,
            "operator_id=set trigger_secret=set store_url=missing store_key=missing"
        );
        assert!(!line.contains("s3cret"));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.sites.len(), 3);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rate_limit]\nmin_delay_ms = 5000\nmax_delay_ms = 1000").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
