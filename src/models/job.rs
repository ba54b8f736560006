//! Job listing data structures.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Salary text used when a listing does not state one.
pub const SALARY_NEGOTIABLE: &str = "Razılaşma yolu ilə";

/// Contact phone used when a listing does not expose one.
pub const PHONE_PLACEHOLDER: &str = "+994 50 000 00 00";

/// Origin job board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "boss.az")]
    BossAz,
    #[serde(rename = "ejob.az")]
    EjobAz,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::BossAz => "boss.az",
            Source::EjobAz => "ejob.az",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of engagement a listing describes, decided by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Regular vacancy
    #[default]
    Standing,
    /// Short-term day labor with a start date and duration
    DailyGig,
}

/// A listing scraped from a job board and normalized to the shared schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedJob {
    pub source: Source,

    /// Absolute URL of the listing on its origin site
    pub source_url: String,

    /// Slug taken from the listing URL path (may be empty)
    pub source_id: String,

    pub title: String,

    /// Canonical category label
    pub category: String,

    /// Canonical location
    pub location: String,

    pub salary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default)]
    pub kind: ListingKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Category text as it appeared on the site
    #[serde(default)]
    pub raw_category: String,

    /// Location text as it appeared on the site
    #[serde(default)]
    pub raw_location: String,
}

impl NormalizedJob {
    /// Whether this listing is persisted as a daily job.
    pub fn is_daily(&self) -> bool {
        self.kind == ListingKind::DailyGig || self.start_date.is_some()
    }

    /// Key used to detect an already stored copy of this listing.
    pub fn dedup_key<'a>(&'a self, user_id: &'a str) -> DedupKey<'a> {
        DedupKey {
            title: &self.title,
            company: self.company.as_deref(),
            location: &self.location,
            user_id,
        }
    }
}

/// Lookup key for duplicate detection.
///
/// `company` only narrows the match when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupKey<'a> {
    pub title: &'a str,
    pub company: Option<&'a str>,
    pub location: &'a str,
    pub user_id: &'a str,
}

impl DedupKey<'_> {
    /// Check whether a stored record matches this key.
    pub fn matches(&self, job: &PersistedJob) -> bool {
        job.title == self.title
            && job.location == self.location
            && job.user_id == self.user_id
            && self
                .company
                .is_none_or(|company| job.company.as_deref() == Some(company))
    }
}

/// Persisted job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Standing,
    Daily,
}

/// Lifecycle status of a stored job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Active,
}

/// A job record as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedJob {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub user_id: String,
    pub job_type: JobType,
    pub source: Source,
    pub source_url: String,

    #[serde(default)]
    pub source_id: String,

    pub title: String,
    pub category: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub contact_phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default)]
    pub status: JobStatus,

    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersistedJob {
    /// Whether the record is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
