//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SiteProfile;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Pacing, caps and blocking statuses
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Persistence backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Site profiles, in run order
    #[serde(default = "SiteProfile::defaults")]
    pub sites: Vec<SiteProfile>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.identities.iter().all(|ua| ua.trim().is_empty()) {
            return Err(AppError::validation("crawler.identities is empty"));
        }
        if self.rate_limit.timeout_ms == 0 {
            return Err(AppError::validation("rate_limit.timeout_ms must be > 0"));
        }
        if self.rate_limit.min_delay_ms > self.rate_limit.max_delay_ms {
            return Err(AppError::validation(
                "rate_limit.min_delay_ms must not exceed rate_limit.max_delay_ms",
            ));
        }
        if self.rate_limit.max_listings == 0 {
            return Err(AppError::validation("rate_limit.max_listings must be > 0"));
        }
        if self.storage.expiry_days <= 0 {
            return Err(AppError::validation("storage.expiry_days must be > 0"));
        }
        if self.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        for (i, site) in self.sites.iter().enumerate() {
            if self.sites[..i].iter().any(|other| other.key == site.key) {
                return Err(AppError::validation(format!(
                    "Duplicate site key '{}'",
                    site.key
                )));
            }
            url::Url::parse(&site.index_url)?;
            url::Url::parse(&site.base_url)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::default(),
            sites: SiteProfile::defaults(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Browser User-Agent pool rotated per run
    #[serde(default = "defaults::identities")]
    pub identities: Vec<String>,

    /// Accept-Language header sent with every request
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Optional proxy, `host:port` or a full URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            identities: defaults::identities(),
            accept_language: defaults::accept_language(),
            proxy: None,
        }
    }
}

/// Request pacing and abort rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Lower bound of the delay between requests
    #[serde(default = "defaults::min_delay")]
    pub min_delay_ms: u64,

    /// Upper bound of the delay between requests
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,

    /// Listing cap per source per run
    #[serde(default = "defaults::max_listings")]
    pub max_listings: usize,

    /// Retries for a failed index page fetch
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Delay between index page retries
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Request timeout
    #[serde(default = "defaults::timeout")]
    pub timeout_ms: u64,

    /// Status codes that mean the site is throttling or banning us
    #[serde(default = "defaults::stop_on_status")]
    pub stop_on_status: Vec<u16>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: defaults::min_delay(),
            max_delay_ms: defaults::max_delay(),
            max_listings: defaults::max_listings(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay(),
            timeout_ms: defaults::timeout(),
            stop_on_status: defaults::stop_on_status(),
        }
    }
}

/// Which persistence gateway to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file under `local_dir`
    #[default]
    Local,
    /// Hosted table API, credentials from the environment
    Rest,
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory of the local JSON store
    #[serde(default = "defaults::local_dir")]
    pub local_dir: PathBuf,

    /// Table name for the REST backend
    #[serde(default = "defaults::table")]
    pub table: String,

    /// Days a job stays active after its last sighting
    #[serde(default = "defaults::expiry_days")]
    pub expiry_days: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            local_dir: defaults::local_dir(),
            table: defaults::table(),
            expiry_days: defaults::expiry_days(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn identities() -> Vec<String> {
        [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.0.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
            "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn accept_language() -> String {
        "az-AZ,az;q=0.9,en;q=0.8".into()
    }

    // Rate limit defaults
    pub fn min_delay() -> u64 {
        2000
    }
    pub fn max_delay() -> u64 {
        4000
    }
    pub fn max_listings() -> usize {
        5
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        5000
    }
    pub fn timeout() -> u64 {
        30_000
    }
    pub fn stop_on_status() -> Vec<u16> {
        vec![403, 429, 503]
    }

    // Storage defaults
    pub fn local_dir() -> PathBuf {
        PathBuf::from("storage")
    }
    pub fn table() -> String {
        "jobs".into()
    }
    pub fn expiry_days() -> i64 {
        30
    }
}
