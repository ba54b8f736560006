//! Persistence gateway for scraped jobs.
//!
//! The pipeline only sees [`JobStore`]. Two backends implement it:
//!
//! ```text
//! local  {local_dir}/jobs.json           JSON array, atomic rewrites
//! rest   {STORE_URL}/rest/v1/{table}      PostgREST-style table API
//! ```

pub mod local;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::config::Credentials;
use crate::error::Result;
use crate::models::{DedupKey, PersistedJob, StorageBackend, StorageConfig};

// Re-export for convenience
pub use local::LocalStorage;
pub use rest::RestStore;

/// Store-facing boundary of the pipeline.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new record, returning its id.
    async fn insert(&self, job: &PersistedJob) -> Result<String>;

    /// Id of a stored record matching the dedup key.
    async fn find_existing(&self, key: &DedupKey<'_>) -> Result<Option<String>>;

    /// Push a record's expiry forward from now.
    async fn refresh_expiration(&self, id: &str) -> Result<()>;
}

/// Expiry timestamp for a record touched at `now`.
pub fn expiry_from(now: DateTime<Utc>, expiry_days: i64) -> DateTime<Utc> {
    now + Duration::days(expiry_days)
}

/// Build the configured backend.
pub fn open_store(config: &StorageConfig, credentials: &Credentials) -> Result<Arc<dyn JobStore>> {
    match config.backend {
        StorageBackend::Local => {
            log::info!("Using local job store at {}", config.local_dir.display());
            Ok(Arc::new(LocalStorage::new(&config.local_dir, config.expiry_days)))
        }
        StorageBackend::Rest => {
            let (url, key) = credentials.require_store()?;
            log::info!("Using REST job store at {}", url);
            Ok(Arc::new(RestStore::new(url, key, &config.table, config.expiry_days)?))
        }
    }
}
