//! Local filesystem job store.
//!
//! All records live in one JSON array, rewritten atomically on every change.
//! Used for development, dry runs and tests; hosted deployments use
//! [`RestStore`](super::RestStore).
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── jobs.json        # every PersistedJob ever inserted
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{DedupKey, JobType, PersistedJob};
use crate::storage::{JobStore, expiry_from};

const JOBS_KEY: &str = "jobs.json";

/// Counts over the stored records, for `info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub standing: usize,
    pub daily: usize,
}

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    expiry_days: i64,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, expiry_days: i64) -> Self {
        Self {
            root_dir: root_dir.into(),
            expiry_days,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every stored record, oldest first.
    pub async fn load_all(&self) -> Result<Vec<PersistedJob>> {
        Ok(self.read_json(JOBS_KEY).await?.unwrap_or_default())
    }

    /// Record counts as of `now`.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats> {
        let jobs = self.load_all().await?;
        let mut stats = StoreStats {
            total: jobs.len(),
            ..StoreStats::default()
        };
        for job in &jobs {
            if job.is_expired(now) {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
            match job.job_type {
                JobType::Standing => stats.standing += 1,
                JobType::Daily => stats.daily += 1,
            }
        }
        Ok(stats)
    }
}

/// Stable id for a record: SHA-256 over its dedup fields.
pub fn record_id(job: &PersistedJob) -> String {
    let mut hasher = Sha256::new();
    for part in [
        job.title.as_str(),
        job.company.as_deref().unwrap_or_default(),
        job.location.as_str(),
        job.user_id.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

#[async_trait]
impl JobStore for LocalStorage {
    async fn insert(&self, job: &PersistedJob) -> Result<String> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.load_all().await?;

        let id = job.id.clone().unwrap_or_else(|| record_id(job));
        if jobs.iter().any(|j| j.id.as_deref() == Some(id.as_str())) {
            return Err(AppError::store(format!("record {id} already exists")));
        }

        let mut record = job.clone();
        record.id = Some(id.clone());
        jobs.push(record);
        self.write_json(JOBS_KEY, &jobs).await?;

        log::debug!("Inserted {} into {}", id, self.path(JOBS_KEY).display());
        Ok(id)
    }

    async fn find_existing(&self, key: &DedupKey<'_>) -> Result<Option<String>> {
        let jobs = self.load_all().await?;
        Ok(jobs
            .into_iter()
            .find(|job| key.matches(job))
            .map(|job| job.id.clone().unwrap_or_else(|| record_id(&job))))
    }

    async fn refresh_expiration(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.load_all().await?;

        let job = jobs
            .iter_mut()
            .find(|j| j.id.as_deref() == Some(id))
            .ok_or_else(|| AppError::store(format!("no record with id {id}")))?;

        let now = Utc::now();
        job.expires_at = expiry_from(now, self.expiry_days);
        job.updated_at = now;

        self.write_json(JOBS_KEY, &jobs).await
    }
}
