// src/pipeline/orchestrator.rs

//! Scrape, dedup and persist pipeline.
//!
//! Sources run strictly one after another and listings within a source one
//! after another. A failing listing is counted and the run moves on.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::json;

use crate::config::Credentials;
use crate::error::{AppError, Result};
use crate::models::{Config, NormalizedJob, RunResult, RunSummary, SiteProfile};
use crate::pipeline::transform::transform;
use crate::services::{ExtractOptions, ExtractOutcome, RatePolicy, SiteExtractor};
use crate::storage::JobStore;
use crate::utils::activity;
use crate::utils::http::{HttpFetcher, PageFetcher};

/// Which configured sources a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSelector {
    #[default]
    All,
    /// One site profile by key (`boss`, `ejob-vac`, `ejob-muzdlu`, ...)
    Site(String),
}

impl SourceSelector {
    /// Resolve against the configured profiles, in run order.
    pub fn select<'a>(&self, sites: &'a [SiteProfile]) -> Result<Vec<&'a SiteProfile>> {
        match self {
            SourceSelector::All => Ok(sites.iter().collect()),
            SourceSelector::Site(key) => sites
                .iter()
                .find(|s| &s.key == key)
                .map(|s| vec![s])
                .ok_or_else(|| {
                    let known: Vec<&str> = sites.iter().map(|s| s.key.as_str()).collect();
                    AppError::config(format!(
                        "Unknown source '{key}'. Expected all, {}",
                        known.join(", ")
                    ))
                }),
        }
    }
}

impl FromStr for SourceSelector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(AppError::config("source selector is empty")),
            "all" => Ok(SourceSelector::All),
            key => Ok(SourceSelector::Site(key.to_string())),
        }
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelector::All => f.write_str("all"),
            SourceSelector::Site(key) => f.write_str(key),
        }
    }
}

/// How one listing was persisted.
enum Persisted {
    New(String),
    Duplicate(String),
}

/// Drives extractors and persists what they find.
pub struct Pipeline {
    config: Config,
    operator_id: String,
    store: Arc<dyn JobStore>,
    fetcher: Arc<dyn PageFetcher>,
    policy: RatePolicy,
    options: ExtractOptions,
}

impl Pipeline {
    pub fn new(
        config: Config,
        operator_id: impl Into<String>,
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn PageFetcher>,
        policy: RatePolicy,
    ) -> Self {
        let options = ExtractOptions::from_config(&config.rate_limit);
        Self {
            config,
            operator_id: operator_id.into(),
            store,
            fetcher,
            policy,
            options,
        }
    }

    /// Production pipeline: HTTP fetcher, random pacing, configured store.
    pub fn from_config(
        config: Config,
        credentials: &Credentials,
        store: Arc<dyn JobStore>,
        options: ExtractOptions,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(
            &config.crawler,
            &config.rate_limit,
            options.proxy.as_deref(),
        )?;
        let policy = RatePolicy::from_config(&config);
        Ok(
            Self::new(config, &credentials.operator_id, store, Arc::new(fetcher), policy)
                .with_options(options),
        )
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the extractor for one site profile.
    pub fn extractor(&self, profile: &SiteProfile) -> Result<SiteExtractor> {
        SiteExtractor::new(profile.clone(), self.fetcher.clone(), self.policy.clone())
    }

    /// Scrape one site without touching the store.
    pub async fn extract_site(&self, profile: &SiteProfile) -> Result<ExtractOutcome> {
        Ok(self.extractor(profile)?.extract(&self.options).await)
    }

    /// Run every configured source.
    pub async fn run_all(&self) -> RunSummary {
        let mut results = Vec::with_capacity(self.config.sites.len());
        for profile in &self.config.sites {
            results.push(self.run_site(profile).await);
        }
        RunSummary::from(results)
    }

    /// Run the sources a selector names.
    pub async fn run_selected(&self, selector: &SourceSelector) -> Result<RunSummary> {
        let profiles = selector.select(&self.config.sites)?;
        let mut results = Vec::with_capacity(profiles.len());
        for profile in profiles {
            results.push(self.run_site(profile).await);
        }
        Ok(RunSummary::from(results))
    }

    /// Extract one site profile and persist its listings.
    pub async fn run_site(&self, profile: &SiteProfile) -> RunResult {
        let extract = async move { self.extract_site(profile).await }.boxed();
        self.run_source(&profile.name, extract).await
    }

    /// Persist whatever `extract` produces under the source name `name`.
    ///
    /// An `Err` from `extract` marks the source failed. Page-level errors
    /// inside the outcome are recorded but leave it successful.
    pub async fn run_source(
        &self,
        name: &str,
        extract: BoxFuture<'_, Result<ExtractOutcome>>,
    ) -> RunResult {
        let mut result = RunResult::new(name);
        activity::record(name, "Starting parse", json!({ "operator": self.operator_id }));

        let outcome = match extract.await {
            Ok(outcome) => outcome,
            Err(e) => {
                activity::warn(name, "Scraper error", json!({ "error": e.to_string() }));
                result.errors.push(format!("Scraper error: {e}"));
                return result;
            }
        };

        result.success = true;
        result.blocked_status = outcome.blocked_status;
        if let Some(error) = outcome.error {
            result.errors.push(error);
        }
        result.stats.total = outcome.jobs.len();

        for job in &outcome.jobs {
            match self.persist(job).await {
                Ok(Persisted::New(id)) => {
                    result.stats.new += 1;
                    activity::record(name, "Inserted job", json!({ "title": job.title, "id": id }));
                }
                Ok(Persisted::Duplicate(id)) => {
                    result.stats.duplicates += 1;
                    activity::record(
                        name,
                        "Duplicate found",
                        json!({ "title": job.title, "id": id }),
                    );
                }
                Err(message) => {
                    result.stats.failed += 1;
                    activity::warn(name, "Listing failed", json!({ "error": message }));
                    result.errors.push(message);
                }
            }
        }

        activity::record(
            name,
            "Parse completed",
            json!({
                "stats": result.stats,
                "errors": result.errors.len(),
                "blocked_status": result.blocked_status,
            }),
        );
        result
    }

    /// Dedup one listing against the store, then refresh or insert it.
    async fn persist(&self, job: &NormalizedJob) -> std::result::Result<Persisted, String> {
        let processing = |e: AppError| format!("Error processing {}: {e}", job.title);

        let existing = self
            .store
            .find_existing(&job.dedup_key(&self.operator_id))
            .await
            .map_err(processing)?;

        if let Some(id) = existing {
            self.store
                .refresh_expiration(&id)
                .await
                .map_err(processing)?;
            return Ok(Persisted::Duplicate(id));
        }

        let record = transform(
            job,
            &self.operator_id,
            Utc::now(),
            self.config.storage.expiry_days,
        );
        self.store
            .insert(&record)
            .await
            .map(Persisted::New)
            .map_err(|e| format!("Failed to insert: {} - {e}", job.title))
    }
}
