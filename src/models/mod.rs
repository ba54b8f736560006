// src/models/mod.rs

//! Domain models for the job scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod job;
mod run;
mod selectors;

// Re-export all public types
pub use config::{Config, CrawlerConfig, RateLimitConfig, StorageBackend, StorageConfig};
pub use job::{
    DedupKey, JobStatus, JobType, ListingKind, NormalizedJob, PHONE_PLACEHOLDER, PersistedJob,
    SALARY_NEGOTIABLE, Source,
};
pub use run::{RunResult, RunStats, RunSummary};
pub use selectors::{DetailSelectors, FieldRule, ListingSelectors, Pick, SiteProfile};
