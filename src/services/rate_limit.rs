// src/services/rate_limit.rs

//! Request pacing, client identity rotation and the blocking-status rule.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::{Config, RateLimitConfig};

/// Suspends the caller between requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait somewhere in `[min_ms, max_ms]` milliseconds.
    async fn pace(&self, min_ms: u64, max_ms: u64);
}

/// Sleeps for a uniformly random duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPacer;

#[async_trait]
impl Pacer for RandomPacer {
    async fn pace(&self, min_ms: u64, max_ms: u64) {
        let delay = random_delay_ms(min_ms, max_ms);
        log::debug!("Pacing {} ms", delay);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// Never waits. For tests and dry runs against local fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pace(&self, _min_ms: u64, _max_ms: u64) {}
}

/// Uniform random delay in `[min_ms, max_ms]`; swapped bounds are tolerated.
pub fn random_delay_ms(min_ms: u64, max_ms: u64) -> u64 {
    let (lo, hi) = if min_ms <= max_ms {
        (min_ms, max_ms)
    } else {
        (max_ms, min_ms)
    };
    rand::rng().random_range(lo..=hi)
}

/// Rate and identity policy shared by every extractor of a run.
#[derive(Clone)]
pub struct RatePolicy {
    config: RateLimitConfig,
    identities: Vec<String>,
    pacer: Arc<dyn Pacer>,
}

impl RatePolicy {
    pub fn new(config: RateLimitConfig, identities: Vec<String>, pacer: Arc<dyn Pacer>) -> Self {
        let identities = identities
            .into_iter()
            .filter(|ua| !ua.trim().is_empty())
            .collect();
        Self {
            config,
            identities,
            pacer,
        }
    }

    /// Policy with random pacing, from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rate_limit.clone(),
            config.crawler.identities.clone(),
            Arc::new(RandomPacer),
        )
    }

    /// Replace the pacer.
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Pick a client identity uniformly at random.
    pub fn pick_identity(&self) -> String {
        self.identities
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| format!("jobscout/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Wait a random delay within explicit bounds.
    pub async fn pace_between(&self, min_ms: u64, max_ms: u64) {
        self.pacer.pace(min_ms, max_ms).await;
    }

    /// Wait before retrying a failed fetch.
    pub async fn pace_retry(&self) {
        let delay = self.config.retry_delay_ms;
        self.pacer.pace(delay, delay).await;
    }

    /// Whether `status` means the site is throttling or banning us.
    pub fn should_abort(&self, status: u16) -> bool {
        self.config.stop_on_status.contains(&status)
    }
}

impl std::fmt::Debug for RatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatePolicy")
            .field("config", &self.config)
            .field("identities", &self.identities.len())
            .finish()
    }
}
