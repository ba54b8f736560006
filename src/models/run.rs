//! Run reporting aggregates.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Listing counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: usize,
    pub new: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl RunStats {
    /// Number of listings that reached a terminal counter.
    pub fn accounted(&self) -> usize {
        self.new + self.duplicates + self.failed
    }
}

impl AddAssign for RunStats {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.new += rhs.new;
        self.duplicates += rhs.duplicates;
        self.failed += rhs.failed;
    }
}

/// Outcome of one source run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub source: String,
    pub success: bool,
    pub errors: Vec<String>,
    pub stats: RunStats,

    /// Status code that made the extractor stop early, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_status: Option<u16>,
}

impl RunResult {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

/// Aggregate over every source of a run.
///
/// `success == false` with non-zero counters is a partial success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: bool,
    pub sources: usize,
    pub stats: RunStats,
    pub results: Vec<RunResult>,
}

impl From<Vec<RunResult>> for RunSummary {
    fn from(results: Vec<RunResult>) -> Self {
        let mut stats = RunStats::default();
        for result in &results {
            stats += result.stats;
        }
        Self {
            success: results.iter().all(|r| r.success),
            sources: results.len(),
            stats,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_sums_stats_and_ands_success() {
        let mut ok = RunResult::new("boss.az");
        ok.success = true;
        ok.stats = RunStats {
            total: 3,
            new: 2,
            duplicates: 1,
            failed: 0,
        };

        let mut partial = RunResult::new("ejob.az/vacancies");
        partial.stats = RunStats {
            total: 2,
            new: 1,
            duplicates: 0,
            failed: 1,
        };

        let summary = RunSummary::from(vec![ok, partial]);
        assert!(!summary.success);
        assert_eq!(summary.sources, 2);
        assert_eq!(summary.stats.total, 5);
        assert_eq!(summary.stats.new, 3);
        assert_eq!(summary.stats.accounted(), 5);
    }

    #[test]
    fn test_empty_summary_is_success() {
        let summary = RunSummary::from(Vec::new());
        assert!(summary.success);
        assert_eq!(summary.stats, RunStats::default());
    }
}
