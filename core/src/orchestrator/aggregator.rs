//! Result aggregation from multiple stream workers

use std::time::Duration;

use crate::dispatch::DispatchStats;

/// Aggregated statistics from all stream workers
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Number of workers that completed
    pub total_workers: usize,

    /// Total invocations issued
    pub total_issued: usize,

    /// Total successful invocations
    pub total_completed: usize,

    /// Total failed invocations
    pub total_failed: usize,

    /// Total timed-out invocations
    pub total_timed_out: usize,

    /// Invocations issued per experiment minute, over all workers
    pub per_minute_issued: Vec<usize>,

    /// Maximum duration across all workers
    pub total_duration: Duration,

    /// Overall issued invocations per second
    pub issued_per_second: f64,
}

impl AggregatedStats {
    /// Invocations whose outcome is known
    pub fn total_finished(&self) -> usize {
        self.total_completed + self.total_failed + self.total_timed_out
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let total = self.total_finished();
        if total > 0 {
            self.total_completed as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Aggregate statistics from multiple stream workers
pub fn aggregate_dispatch_stats(stats: &[DispatchStats]) -> AggregatedStats {
    if stats.is_empty() {
        return AggregatedStats::default();
    }

    let mut merged = DispatchStats::default();
    for worker in stats {
        merged.merge(worker);
    }

    // Use the maximum elapsed time across all workers
    let total_duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = total_duration.as_secs_f64();
    let issued_per_second = if secs > 0.0 {
        merged.issued as f64 / secs
    } else {
        0.0
    };

    AggregatedStats {
        total_workers: stats.len(),
        total_issued: merged.issued,
        total_completed: merged.completed,
        total_failed: merged.failed,
        total_timed_out: merged.timed_out,
        per_minute_issued: merged.per_minute_issued,
        total_duration,
        issued_per_second,
    }
}
