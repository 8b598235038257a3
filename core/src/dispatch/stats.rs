//! Dispatch statistics tracking

use std::time::Duration;

use tokio::time::Instant;

use crate::metrics::ExecutionRecord;

/// Statistics tracked by each stream worker
#[derive(Debug, Default, Clone)]
pub struct DispatchStats {
    /// Invocations issued
    pub issued: usize,

    /// Invocations that returned successfully
    pub completed: usize,

    /// Invocations that returned an error
    pub failed: usize,

    /// Invocations that exceeded their deadline
    pub timed_out: usize,

    /// Invocations issued per experiment minute
    pub per_minute_issued: Vec<usize>,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl DispatchStats {
    /// Create empty stats covering `duration_minutes`
    pub fn new(duration_minutes: usize) -> Self {
        Self {
            per_minute_issued: vec![0; duration_minutes],
            ..Default::default()
        }
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Record one issued invocation scheduled in `minute`
    pub fn record_issued(&mut self, minute: usize) {
        self.issued += 1;
        if let Some(count) = self.per_minute_issued.get_mut(minute) {
            *count += 1;
        }
    }

    /// Record the outcome of an issued invocation
    pub fn record_outcome(&mut self, record: &ExecutionRecord) {
        if record.timeout {
            self.timed_out += 1;
        } else if record.failed {
            self.failed += 1;
        } else {
            self.completed += 1;
        }
    }

    /// Invocations whose outcome is known
    pub fn finished(&self) -> usize {
        self.completed + self.failed + self.timed_out
    }

    /// Fraction of finished invocations that completed (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.finished() == 0 {
            0.0
        } else {
            self.completed as f64 / self.finished() as f64
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Merge stats from another worker
    pub fn merge(&mut self, other: &DispatchStats) {
        self.issued += other.issued;
        self.completed += other.completed;
        self.failed += other.failed;
        self.timed_out += other.timed_out;

        if self.per_minute_issued.len() < other.per_minute_issued.len() {
            self.per_minute_issued
                .resize(other.per_minute_issued.len(), 0);
        }
        for (total, count) in self
            .per_minute_issued
            .iter_mut()
            .zip(&other.per_minute_issued)
        {
            *total += count;
        }
    }
}
