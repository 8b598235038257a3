//! Concurrent accumulator for invocation outcomes

use parking_lot::RwLock;

use super::record::{good_fraction, ExecutionRecord, MinuteInvocationRecord};
use super::summary::ExecutionSummary;

/// Append-only store of execution and per-minute invocation records
///
/// One exporter lives for one experiment run. Create it explicitly, wrap it
/// in an `Arc` and hand a clone to every reporter and reader. Appends take a
/// short write lock; every query reads under a single read lock, so it sees
/// a prefix of the reports and never a half-written record.
///
/// The two collections are independent: there is no ordering guarantee
/// between an execution report and an invocation report.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use faas_loader_core::metrics::{ExecutionRecord, Exporter};
///
/// let exporter = Arc::new(Exporter::new());
/// exporter.report_execution(ExecutionRecord {
///     timestamp: 10,
///     latency: 250.0,
///     ..Default::default()
/// });
/// assert_eq!(exporter.latency_record_len(), 1);
/// assert!(exporter.check_overload(0.9));
/// ```
#[derive(Debug, Default)]
pub struct Exporter {
    executions: RwLock<Vec<ExecutionRecord>>,
    invocations: RwLock<Vec<MinuteInvocationRecord>>,
}

impl Exporter {
    /// Create an empty exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome of one invocation
    pub fn report_execution(&self, record: ExecutionRecord) {
        self.executions.write().push(record);
    }

    /// Store one per-minute invocation marker
    pub fn report_invocation(&self, record: MinuteInvocationRecord) {
        self.invocations.write().push(record);
    }

    /// Number of execution records reported so far
    pub fn latency_record_len(&self) -> usize {
        self.executions.read().len()
    }

    /// Number of invocation records reported so far
    pub fn invocation_record_len(&self) -> usize {
        self.invocations.read().len()
    }

    /// Latencies of all execution records, ordered by ascending timestamp
    ///
    /// Records sharing a timestamp keep their report order.
    pub fn latencies_in_order(&self) -> Vec<f64> {
        let mut entries: Vec<(i64, f64)> = self
            .executions
            .read()
            .iter()
            .map(|r| (r.timestamp, r.latency))
            .collect();

        // stable: equal timestamps stay in report order
        entries.sort_by_key(|(timestamp, _)| *timestamp);
        entries.into_iter().map(|(_, latency)| latency).collect()
    }

    /// Fraction of execution records that neither timed out nor failed
    ///
    /// `None` when nothing has been reported yet.
    pub fn good_fraction(&self) -> Option<f64> {
        good_fraction(&self.executions.read())
    }

    /// Health check against `threshold`
    ///
    /// Returns `true` when the good-outcome fraction is **at least**
    /// `threshold`, i.e. `true` means the platform is keeping up, despite the
    /// name. With no execution records there is nothing below the threshold
    /// and the result is `true`.
    pub fn check_overload(&self, threshold: f64) -> bool {
        let healthy = self
            .good_fraction()
            .map_or(true, |fraction| fraction >= threshold);
        tracing::debug!(threshold, healthy, "Overload check");
        healthy
    }

    /// Copy of all execution records in report order
    pub fn snapshot(&self) -> Vec<ExecutionRecord> {
        self.executions.read().clone()
    }

    /// Copy of all invocation records in report order
    pub fn invocation_records(&self) -> Vec<MinuteInvocationRecord> {
        self.invocations.read().clone()
    }

    /// Counts and latency distribution of the execution records
    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary::from_records(&self.executions.read())
    }
}
