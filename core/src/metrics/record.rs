//! Records reported into the exporter

use serde::{Deserialize, Serialize};

/// Outcome of one real invocation
///
/// `timestamp` is in microseconds since the Unix epoch; `latency` and
/// `runtime` are in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// When the invocation was issued
    pub timestamp: i64,

    /// End-to-end latency observed by the caller
    pub latency: f64,

    /// Execution time reported by the function
    pub runtime: f64,

    /// The call exceeded its deadline
    pub timeout: bool,

    /// The call returned an error
    pub failed: bool,
}

impl ExecutionRecord {
    /// Good outcome: neither timed out nor failed
    pub fn is_good(&self) -> bool {
        !self.timeout && !self.failed
    }
}

/// Fraction of `records` that are good outcomes
///
/// `None` for an empty slice: with no data there is no fraction, and callers
/// decide what that means for them.
pub fn good_fraction(records: &[ExecutionRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let good = records.iter().filter(|r| r.is_good()).count();
    Some(good as f64 / records.len() as f64)
}

/// Per-minute invocation marker
///
/// The exporter only counts these; the fields are filled in by whichever
/// driver reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinuteInvocationRecord {
    /// Experiment minute index
    pub minute: usize,

    /// Arrivals scheduled for this minute
    pub target: usize,

    /// Invocations actually issued during this minute
    pub issued: usize,
}
