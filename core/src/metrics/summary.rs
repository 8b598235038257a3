//! Execution summary and latency percentiles

use serde::{Deserialize, Serialize};

use super::record::{good_fraction, ExecutionRecord};

/// Summary of all execution records of a run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionSummary {
    /// Records reported
    pub total: usize,
    /// Records that neither timed out nor failed
    pub good: usize,
    /// Records flagged as timed out
    pub timeouts: usize,
    /// Records flagged as failed
    pub failures: usize,
    /// `good / total`; `None` with no records, as in
    /// [`Exporter::good_fraction`](super::Exporter::good_fraction)
    pub good_fraction: Option<f64>,
    /// Latency distribution (µs)
    pub latency: LatencyPercentiles,
    /// Runtime distribution (µs)
    pub runtime: LatencyPercentiles,
}

impl ExecutionSummary {
    /// Summarize execution records
    pub fn from_records(records: &[ExecutionRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            good_fraction: good_fraction(records),
            latency: LatencyPercentiles::from_samples(records.iter().map(|r| r.latency)),
            runtime: LatencyPercentiles::from_samples(records.iter().map(|r| r.runtime)),
            ..Default::default()
        };
        for record in records {
            summary.good += usize::from(record.is_good());
            summary.timeouts += usize::from(record.timeout);
            summary.failures += usize::from(record.failed);
        }
        summary
    }
}

/// Percentiles of a sample (same unit as the input)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct LatencyPercentiles {
    /// Minimum value
    pub min: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 75th percentile
    pub p75: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
    /// Sample standard deviation
    pub stddev: f64,
}

impl LatencyPercentiles {
    /// Distribution of `samples` in any order; all zero when empty
    ///
    /// Percentiles interpolate linearly between the two closest ranks.
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = samples.into_iter().collect();
        let Some(last) = sorted.len().checked_sub(1) else {
            return Self::default();
        };
        sorted.sort_unstable_by(f64::total_cmp);

        let at = |q: f64| {
            let position = q * last as f64;
            let below = position.floor() as usize;
            let above = (below + 1).min(last);
            let weight = position - below as f64;
            sorted[below] + (sorted[above] - sorted[below]) * weight
        };

        // Welford's running mean and squared deviation
        let (mean, squared) = sorted
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(mean, squared), (i, &value)| {
                let delta = value - mean;
                let mean = mean + delta / (i + 1) as f64;
                (mean, squared + delta * (value - mean))
            });
        let stddev = if last > 0 {
            (squared / last as f64).sqrt()
        } else {
            0.0
        };

        Self {
            min: sorted[0],
            p50: at(0.50),
            p75: at(0.75),
            p90: at(0.90),
            p95: at(0.95),
            p99: at(0.99),
            max: sorted[last],
            mean,
            stddev,
        }
    }
}
