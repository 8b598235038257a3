//! Inter-arrival time (IAT) trace synthesis
//!
//! A trace is a set of [`ArrivalStream`]s. Each stream carries an IAT array in
//! microseconds (element 0 is the offset from experiment start, the rest are
//! deltas between consecutive arrivals) and the number of arrivals that land
//! in every experiment minute.
//!
//! - [`generate_warm_start`] produces one stream at a constant target rate.
//! - [`generate_cold_start`] produces `ceil(rps * cooldown)` phase-offset
//!   streams. Every stream idles at least `cooldown` seconds between its own
//!   arrivals, so each call lands on an evicted execution environment, while
//!   the union of all streams approximates the target rate.
//!
//! Both generators are pure: no clocks, no randomness, no shared state.
//!
//! # Example
//!
//! ```
//! use faas_loader_core::trace::generate_warm_start;
//!
//! let stream = generate_warm_start(2, 1.0).unwrap();
//! assert_eq!(stream.len(), 120);
//! assert_eq!(stream.per_minute, vec![60, 60]);
//! ```

mod cold;
mod stream;
mod warm;

pub use cold::generate_cold_start;
pub use stream::{ArrivalStream, TraceSet};
pub use warm::generate_warm_start;

use thiserror::Error;

/// Microseconds in one second
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Microseconds in one experiment minute
pub const MICROS_PER_MINUTE: f64 = 60.0 * MICROS_PER_SECOND;

/// Absolute tolerance (µs) for comparing generated timestamps against minute
/// boundaries and the experiment end
pub const IAT_EPSILON_US: f64 = 0.01;

/// Tolerance for rounding rate products up to whole arrivals or streams
const COUNT_EPSILON: f64 = 1e-9;

/// Upper bound on the arrivals of a trace and on the streams of a
/// cold-start trace
pub const MAX_ARRIVALS: usize = u32::MAX as usize;

/// Rejected trace generator inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    /// Experiment duration must be at least one minute
    #[error("experiment duration must be at least one minute")]
    InvalidDuration,

    /// Target rate must be finite and non-negative, with a representable
    /// interval and arrival count
    #[error("invalid rps target {0}: must be finite, non-negative and within trace limits")]
    InvalidRate(f64),

    /// Cold-start cooldown must be at least one second
    #[error("cooldown must be at least one second")]
    InvalidCooldown,
}

fn validate_inputs(duration_minutes: u32, rps_target: f64) -> Result<(), TraceError> {
    if duration_minutes == 0 {
        return Err(TraceError::InvalidDuration);
    }
    if !rps_target.is_finite() || rps_target < 0.0 {
        return Err(TraceError::InvalidRate(rps_target));
    }
    if rps_target > 0.0 {
        // rates near the smallest f64 overflow the interval
        if !(MICROS_PER_SECOND / rps_target).is_finite() {
            return Err(TraceError::InvalidRate(rps_target));
        }
        bounded_count(rps_target, f64::from(duration_minutes) * 60.0)?;
    }
    Ok(())
}

/// `ceil_count(rps_target * seconds)`, rejected above [`MAX_ARRIVALS`]
fn bounded_count(rps_target: f64, seconds: f64) -> Result<usize, TraceError> {
    let value = rps_target * seconds;
    if !value.is_finite() || value > MAX_ARRIVALS as f64 {
        return Err(TraceError::InvalidRate(rps_target));
    }
    Ok(ceil_count(value))
}

/// Round a rate product up to a whole count, ignoring floating-point noise
/// around positive integers (so `0.07 * 100.0` yields 7, not 8).
fn ceil_count(value: f64) -> usize {
    let nearest = value.round();
    if nearest >= 1.0 && (value - nearest).abs() < COUNT_EPSILON {
        nearest as usize
    } else {
        value.ceil().max(0.0) as usize
    }
}

/// Count arrivals per experiment minute.
///
/// Timestamps are the running cumulative sum of `iat`. Each arrival goes to
/// bucket `floor(t / 60s)`; arrivals that would overflow the last bucket are
/// clipped into it.
pub fn bucket_per_minute(iat: &[f64], duration_minutes: u32) -> Vec<usize> {
    let minutes = duration_minutes as usize;
    let mut counts = vec![0; minutes];
    if minutes == 0 {
        return counts;
    }

    let mut timestamp_us = 0.0;
    for delta in iat {
        timestamp_us += delta;
        counts[minute_index(timestamp_us, duration_minutes)] += 1;
    }
    counts
}

/// Experiment minute an arrival at `timestamp_us` belongs to, clipped into
/// `0..duration_minutes` (0 for a zero duration).
pub fn minute_index(timestamp_us: f64, duration_minutes: u32) -> usize {
    let last = (duration_minutes as usize).saturating_sub(1);
    let minute = ((timestamp_us + IAT_EPSILON_US) / MICROS_PER_MINUTE).floor();
    if minute <= 0.0 {
        0
    } else {
        (minute as usize).min(last)
    }
}
