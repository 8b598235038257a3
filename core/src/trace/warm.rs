//! Warm-start trace: a single constant-rate stream

use super::{
    bounded_count, bucket_per_minute, validate_inputs, ArrivalStream, TraceError,
    MICROS_PER_SECOND,
};

/// Generate a single stream firing at `rps_target` for `duration_minutes`.
///
/// The first arrival is at experiment start; every following delta is
/// `1e6 / rps_target` µs, for `ceil(rps_target * duration_seconds)` arrivals
/// in total. A zero rate yields an empty IAT array with all-zero counts.
///
/// # Errors
///
/// [`TraceError::InvalidDuration`] for a zero duration and
/// [`TraceError::InvalidRate`] for a negative or non-finite rate, or one
/// whose interval or arrival count cannot be represented.
pub fn generate_warm_start(
    duration_minutes: u32,
    rps_target: f64,
) -> Result<ArrivalStream, TraceError> {
    validate_inputs(duration_minutes, rps_target)?;

    if rps_target == 0.0 {
        return Ok(ArrivalStream::empty(duration_minutes));
    }

    let total_seconds = f64::from(duration_minutes) * 60.0;
    let interval_us = MICROS_PER_SECOND / rps_target;
    let total_arrivals = bounded_count(rps_target, total_seconds)?;

    let mut iat = Vec::with_capacity(total_arrivals);
    if total_arrivals > 0 {
        iat.push(0.0);
        iat.resize(total_arrivals, interval_us);
    }

    let per_minute = bucket_per_minute(&iat, duration_minutes);

    tracing::debug!(
        duration_minutes,
        rps_target,
        interval_us,
        total_arrivals,
        "Generated warm-start trace"
    );

    Ok(ArrivalStream { iat, per_minute })
}
