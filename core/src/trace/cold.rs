//! Cold-start trace: staggered streams that each respect the cooldown

use super::{
    bounded_count, bucket_per_minute, validate_inputs, ArrivalStream, TraceError,
    IAT_EPSILON_US, MICROS_PER_MINUTE, MICROS_PER_SECOND,
};

/// Generate the streams of a forced cold-start experiment.
///
/// With `n = ceil(rps_target * cooldown_seconds)` streams and a global
/// interval of `1e6 / rps_target` µs, stream `i` starts at `i * interval`
/// and then fires every `period = n * interval` µs, which is never shorter
/// than the cooldown. Arrivals at or beyond the experiment end are dropped,
/// so a stream whose offset already lies past the end is returned empty.
///
/// A zero rate yields no streams at all.
///
/// # Errors
///
/// [`TraceError::InvalidDuration`], [`TraceError::InvalidRate`] and
/// [`TraceError::InvalidCooldown`] for out-of-contract inputs.
pub fn generate_cold_start(
    duration_minutes: u32,
    rps_target: f64,
    cooldown_seconds: u32,
) -> Result<Vec<ArrivalStream>, TraceError> {
    validate_inputs(duration_minutes, rps_target)?;
    if cooldown_seconds == 0 {
        return Err(TraceError::InvalidCooldown);
    }

    if rps_target == 0.0 {
        return Ok(Vec::new());
    }

    let stream_count = bounded_count(rps_target, f64::from(cooldown_seconds))?;
    let global_interval_us = MICROS_PER_SECOND / rps_target;
    let period_us = stream_count as f64 * global_interval_us;
    if !period_us.is_finite() {
        return Err(TraceError::InvalidRate(rps_target));
    }
    let end_us = f64::from(duration_minutes) * MICROS_PER_MINUTE;

    let streams: Vec<ArrivalStream> = (0..stream_count)
        .map(|index| {
            let offset_us = index as f64 * global_interval_us;
            let iat = stream_iat(offset_us, period_us, end_us);
            let per_minute = bucket_per_minute(&iat, duration_minutes);
            ArrivalStream { iat, per_minute }
        })
        .collect();

    tracing::debug!(
        duration_minutes,
        rps_target,
        cooldown_seconds,
        stream_count,
        period_us,
        "Generated cold-start trace"
    );

    Ok(streams)
}

fn stream_iat(offset_us: f64, period_us: f64, end_us: f64) -> Vec<f64> {
    let mut iat = Vec::new();
    let mut arrivals: u64 = 0;
    loop {
        // absolute time, not a running sum
        let arrival_us = offset_us + arrivals as f64 * period_us;
        if arrival_us + IAT_EPSILON_US >= end_us {
            break;
        }
        iat.push(if arrivals == 0 { offset_us } else { period_us });
        arrivals += 1;
    }
    iat
}
