//! Latency percentile calculation.
//!
//! Uses the nearest-rank (ceil-index) method over the exact sample set,
//! so a run's p90 is reproducible from its samples alone.

use std::time::Duration;

/// Quantile reported in every application summary.
pub const P90: f64 = 0.9;

/// Return the `q` quantile of `samples` in fractional seconds.
///
/// Sorts ascending and picks index `ceil(n * q) - 1`, clamped to the
/// valid range. An empty sample set yields 0.0, which callers treat as
/// "no data". `q` is clamped to `(0, 1]`.
pub fn percentile(samples: &[Duration], q: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let q = if q.is_nan() { 1.0 } else { q.clamp(f64::MIN_POSITIVE, 1.0) };
    let rank = (sorted.len() as f64 * q).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);

    sorted[index].as_secs_f64()
}

/// 90th percentile of `samples` in seconds.
pub fn p90(samples: &[Duration]) -> f64 {
    percentile(samples, P90)
}

/// Error share of `total` requests as a percentage, 0.0 when nothing completed.
pub fn error_percentage(errors: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    errors as f64 / total as f64 * 100.0
}
