//! Shared constants and small numeric helpers used across the metric family.
//!
//! Blocks-per-day and the STH/LTH threshold are [`ocf_core::config::Config`]
//! fields (`blocks_per_day`, `sth_lth_threshold_days`), not constants here —
//! every calculator that needs them takes them as an argument, sourced by
//! [`crate::service::MetricService`] from the config it was built with.

/// Epsilon guarding divisions by a quantity that may legitimately be zero
/// (realised profit, realised loss).
pub const EPSILON: f64 = 1e-9;

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

pub fn pct_of(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        (part / total * 100.0).clamp(0.0, 100.0)
    }
}

/// Population standard deviation. Returns 0.0 for fewer than 2 samples.
pub fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
