//! Eagerly-validated, environment-variable-driven configuration.
//!
//! Every cross-component tunable — weights, thresholds, sample counts, TTLs,
//! extreme-funding bounds, STH/LTH threshold days, bucket sizes — is a field
//! here with a documented default. No metric or fusion body embeds its own
//! constant.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

/// Raised when an environment variable is present but cannot be parsed, or
/// when a required variable is absent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{name}` = `{raw}` could not be parsed: {reason}")]
    Invalid {
        name: &'static str,
        raw: String,
        reason: String,
    },
}

/// Process-wide configuration, constructed once at start-up via
/// [`Config::from_env`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path to the lifecycle-store DuckDB file. Required.
    pub store_path: String,

    /// Path to the externally-owned derivatives DuckDB file, attached
    /// read-only. `None` disables C5 entirely (adapters return `None` votes).
    pub derivatives_path: Option<String>,

    /// Master switch for C5; independent of `derivatives_path` so an
    /// operator can disable derivatives without unsetting the path.
    pub derivatives_enabled: bool,

    /// Per-component fusion weights, keyed by component name
    /// (`"whale"`, `"utxo"`, `"funding"`, `"oi"`, ...).
    pub component_weights: HashMap<String, f64>,

    /// Monte-Carlo sample count for the fusion engine (§4.6 step 1).
    pub fusion_samples: usize,

    /// Perturbation scale `k` in `sigma_i = (1 - confidence_i) * k`.
    pub fusion_perturbation_k: f64,

    /// Saddle-depth fraction above which a bimodal histogram is reported.
    pub fusion_bimodal_saddle_depth: f64,

    /// Histogram bin count used for the bimodality heuristic.
    pub fusion_histogram_bins: usize,

    /// TTL for cached derivatives reads.
    pub derivatives_cache_ttl: Duration,

    /// Timestamp-alignment tolerance for derivatives rows.
    pub derivatives_staleness_tolerance: Duration,

    /// Retry policy shared by C2/C3/C5 external calls: base delay, backoff
    /// factor, and maximum attempts.
    pub retry_base: Duration,
    pub retry_factor: f64,
    pub retry_max_attempts: u32,

    /// Per-call deadlines (§5 Cancellation & timeout).
    pub block_rpc_deadline: Duration,
    pub derivatives_query_deadline: Duration,
    pub price_api_deadline: Duration,

    /// STH/LTH cohort threshold, in days (§4.4.2/§4.4.3).
    pub sth_lth_threshold_days: u64,

    /// Blocks per day used to convert heights to day-counts (§4.4.4/§4.4.6).
    pub blocks_per_day: u64,

    /// Reference-oracle confidence threshold below which a vote is damped
    /// rather than dropped (§4.7 Open Question resolution).
    pub oracle_confidence_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: "signals.duckdb".to_string(),
            derivatives_path: None,
            derivatives_enabled: false,
            component_weights: default_weights(),
            fusion_samples: 1000,
            fusion_perturbation_k: 0.25,
            fusion_bimodal_saddle_depth: 0.30,
            fusion_histogram_bins: 50,
            derivatives_cache_ttl: Duration::from_secs(300),
            derivatives_staleness_tolerance: Duration::from_secs(600),
            retry_base: Duration::from_secs(1),
            retry_factor: 2.0,
            retry_max_attempts: 3,
            block_rpc_deadline: Duration::from_secs(30),
            derivatives_query_deadline: Duration::from_secs(5),
            price_api_deadline: Duration::from_secs(1),
            sth_lth_threshold_days: 155,
            blocks_per_day: 144,
            oracle_confidence_threshold: 0.4,
        }
    }
}

fn default_weights() -> HashMap<String, f64> {
    HashMap::from([
        ("whale".to_string(), 0.40),
        ("utxo".to_string(), 0.20),
        ("funding".to_string(), 0.25),
        ("oi".to_string(), 0.15),
    ])
}

impl Config {
    /// Loads configuration from environment variables, validating eagerly.
    ///
    /// `OCF_STORE_PATH` is the only required variable; everything else
    /// falls back to [`Config::default`] values and is overridden only when
    /// present and well-formed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        cfg.store_path = env::var("OCF_STORE_PATH").map_err(|_| ConfigError::Missing("OCF_STORE_PATH"))?;
        cfg.derivatives_path = env::var("OCF_DERIVATIVES_PATH").ok();

        if let Some(raw) = env::var("OCF_DERIVATIVES_ENABLED").ok() {
            cfg.derivatives_enabled = parse_bool("OCF_DERIVATIVES_ENABLED", &raw)?;
        } else {
            cfg.derivatives_enabled = cfg.derivatives_path.is_some();
        }

        for (name, var) in [
            ("whale", "OCF_WEIGHT_WHALE"),
            ("utxo", "OCF_WEIGHT_UTXO"),
            ("funding", "OCF_WEIGHT_FUNDING"),
            ("oi", "OCF_WEIGHT_OI"),
        ] {
            if let Ok(raw) = env::var(var) {
                let parsed = parse_f64(var, &raw)?;
                cfg.component_weights.insert(name.to_string(), parsed);
            }
        }

        if let Ok(raw) = env::var("OCF_FUSION_SAMPLES") {
            cfg.fusion_samples = parse_usize("OCF_FUSION_SAMPLES", &raw)?;
        }
        if let Ok(raw) = env::var("OCF_DERIVATIVES_CACHE_TTL_SECS") {
            cfg.derivatives_cache_ttl = Duration::from_secs(parse_u64("OCF_DERIVATIVES_CACHE_TTL_SECS", &raw)?);
        }

        Ok(cfg)
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            raw: raw.to_string(),
            reason: "expected a boolean-like value".to_string(),
        }),
    }
}

fn parse_f64(name: &'static str, raw: &str) -> Result<f64, ConfigError> {
    raw.parse::<f64>().map_err(|e| ConfigError::Invalid {
        name,
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_u64(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
        name,
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_usize(name: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
        name,
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let cfg = Config::default();
        let sum: f64 = cfg.component_weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("X", "true").unwrap(), true);
        assert_eq!(parse_bool("X", "0").unwrap(), false);
        assert!(parse_bool("X", "maybe").is_err());
    }
}
