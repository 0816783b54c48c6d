//! Leaf error variants shared by every component crate.
//!
//! The genuinely cross-cutting variants (§7) live here; each downstream
//! crate (`ocf-store`, `ocf-metrics`, `ocf-fusion`, ...) defines its own
//! `thiserror` enum that wraps these with `#[from]` instead of redeclaring
//! them.

use chrono::NaiveDate;
use thiserror::Error;

/// Raised by a value-object constructor when an invariant is violated.
///
/// Constructors never build a partially-valid instance: validation happens
/// before the struct literal is returned, and any violation short-circuits
/// into this error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("field `{field}` = {value} is outside the allowed range [{lo}, {hi}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        lo: f64,
        hi: f64,
    },

    #[error("zone `{zone}` is not a member of the `{metric}` enumeration")]
    UnknownZone { metric: &'static str, zone: String },

    #[error("component counts for `{metric}` do not reconcile: {lhs} + {rhs} != {total} (tolerance {tolerance})")]
    ComponentMismatch {
        metric: &'static str,
        lhs: f64,
        rhs: f64,
        total: f64,
        tolerance: f64,
    },

    #[error("{0}")]
    Other(String),
}

/// Raised when the price-index cannot resolve a daily USD price for a date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no daily price indexed for {date}")]
pub struct MissingPriceData {
    pub date: NaiveDate,
}

/// Raised when the price-index cannot resolve a timestamp for a block height.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no block-height mapping for height {height}")]
pub struct MissingHeightData {
    pub height: u64,
}

/// Top-level error aggregating the shared leaves, for callers (chiefly the
/// CLI) that only care about the cross-cutting failure classes and not the
/// per-crate detail.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("missing price data: {0}")]
    MissingPrice(#[from] MissingPriceData),

    #[error("missing height data: {0}")]
    MissingHeight(#[from] MissingHeightData),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
