//! Error taxonomy for the backtester.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error(transparent)]
    Validation(#[from] ocf_core::error::ValidationError),

    #[error("vote source failed for {date}: {reason}")]
    VoteSourceFailed { date: chrono::NaiveDate, reason: String },

    #[error("need at least 2 realised-price points to walk forward, got {0}")]
    InsufficientPriceHistory(usize),

    #[error("realised prices must be sorted by strictly increasing date (found {prev} then {next})")]
    UnsortedPriceHistory { prev: chrono::NaiveDate, next: chrono::NaiveDate },

    #[error("weight grid is empty")]
    EmptyWeightGrid,
}
