//! Top-level error aggregating every component crate's error enum so a
//! single `match` in `main` can pick the right exit code (§6, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] ocf_core::error::CoreError),

    #[error(transparent)]
    Config(#[from] ocf_core::config::ConfigError),

    #[error(transparent)]
    Store(#[from] ocf_store::StoreError),

    #[error(transparent)]
    Bootstrap(#[from] ocf_bootstrap::BootstrapError),

    #[error(transparent)]
    Metric(#[from] ocf_metrics::MetricError),

    #[error(transparent)]
    Derivatives(#[from] ocf_derivatives::DerivativesError),

    #[error(transparent)]
    Backtest(#[from] ocf_backtest::BacktestError),

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
