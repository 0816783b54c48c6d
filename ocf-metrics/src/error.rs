//! Error taxonomy for the metric library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error(transparent)]
    Validation(#[from] ocf_core::error::ValidationError),

    #[error(transparent)]
    Store(#[from] ocf_store::StoreError),

    /// A caller asked for a metric with no unspent supply to compute it from.
    #[error("{metric}: no unspent supply available at block {block_height}")]
    NoUnspentSupply { metric: &'static str, block_height: u64 },
}
