//! Error taxonomy for the lifecycle store and price-indexing service.

use ocf_core::error::{MissingHeightData, MissingPriceData};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing price data: {0}")]
    MissingPrice(#[from] MissingPriceData),

    #[error("missing height data: {0}")]
    MissingHeight(#[from] MissingHeightData),

    /// A row failed an invariant check on read (§4.1 Failure semantics):
    /// the query fails naming the offending row, the row is never dropped
    /// silently.
    #[error("integrity error in row {row}: {reason}")]
    Integrity { row: String, reason: String },

    #[error("underlying engine error: {0}")]
    Engine(#[from] duckdb::Error),

    #[error("price source unavailable after retries: {0}")]
    PriceSourceUnavailable(String),

    #[error("block metadata source unavailable after retries: {0}")]
    BlockSourceUnavailable(String),
}
