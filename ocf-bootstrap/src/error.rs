//! Error taxonomy for the bootstrap pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] ocf_store::StoreError),

    /// A block referenced a prevout absent from the store and the input
    /// itself lacked enough data to synthesise a row (§4.2 Failure
    /// semantics). The block is skipped and this error surfaced.
    #[error("block {height} skipped: unresolvable prevout {txid}:{vout}")]
    UnresolvableBlock { height: u64, txid: String, vout: u32 },

    #[error("bootstrap cancelled at height {height_reached}")]
    Cancelled { height_reached: u64 },
}
