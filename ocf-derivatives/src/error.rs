//! Error taxonomy for the derivatives adapters.
//!
//! Every variant here is non-fatal at the caller's level: adapters convert
//! all of these into a `None` vote (§4.5) rather than propagating, so this
//! type exists mainly for diagnostics and the retry loop's internal use.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DerivativesError {
    #[error(transparent)]
    Validation(#[from] ocf_core::error::ValidationError),

    #[error(transparent)]
    Engine(#[from] duckdb::Error),

    #[error("derivatives database unavailable: {0}")]
    Unavailable(String),

    #[error("no row within ±{tolerance_secs}s of the target timestamp")]
    StaleOrMissing { tolerance_secs: i64 },
}
