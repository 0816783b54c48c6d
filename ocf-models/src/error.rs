//! Error taxonomy for the model framework.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Validation(#[from] ocf_core::error::ValidationError),

    #[error("model {0:?} was not fit before predict() was called")]
    NotFitted(&'static str),

    #[error("history is empty; {0:?} cannot fit on zero observations")]
    EmptyHistory(&'static str),

    #[error("a model named {0:?} is already registered")]
    DuplicateRegistration(String),

    #[error("no model named {0:?} is registered")]
    UnknownModel(String),

    #[error("ensemble weights sum to {actual}, expected 1.0 ± 1e-6")]
    WeightsDoNotSumToOne { actual: f64 },

    #[error("ensemble must compose at least one model")]
    EmptyEnsemble,

    #[error("reference oracle unavailable: {0}")]
    OracleUnavailable(String),
}
