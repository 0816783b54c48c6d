//! # 🧬 ocf-core — Shared Foundations
//!
//! Shared error taxonomy, configuration surface, and small value types used
//! across every crate in the on-chain/derivatives signal fusion workspace.
//!
//! ## 🏗️ Module Structure
//!
//! ```text
//! ocf-core/
//!  ├─ error.rs    # Leaf error variants shared by every component crate
//!  ├─ config.rs   # Eagerly-validated environment-variable configuration
//!  └─ vote.rs     # SignalVote — the C5/C6 contract type
//! ```
//!
//! Every other crate in this workspace depends on `ocf-core` for its error
//! leaves (`ValidationError`, `MissingPriceData`, `MissingHeightData`) and
//! wraps them with `#[from]` rather than redefining them.

pub mod config;
pub mod error;
pub mod vote;

pub use error::{CoreError, ValidationError};
pub use vote::SignalVote;

/// Checks that `value` lies in the inclusive range `[lo, hi]`, returning a
/// [`ValidationError`] naming `field` otherwise.
///
/// Centralises the bounds-checking idiom used by every metric and fusion
/// result constructor in this workspace (confidence in `[0,1]`, percentages
/// in `[0,100]`, votes in `[-1,1]`, ...).
pub fn check_range(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value < lo || value > hi {
        Err(ValidationError::OutOfRange {
            field,
            value,
            lo,
            hi,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_range_accepts_bounds_inclusive() {
        assert!(check_range("confidence", 0.0, 0.0, 1.0).is_ok());
        assert!(check_range("confidence", 1.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn check_range_rejects_out_of_bounds_and_nan() {
        assert!(check_range("confidence", 1.01, 0.0, 1.0).is_err());
        assert!(check_range("confidence", f64::NAN, 0.0, 1.0).is_err());
    }
}
