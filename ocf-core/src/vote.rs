//! [`SignalVote`] — the C5/C6 contract type (§3 "Signal vote").

use derive_more::Constructor;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A single component's opinion, as consumed by the fusion engine.
///
/// `vote` is `None` when the producing component is unavailable (stale
/// derivatives feed, missing on-chain history, ...); the fusion engine
/// drops such components and renormalises the remaining weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct SignalVote {
    pub name: String,
    pub vote: Option<f64>,
    pub confidence: f64,
    pub weight: f64,
}

impl SignalVote {
    /// Builds a vote, validating `confidence`, `weight`, and (if present)
    /// `vote` against their contractual ranges.
    pub fn try_new(
        name: impl Into<String>,
        vote: Option<f64>,
        confidence: f64,
        weight: f64,
    ) -> Result<Self, ValidationError> {
        crate::check_range("confidence", confidence, 0.0, 1.0)?;
        crate::check_range("weight", weight, 0.0, 1.0)?;
        if let Some(v) = vote {
            crate::check_range("vote", v, -1.0, 1.0)?;
        }
        Ok(Self {
            name: name.into(),
            vote,
            confidence,
            weight,
        })
    }

    /// A vote marking the component as unavailable: `vote = None`.
    pub fn unavailable(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            vote: None,
            confidence: 0.0,
            weight,
        }
    }

    pub fn is_available(&self) -> bool {
        self.vote.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_accepts_boundary_values() {
        let v = SignalVote::try_new("whale", Some(-1.0), 1.0, 1.0).unwrap();
        assert_eq!(v.vote, Some(-1.0));
    }

    #[test]
    fn try_new_rejects_out_of_range_vote() {
        assert!(SignalVote::try_new("whale", Some(1.5), 0.5, 0.5).is_err());
    }

    #[test]
    fn unavailable_has_no_vote() {
        let v = SignalVote::unavailable("oi", 0.15);
        assert!(!v.is_available());
    }
}
