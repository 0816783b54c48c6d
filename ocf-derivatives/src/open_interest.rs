//! Open-interest adapter: combines the relative change in open interest
//! with a whale-direction context label via the decision table in §4.5.

use ocf_core::SignalVote;

use crate::error::DerivativesError;
use crate::model::WhaleDirection;

/// Pure decision-table lookup. Returns `(vote, context)`.
pub fn open_interest_vote(oi_now: f64, oi_prev: f64, whale_direction: WhaleDirection) -> (f64, &'static str) {
    if oi_prev <= 0.0 {
        return (0.0, "no_data");
    }
    let delta = (oi_now - oi_prev) / oi_prev;

    if delta < -0.01 {
        return (0.0, "deleveraging");
    }
    if delta <= 0.01 {
        return (0.0, "stable");
    }

    let (magnitude_high, magnitude_low) = if delta > 0.03 { (0.5, 0.3) } else { (0.3, 0.2) };
    match whale_direction {
        WhaleDirection::Accumulation => (magnitude_high, "confirming"),
        WhaleDirection::Distribution => (-magnitude_low, "diverging"),
        WhaleDirection::Neutral => {
            let neutral = if delta > 0.03 { 0.2 } else { 0.1 };
            (neutral, "neutral")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenInterestReading {
    pub vote: SignalVote,
    pub delta: f64,
    pub context: &'static str,
}

impl OpenInterestReading {
    pub fn calculate(
        oi_now: f64,
        oi_prev: f64,
        whale_direction: WhaleDirection,
        confidence: f64,
        weight: f64,
    ) -> Result<Self, DerivativesError> {
        let delta = if oi_prev > 0.0 { (oi_now - oi_prev) / oi_prev } else { 0.0 };
        let (vote, context) = open_interest_vote(oi_now, oi_prev, whale_direction);
        Ok(Self {
            vote: SignalVote::try_new("open_interest".to_string(), Some(vote), confidence, weight)?,
            delta,
            context,
        })
    }

    pub fn unavailable(weight: f64) -> Self {
        Self {
            vote: SignalVote::unavailable("open_interest".to_string(), weight),
            delta: 0.0,
            context: "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_when_oi_prev_non_positive() {
        assert_eq!(open_interest_vote(100.0, 0.0, WhaleDirection::Neutral), (0.0, "no_data"));
    }

    #[test]
    fn deleveraging_and_stable_bands_vote_zero() {
        assert_eq!(open_interest_vote(98.0, 100.0, WhaleDirection::Accumulation), (0.0, "deleveraging"));
        assert_eq!(open_interest_vote(100.5, 100.0, WhaleDirection::Accumulation), (0.0, "stable"));
    }

    #[test]
    fn confirming_accumulation_votes_bullish() {
        assert_eq!(open_interest_vote(102.0, 100.0, WhaleDirection::Accumulation), (0.3, "confirming"));
        assert_eq!(open_interest_vote(104.0, 100.0, WhaleDirection::Accumulation), (0.5, "confirming"));
    }

    #[test]
    fn diverging_distribution_votes_bearish() {
        assert_eq!(open_interest_vote(102.0, 100.0, WhaleDirection::Distribution), (-0.2, "diverging"));
        assert_eq!(open_interest_vote(104.0, 100.0, WhaleDirection::Distribution), (-0.3, "diverging"));
    }

    #[test]
    fn neutral_context_has_small_positive_vote() {
        assert_eq!(open_interest_vote(102.0, 100.0, WhaleDirection::Neutral), (0.1, "neutral"));
    }
}
