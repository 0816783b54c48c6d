//! Funding-rate adapter: a contrarian conversion of raw perpetual-swap
//! funding into a signed vote (§4.5).

use ocf_core::SignalVote;

use crate::error::DerivativesError;

const DEADBAND: f64 = 1e-4;
const POS_EXTREME: f64 = 1e-3;
const NEG_EXTREME: f64 = -5e-4;

/// Pure contrarian conversion: positive funding (longs paying shorts) votes
/// bearish, negative funding votes bullish, linearly scaled between the
/// dead-band and the extreme thresholds and clipped to `[-1, 1]` beyond
/// them.
pub fn funding_vote(raw_funding: f64) -> (f64, bool) {
    if raw_funding.abs() <= DEADBAND {
        return (0.0, false);
    }
    if raw_funding > POS_EXTREME {
        return (-(raw_funding / POS_EXTREME).min(1.0), true);
    }
    if raw_funding < NEG_EXTREME {
        return ((raw_funding.abs() / NEG_EXTREME.abs()).min(1.0), true);
    }
    if raw_funding > 0.0 {
        let t = (raw_funding - DEADBAND) / (POS_EXTREME - DEADBAND);
        (-t, false)
    } else {
        let t = (raw_funding.abs() - DEADBAND) / (NEG_EXTREME.abs() - DEADBAND);
        (t, false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundingRateReading {
    pub vote: SignalVote,
    pub raw_funding: f64,
    pub is_extreme: bool,
}

impl FundingRateReading {
    pub fn calculate(raw_funding: f64, confidence: f64, weight: f64) -> Result<Self, DerivativesError> {
        let (vote, is_extreme) = funding_vote(raw_funding);
        Ok(Self {
            vote: SignalVote::try_new("funding".to_string(), Some(vote), confidence, weight)?,
            raw_funding,
            is_extreme,
        })
    }

    pub fn unavailable(weight: f64) -> Self {
        Self {
            vote: SignalVote::unavailable("funding".to_string(), weight),
            raw_funding: 0.0,
            is_extreme: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_deadband_is_zero_and_not_extreme() {
        assert_eq!(funding_vote(0.00005), (0.0, false));
        assert_eq!(funding_vote(-0.0001), (0.0, false));
    }

    #[test]
    fn extreme_positive_funding_votes_max_bearish() {
        let (vote, extreme) = funding_vote(0.01);
        assert_eq!(vote, -1.0);
        assert!(extreme);
    }

    #[test]
    fn extreme_negative_funding_votes_max_bullish() {
        let (vote, extreme) = funding_vote(-0.01);
        assert_eq!(vote, 1.0);
        assert!(extreme);
    }

    #[test]
    fn monotonically_more_negative_as_funding_rises() {
        let samples = [0.0002, 0.0004, 0.0006, 0.0008];
        let votes: Vec<f64> = samples.iter().map(|f| funding_vote(*f).0).collect();
        for w in votes.windows(2) {
            assert!(w[1] <= w[0], "vote must be monotonically non-increasing as funding rises");
        }
    }

    #[test]
    fn reading_wraps_a_valid_signal_vote() {
        let reading = FundingRateReading::calculate(0.002, 0.9, 0.25).unwrap();
        assert_eq!(reading.vote.vote, Some(-1.0));
        assert!(reading.is_extreme);
    }
}
