//! Reserve Risk, via a HODL-Bank proxy built from cumulative
//! coin-blocks-destroyed (§4.4.4).

use chrono::{DateTime, Utc};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ReserveRiskZone {
    StrongBuy,
    Accumulation,
    FairValue,
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReserveRiskResult {
    pub reserve_risk: f64,
    pub hodl_bank: f64,
    pub zone: ReserveRiskZone,
    pub confidence: f64,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl ReserveRiskResult {
    /// `cumulative_coinblocks_destroyed` is `Σ btc × (spent_block −
    /// creation_block)` over every spend ever recorded. `blocks_per_day`
    /// comes from [`ocf_core::config::Config::blocks_per_day`].
    pub fn calculate(
        current_price_usd: f64,
        unspent_supply: f64,
        cumulative_coinblocks_destroyed: f64,
        blocks_per_day: f64,
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let hodl_bank = cumulative_coinblocks_destroyed / blocks_per_day;
        let denom = hodl_bank * unspent_supply;
        let reserve_risk = if denom > 0.0 { current_price_usd / denom } else { 0.0 };

        let (zone, confidence) = if denom <= 0.0 {
            (ReserveRiskZone::FairValue, 0.0)
        } else if reserve_risk < 0.002 {
            (ReserveRiskZone::StrongBuy, 0.95)
        } else if reserve_risk < 0.008 {
            (ReserveRiskZone::Accumulation, 0.80)
        } else if reserve_risk < 0.02 {
            (ReserveRiskZone::FairValue, 0.60)
        } else {
            (ReserveRiskZone::Distribution, 0.80)
        };

        if !(0.0..=0.1).contains(&reserve_risk) {
            warn!(reserve_risk, block_height, "reserve_risk outside expected [0, 0.1] range");
        }

        Self {
            reserve_risk,
            hodl_bank,
            zone,
            confidence,
            block_height,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_match_thresholds() {
        let r = ReserveRiskResult::calculate(1.0, 1_000.0, 144.0 * 1_000_000.0, 144.0, 1, Utc::now());
        assert_eq!(r.zone, ReserveRiskZone::StrongBuy);
    }

    #[test]
    fn zero_when_denominator_non_positive() {
        let r = ReserveRiskResult::calculate(100.0, 0.0, 0.0, 144.0, 1, Utc::now());
        assert_eq!(r.reserve_risk, 0.0);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn out_of_range_value_still_returns_but_warns() {
        let r = ReserveRiskResult::calculate(1_000_000.0, 1_000.0, 144.0 * 1_000.0, 144.0, 1, Utc::now());
        assert!(r.reserve_risk > 0.1);
        assert_eq!(r.zone, ReserveRiskZone::Distribution);
    }
}
