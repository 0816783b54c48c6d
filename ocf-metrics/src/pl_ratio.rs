//! Profit/Loss Ratio and dominance (§4.4.7).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlDominanceZone {
    ExtremeProfit,
    Profit,
    Neutral,
    Loss,
    ExtremeLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlRatioResult {
    pub pl_ratio: Decimal,
    pub pl_dominance: Decimal,
    pub zone: PlDominanceZone,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl PlRatioResult {
    pub fn calculate(profit: Decimal, loss: Decimal, block_height: u64, computed_at: DateTime<Utc>) -> Self {
        let pl_ratio = if loss.is_zero() {
            if profit > Decimal::ZERO { Decimal::MAX } else { Decimal::ZERO }
        } else {
            profit.checked_div(loss).unwrap_or(Decimal::MAX)
        };

        let denom = (profit + loss).max(dec!(1e-9));
        let pl_dominance = (profit - loss) / denom;

        let zone = if pl_dominance > dec!(0.67) {
            PlDominanceZone::ExtremeProfit
        } else if pl_dominance > dec!(0.20) {
            PlDominanceZone::Profit
        } else if pl_dominance >= dec!(-0.20) {
            PlDominanceZone::Neutral
        } else if pl_dominance >= dec!(-0.67) {
            PlDominanceZone::Loss
        } else {
            PlDominanceZone::ExtremeLoss
        };

        Self {
            pl_ratio,
            pl_dominance,
            zone,
            block_height,
            computed_at,
        }
    }
}
