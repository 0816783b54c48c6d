//! Sell-side Risk: realised profit taken over a window, as a fraction of
//! market cap (§4.4.5).

use chrono::{DateTime, Utc};
use ocf_store::SpentRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SellSideRiskZone {
    Low,
    Normal,
    Elevated,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SellSideRiskResult {
    pub realised_profit: f64,
    pub realised_loss: f64,
    pub sell_side_risk: f64,
    pub zone: SellSideRiskZone,
    pub window_days: u32,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl SellSideRiskResult {
    pub fn calculate(
        spent_in_window: &[SpentRow],
        market_cap: f64,
        window_days: u32,
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let mut realised_profit = 0.0;
        let mut realised_loss = 0.0;
        for row in spent_in_window {
            let pnl = (row.spent_price_usd - row.creation_price_usd) * row.btc_value;
            if pnl > 0.0 {
                realised_profit += pnl;
            } else {
                realised_loss += -pnl;
            }
        }

        let sell_side_risk = if market_cap > 0.0 { realised_profit / market_cap } else { 0.0 };
        let pct = sell_side_risk * 100.0;
        let zone = if pct < 0.1 {
            SellSideRiskZone::Low
        } else if pct < 0.3 {
            SellSideRiskZone::Normal
        } else if pct < 1.0 {
            SellSideRiskZone::Elevated
        } else {
            SellSideRiskZone::Aggressive
        };

        Self {
            realised_profit,
            realised_loss,
            sell_side_risk,
            zone,
            window_days,
            block_height,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(btc: f64, creation: f64, spent: f64) -> SpentRow {
        SpentRow {
            btc_value: btc,
            creation_price_usd: creation,
            spent_price_usd: spent,
            creation_block: 0,
            spent_block: 1,
            age_days: 1.0,
        }
    }

    #[test]
    fn sums_profit_and_loss_separately() {
        let rows = vec![row(1.0, 10_000.0, 20_000.0), row(1.0, 20_000.0, 15_000.0)];
        let r = SellSideRiskResult::calculate(&rows, 1_000_000.0, 30, 1, Utc::now());
        assert_eq!(r.realised_profit, 10_000.0);
        assert_eq!(r.realised_loss, 5_000.0);
    }

    #[test]
    fn zone_matches_pct_of_market_cap() {
        let rows = vec![row(1.0, 0.0, 5_000.0)];
        let r = SellSideRiskResult::calculate(&rows, 1_000_000.0, 30, 1, Utc::now());
        assert_eq!(r.zone, SellSideRiskZone::Elevated);
    }
}
