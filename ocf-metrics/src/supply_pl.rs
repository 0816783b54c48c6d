//! Supply in Profit / Loss, with STH/LTH split and market-phase
//! classification (§4.4.2).

use chrono::{DateTime, Utc};
use ocf_core::check_range;

use crate::common::{clamp01, pct_of};
use crate::error::MetricError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MarketPhase {
    Euphoria,
    Bull,
    Transition,
    Capitulation,
}

/// `(in_profit, in_loss, breakeven)` supply split, as both BTC and a
/// percentage of total unspent supply.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SupplySplit {
    pub in_profit_btc: f64,
    pub in_loss_btc: f64,
    pub breakeven_btc: f64,
    pub pct_in_profit: f64,
    pub pct_in_loss: f64,
    pub pct_breakeven: f64,
}

impl SupplySplit {
    fn from_raw(in_profit_btc: f64, in_loss_btc: f64, breakeven_btc: f64) -> Self {
        let total = in_profit_btc + in_loss_btc + breakeven_btc;
        Self {
            in_profit_btc,
            in_loss_btc,
            breakeven_btc,
            pct_in_profit: pct_of(in_profit_btc, total),
            pct_in_loss: pct_of(in_loss_btc, total),
            pct_breakeven: pct_of(breakeven_btc, total),
        }
    }
}

/// Frozen result of a Supply in Profit/Loss computation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SupplyProfitLossResult {
    pub overall: SupplySplit,
    pub sth: SupplySplit,
    pub lth: SupplySplit,
    pub phase: MarketPhase,
    pub signal_strength: f64,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl SupplyProfitLossResult {
    /// `*_raw` triples are `(in_profit_btc, in_loss_btc, breakeven_btc)` as
    /// produced by `Store::get_profit_loss_supply` for, respectively, the
    /// whole set, the STH cohort, and the LTH cohort.
    pub fn calculate(
        overall_raw: (f64, f64, f64),
        sth_raw: (f64, f64, f64),
        lth_raw: (f64, f64, f64),
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Result<Self, MetricError> {
        let overall = SupplySplit::from_raw(overall_raw.0, overall_raw.1, overall_raw.2);
        let sth = SupplySplit::from_raw(sth_raw.0, sth_raw.1, sth_raw.2);
        let lth = SupplySplit::from_raw(lth_raw.0, lth_raw.1, lth_raw.2);

        let total = overall.in_profit_btc + overall.in_loss_btc + overall.breakeven_btc;
        let cohort_total = sth.in_profit_btc + sth.in_loss_btc + sth.breakeven_btc
            + lth.in_profit_btc + lth.in_loss_btc + lth.breakeven_btc;
        if total > 0.0 {
            check_range("sth_lth_reconciliation", (cohort_total - total).abs() / total, 0.0, 0.01)?;
        }

        let p = overall.pct_in_profit;
        let phase = if p > 95.0 {
            MarketPhase::Euphoria
        } else if p > 80.0 {
            MarketPhase::Bull
        } else if p >= 50.0 {
            MarketPhase::Transition
        } else {
            MarketPhase::Capitulation
        };
        let signal_strength = clamp01((p - 50.0).abs() / 50.0);

        Ok(Self {
            overall,
            sth,
            lth,
            phase,
            signal_strength,
            block_height,
            computed_at,
        })
    }
}

/// The STH/LTH creation-block cutoff for a given current block height
/// (§4.4.2: `current − threshold_days × blocks_per_day`). Both come from
/// [`ocf_core::config::Config`] (`sth_lth_threshold_days`, `blocks_per_day`).
pub fn sth_lth_cutoff_block(current_height: u64, threshold_days: u64, blocks_per_day: u64) -> u64 {
    current_height.saturating_sub(threshold_days.saturating_mul(blocks_per_day))
}
