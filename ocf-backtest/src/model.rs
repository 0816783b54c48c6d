//! Backtest input/output shapes.

use chrono::NaiveDate;
use ocf_fusion::Action;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::metric::{MaxDrawdown, ProfitFactor, SharpeRatio, WinRate};

/// One point of the realised-price series the backtester replays against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealisedPricePoint {
    pub date: NaiveDate,
    pub price_usd: f64,
}

/// How often each action was taken over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionCounts {
    pub buy: u32,
    pub sell: u32,
    pub hold: u32,
}

impl ActionCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Buy => self.buy += 1,
            Action::Sell => self.sell += 1,
            Action::Hold => self.hold += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.buy + self.sell + self.hold
    }
}

/// One simulated day's outcome (§4.8, step 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub action: Action,
    pub realised_return_pct: f64,
    pub won: bool,
    pub daily_strategy_return: f64,
}

/// The JSON report emitted by `ocf-cli backtest` (§6 "Persisted state layout").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub n_days: usize,
    pub counts_by_action: ActionCounts,
    pub win_rate: Option<WinRate>,
    pub profit_factor: Option<ProfitFactor>,
    pub cumulative_return: Decimal,
    pub sharpe_ratio: SharpeRatio,
    pub max_drawdown: Option<MaxDrawdown>,
    pub optimized_weights: Option<Vec<f64>>,
}
