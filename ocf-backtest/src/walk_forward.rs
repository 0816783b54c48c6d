//! Walk-forward evaluator (§4.8): replays the fusion engine one day at a
//! time over a realised-price window and scores each day's action against
//! the next day's realised move.

use chrono::NaiveDate;
use ocf_fusion::{fuse, Action, FusionConfig};
use rust_decimal::Decimal;

use crate::error::BacktestError;
use crate::metric::{MaxDrawdown, ProfitFactor, SharpeRatio, WinRate};
use crate::model::{ActionCounts, BacktestReport, DayResult, RealisedPricePoint};
use crate::vote_source::DailyVoteSource;

const HOLD_TOLERANCE_PCT: f64 = 0.5;

pub fn walk_forward(
    prices: &[RealisedPricePoint],
    vote_source: &dyn DailyVoteSource,
    config: &FusionConfig,
    seed: u64,
) -> Result<BacktestReport, BacktestError> {
    let day_results = simulate_days(prices, vote_source, config, seed)?;
    let counts = day_results.iter().fold(ActionCounts::default(), |mut acc, day| {
        acc.record(day.action);
        acc
    });
    Ok(summarise(prices[0].date, prices[prices.len() - 1].date, &day_results, counts, None))
}

/// Runs the day-by-day simulation, without summarising — split out so grid
/// search can reuse it across candidate weight sets.
pub(crate) fn simulate_days(
    prices: &[RealisedPricePoint],
    vote_source: &dyn DailyVoteSource,
    config: &FusionConfig,
    seed: u64,
) -> Result<Vec<DayResult>, BacktestError> {
    if prices.len() < 2 {
        return Err(BacktestError::InsufficientPriceHistory(prices.len()));
    }
    for pair in prices.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(BacktestError::UnsortedPriceHistory { prev: pair[0].date, next: pair[1].date });
        }
    }

    let mut day_results = Vec::with_capacity(prices.len() - 1);
    for (i, point) in prices[..prices.len() - 1].iter().enumerate() {
        let votes = vote_source.votes_for(point.date)?;
        let fused = fuse(&votes, config, seed);

        let next_price = prices[i + 1].price_usd;
        let realised_return_pct = (next_price - point.price_usd) / point.price_usd * 100.0;

        let won = match fused.action {
            Action::Buy => realised_return_pct > 0.0,
            Action::Sell => realised_return_pct < 0.0,
            Action::Hold => realised_return_pct.abs() <= HOLD_TOLERANCE_PCT,
        };

        let daily_strategy_return = match fused.action {
            Action::Buy => realised_return_pct / 100.0,
            Action::Sell => -realised_return_pct / 100.0,
            Action::Hold => 0.0,
        };

        day_results.push(DayResult { date: point.date, action: fused.action, realised_return_pct, won, daily_strategy_return });
    }
    Ok(day_results)
}

pub(crate) fn summarise(
    start_date: NaiveDate,
    end_date: NaiveDate,
    day_results: &[DayResult],
    counts: ActionCounts,
    optimized_weights: Option<Vec<f64>>,
) -> BacktestReport {
    let wins = day_results.iter().filter(|d| d.won).count();
    let win_rate = WinRate::calculate(Decimal::from(wins), Decimal::from(day_results.len()));

    let gross_wins: Decimal = day_results
        .iter()
        .filter(|d| d.daily_strategy_return > 0.0)
        .map(|d| Decimal::from_f64_retain(d.daily_strategy_return).unwrap_or(Decimal::ZERO))
        .sum();
    let gross_losses: Decimal = day_results
        .iter()
        .filter(|d| d.daily_strategy_return < 0.0)
        .map(|d| Decimal::from_f64_retain(d.daily_strategy_return.abs()).unwrap_or(Decimal::ZERO))
        .sum();
    let profit_factor = ProfitFactor::calculate(gross_wins, gross_losses);

    let mut equity_curve = Vec::with_capacity(day_results.len() + 1);
    let mut equity = Decimal::ONE;
    equity_curve.push(equity);
    for day in day_results {
        let daily = Decimal::from_f64_retain(day.daily_strategy_return).unwrap_or(Decimal::ZERO);
        equity *= Decimal::ONE + daily;
        equity_curve.push(equity);
    }
    let cumulative_return = equity - Decimal::ONE;
    let max_drawdown = MaxDrawdown::calculate(&equity_curve);

    let returns: Vec<f64> = day_results.iter().map(|d| d.daily_strategy_return).collect();
    let mean_return = if returns.is_empty() { 0.0 } else { returns.iter().sum::<f64>() / returns.len() as f64 };
    let variance = if returns.len() < 2 {
        0.0
    } else {
        returns.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / returns.len() as f64
    };
    let sharpe_ratio = SharpeRatio::calculate(
        Decimal::ZERO,
        Decimal::from_f64_retain(mean_return).unwrap_or(Decimal::ZERO),
        Decimal::from_f64_retain(variance.sqrt()).unwrap_or(Decimal::ZERO),
    );

    BacktestReport {
        start_date,
        end_date,
        n_days: day_results.len(),
        counts_by_action: counts,
        win_rate,
        profit_factor,
        cumulative_return,
        sharpe_ratio,
        max_drawdown,
        optimized_weights,
    }
}
