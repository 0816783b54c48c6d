//! Optional weight grid-search (§4.8), evaluated on the last 30% of the
//! window so the chosen weights aren't fit and scored on the same data.

use chrono::NaiveDate;
use ocf_core::SignalVote;
use ocf_fusion::FusionConfig;

use crate::error::BacktestError;
use crate::model::{ActionCounts, BacktestReport, RealisedPricePoint};
use crate::vote_source::DailyVoteSource;
use crate::walk_forward::{simulate_days, summarise};

const HOLDOUT_FRACTION: f64 = 0.30;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-2;

struct ReweightedVoteSource<'a> {
    inner: &'a dyn DailyVoteSource,
    weights: &'a [f64],
}

impl DailyVoteSource for ReweightedVoteSource<'_> {
    fn votes_for(&self, date: NaiveDate) -> Result<Vec<SignalVote>, BacktestError> {
        let mut votes = self.inner.votes_for(date)?;
        for (vote, &weight) in votes.iter_mut().zip(self.weights) {
            vote.weight = weight;
        }
        Ok(votes)
    }
}

/// Evaluates each candidate weight vector against the held-out tail of
/// `prices`, discarding candidates whose weights don't sum to `1 ± 1e-2`
/// (the same active-weight-sum constraint the fusion engine itself
/// enforces), and returns the report for the candidate with the best
/// held-out cumulative return.
pub fn grid_search(
    prices: &[RealisedPricePoint],
    vote_source: &dyn DailyVoteSource,
    config: &FusionConfig,
    seed: u64,
    weight_grid: &[Vec<f64>],
) -> Result<BacktestReport, BacktestError> {
    if weight_grid.is_empty() {
        return Err(BacktestError::EmptyWeightGrid);
    }
    if prices.len() < 2 {
        return Err(BacktestError::InsufficientPriceHistory(prices.len()));
    }

    let split = (((prices.len() as f64) * (1.0 - HOLDOUT_FRACTION)).floor() as usize).clamp(1, prices.len() - 1);
    let held_out = &prices[split..];
    if held_out.len() < 2 {
        return Err(BacktestError::InsufficientPriceHistory(held_out.len()));
    }

    let mut best: Option<BacktestReport> = None;
    for weights in weight_grid {
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            continue;
        }

        let reweighted = ReweightedVoteSource { inner: vote_source, weights };
        let day_results = simulate_days(held_out, &reweighted, config, seed)?;
        let counts = day_results.iter().fold(ActionCounts::default(), |mut acc, day| {
            acc.record(day.action);
            acc
        });
        let report = summarise(held_out[0].date, held_out[held_out.len() - 1].date, &day_results, counts, Some(weights.clone()));

        if best.as_ref().is_none_or(|b| report.cumulative_return > b.cumulative_return) {
            best = Some(report);
        }
    }

    best.ok_or(BacktestError::EmptyWeightGrid)
}
