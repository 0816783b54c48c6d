//! The seam through which the walk-forward evaluator obtains each day's
//! votes, mirroring how C3 models its external feeds as traits
//! ([`ocf_store::price_index::PriceSource`]).

use chrono::NaiveDate;
use ocf_core::SignalVote;

use crate::error::BacktestError;

/// Supplies the C4/C5 votes for one simulated day.
///
/// Implementations own the no-lookahead guarantee (§8, property 8): they
/// must resolve `date` using only store rows whose `creation_block` and
/// `spent_block` are at or before that day's height. The evaluator itself
/// performs no additional filtering — it trusts this contract.
pub trait DailyVoteSource {
    fn votes_for(&self, date: NaiveDate) -> Result<Vec<SignalVote>, BacktestError>;
}
