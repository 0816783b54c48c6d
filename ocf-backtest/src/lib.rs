//! Signal Backtester (C8): replays the fusion engine across a historical
//! window using realised prices, producing win-rate, Sharpe, drawdown, and
//! an optional held-out weight grid-search.
//!
//! ```text
//! vote_source.rs   # DailyVoteSource — no-lookahead vote contract
//! walk_forward.rs  # day-by-day simulation + report summarisation
//! grid_search.rs   # held-out weight optimisation
//! model.rs         # RealisedPricePoint, DayResult, BacktestReport
//! metric/          # WinRate, SharpeRatio, ProfitFactor, MaxDrawdown
//! error.rs         # BacktestError
//! ```

pub mod error;
pub mod grid_search;
pub mod metric;
pub mod model;
pub mod vote_source;
pub mod walk_forward;

pub use error::BacktestError;
pub use grid_search::grid_search;
pub use metric::{MaxDrawdown, ProfitFactor, SharpeRatio, WinRate};
pub use model::{ActionCounts, BacktestReport, DayResult, RealisedPricePoint};
pub use vote_source::DailyVoteSource;
pub use walk_forward::walk_forward;
