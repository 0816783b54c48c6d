//! Backtest performance metrics.
//!
//! Same value-object convention used by this ecosystem's analytics crate: a
//! frozen struct holding `value: Decimal`, built via a `calculate(...)`
//! associated function that returns `None` on a degenerate input rather than
//! dividing by zero.

pub mod drawdown;
pub mod profit_factor;
pub mod sharpe;
pub mod win_rate;

pub use drawdown::MaxDrawdown;
pub use profit_factor::ProfitFactor;
pub use sharpe::SharpeRatio;
pub use win_rate::WinRate;
