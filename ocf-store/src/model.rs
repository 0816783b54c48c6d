//! Row types backing the `utxo`, `daily_prices`, and `block_heights` tables.
//!
//! Monetary fields are modelled as `f64` rather than [`rust_decimal::Decimal`]:
//! every on-chain metric in this workspace (URPD buckets, MVRV ratios,
//! z-scores, percentages) is a ratio or statistic computed by DuckDB's
//! native floating aggregation, not an accounting total, so the exactness
//! `Decimal` buys is not load-bearing here. The backtest crate reintroduces
//! `Decimal` at the P&L-accounting boundary, matching this ecosystem's
//! analytics convention (see `ocf-backtest::metric`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single unspent-or-spent transaction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub btc_value: f64,
    pub creation_block: u64,
    pub creation_timestamp: chrono::DateTime<chrono::Utc>,
    pub creation_price_usd: f64,
    pub is_spent: bool,
    pub spent_block: Option<u64>,
    pub spent_timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub spent_price_usd: Option<f64>,
}

impl Utxo {
    /// Age of the UTXO, in blocks, relative to `current_height`. For spent
    /// UTXOs this is the age at spend time; for unspent, the age today.
    pub fn age_blocks(&self, current_height: u64) -> u64 {
        let end = self.spent_block.unwrap_or(current_height);
        end.saturating_sub(self.creation_block)
    }
}

/// A `(date, price_usd)` row in the daily-price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub price_usd: f64,
}

/// A `(height, timestamp)` row in the block-height mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockHeightRow {
    pub height: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One bucket of the UTXO Realised Price Distribution, pre-percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub price_low: f64,
    pub price_high: f64,
    pub btc: f64,
    pub count: u64,
}

/// A single row yielded by `get_spent_in_window`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpentRow {
    pub btc_value: f64,
    pub creation_price_usd: f64,
    pub spent_price_usd: f64,
    pub creation_block: u64,
    pub spent_block: u64,
    pub age_days: f64,
}
