//! Input shapes for the two bootstrap tiers. Both are deliberately thin:
//! the chainstate dump and the block stream are owned by the opaque
//! full-node RPC / block indexer (§1 excludes their protocol), so these
//! structs are the seam this crate accepts data through, not a parser for
//! any particular wire format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of a chainstate (UTXO-set) dump, as consumed by Tier 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainstateEntry {
    pub txid: String,
    pub vout: u32,
    pub btc_value: f64,
    pub creation_block: u64,
}

/// A fully-populated block, as consumed by Tier 2.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    pub height: u64,
    pub timestamp: DateTime<Utc>,
    pub new_outputs: Vec<NewOutput>,
    pub spent_inputs: Vec<SpentInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOutput {
    pub txid: String,
    pub vout: u32,
    pub btc_value: f64,
}

/// A transaction input referencing a previously-created output. `btc_value`
/// and `creation_block` are carried so a missing prevout (a Tier-1 gap) can
/// still be synthesised into a row (§4.2 Failure semantics) instead of
/// aborting the block outright.
#[derive(Debug, Clone, PartialEq)]
pub struct SpentInput {
    pub txid: String,
    pub vout: u32,
    pub btc_value: Option<f64>,
    pub creation_block: Option<u64>,
}

/// Progress snapshot emitted by Tier 2 at a configurable cadence (§4.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub current_height: u64,
    pub target_height: u64,
    pub rows_written: u64,
    pub elapsed: std::time::Duration,
}

/// A date's worth of `(height range, price)` used to seed the daily-price
/// and height tables during Tier 1 (§4.2 step i/ii).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightDate {
    pub height: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price_usd: f64,
}
