//! Row shapes read from the externally-owned derivatives database.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundingRateRow {
    pub ts: DateTime<Utc>,
    pub funding_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenInterestRow {
    pub ts: DateTime<Utc>,
    pub open_interest: f64,
}

/// Whale-direction context supplied by the caller (derived elsewhere from
/// C1 data), consumed by the open-interest decision table (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhaleDirection {
    Accumulation,
    Distribution,
    Neutral,
}
