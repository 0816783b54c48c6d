//! Price-Indexing Service (C3): builds and refreshes the daily-price and
//! block-height tables from external, opaque endpoints.
//!
//! The price API and block-metadata source are genuinely external
//! collaborators (§1 excludes their protocol details), so they are modelled
//! here as traits. Production wiring supplies a concrete implementation;
//! tests supply an in-memory fixture.

use std::collections::BTreeMap;
use std::thread::sleep;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use ocf_core::config::Config;
use tracing::{error, warn};

use crate::error::StoreError;
use crate::model::{BlockHeightRow, DailyPrice};
use crate::store::Store;

/// An opaque daily USD price feed, keyed by calendar date.
///
/// No interpolation happens here or anywhere in C3 (§4.3) — a date with no
/// upstream price is reported as a gap in the returned map, and the caller
/// (`PriceIndexService`) turns that into a fatal [`StoreError::PriceSourceUnavailable`].
pub trait PriceSource {
    fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> Result<BTreeMap<NaiveDate, f64>, String>;
}

/// An opaque block-height → timestamp feed.
pub trait BlockMetadataSource {
    fn fetch_range(&self, start_height: u64, end_height: u64) -> Result<BTreeMap<u64, DateTime<Utc>>, String>;
}

/// Retry policy shared with the rest of this workspace's external-I/O
/// components (base delay, exponential factor, max attempts — §5, §7).
/// [`Self::default`] stays a literal convenience for tests; production
/// callers should build this from [`Config`] via [`Self::from_config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub factor: f64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            factor: 2.0,
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base: config.retry_base,
            factor: config.retry_factor,
            max_attempts: config.retry_max_attempts,
        }
    }
}

fn retry<T, E: std::fmt::Display>(policy: RetryPolicy, mut op: impl FnMut() -> Result<T, E>) -> Result<T, String> {
    let mut attempt = 0;
    let mut delay = policy.base;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_attempts => {
                error!(attempt, "external call failed after exhausting retries: {e}");
                return Err(e.to_string());
            }
            Err(e) => {
                warn!(attempt, delay_ms = delay.as_millis() as u64, "external call failed, retrying: {e}");
                sleep(delay);
                delay = Duration::from_secs_f64(delay.as_secs_f64() * policy.factor);
            }
        }
    }
}

/// The C3 writer: the only component (besides C2) permitted to write the
/// `daily_prices` and `block_heights` tables.
pub struct PriceIndexService<P, B> {
    price_source: P,
    block_source: B,
    retry_policy: RetryPolicy,
}

impl<P: PriceSource, B: BlockMetadataSource> PriceIndexService<P, B> {
    pub fn new(price_source: P, block_source: B, retry_policy: RetryPolicy) -> Self {
        Self {
            price_source,
            block_source,
            retry_policy,
        }
    }

    /// Refreshes the block-height mapping for `[start_height, end_height]`.
    /// Price-source-style unavailability is fatal at this layer (§4.3).
    pub fn refresh_block_heights(&self, store: &Store, start_height: u64, end_height: u64) -> Result<usize, StoreError> {
        let rows = retry(self.retry_policy, || self.block_source.fetch_range(start_height, end_height))
            .map_err(StoreError::BlockSourceUnavailable)?;
        for (height, timestamp) in &rows {
            store.upsert_block_height(BlockHeightRow {
                height: *height,
                timestamp: *timestamp,
            })?;
        }
        Ok(rows.len())
    }

    /// Refreshes the daily-price series for `[start, end]`. Any gap in the
    /// fetched range is fatal — no interpolation is performed (§4.3).
    pub fn refresh_daily_prices(&self, store: &Store, start: NaiveDate, end: NaiveDate) -> Result<usize, StoreError> {
        let prices = retry(self.retry_policy, || self.price_source.fetch_range(start, end))
            .map_err(StoreError::PriceSourceUnavailable)?;

        let mut cursor = start;
        while cursor <= end {
            if !prices.contains_key(&cursor) {
                return Err(StoreError::PriceSourceUnavailable(format!(
                    "gap in fetched price series at {cursor}"
                )));
            }
            cursor = cursor.succ_opt().expect("NaiveDate does not overflow within a bootstrap span");
        }

        for (date, price_usd) in &prices {
            store.upsert_daily_price(DailyPrice {
                date: *date,
                price_usd: *price_usd,
            })?;
        }
        Ok(prices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedPriceSource(BTreeMap<NaiveDate, f64>);
    impl PriceSource for FixedPriceSource {
        fn fetch_range(&self, _start: NaiveDate, _end: NaiveDate) -> Result<BTreeMap<NaiveDate, f64>, String> {
            Ok(self.0.clone())
        }
    }

    struct FlakyPriceSource {
        attempts_until_success: Cell<u32>,
        payload: BTreeMap<NaiveDate, f64>,
    }
    impl PriceSource for FlakyPriceSource {
        fn fetch_range(&self, _start: NaiveDate, _end: NaiveDate) -> Result<BTreeMap<NaiveDate, f64>, String> {
            let remaining = self.attempts_until_success.get();
            if remaining > 0 {
                self.attempts_until_success.set(remaining - 1);
                Err("transient failure".to_string())
            } else {
                Ok(self.payload.clone())
            }
        }
    }

    struct NoopBlockSource;
    impl BlockMetadataSource for NoopBlockSource {
        fn fetch_range(&self, _s: u64, _e: u64) -> Result<BTreeMap<u64, DateTime<Utc>>, String> {
            Ok(BTreeMap::new())
        }
    }

    fn fast_retry_policy() -> RetryPolicy {
        RetryPolicy {
            base: Duration::from_millis(1),
            factor: 1.0,
            max_attempts: 3,
        }
    }

    #[test]
    fn refresh_daily_prices_writes_every_date_in_range() {
        let store = Store::open_in_memory().unwrap();
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        let mut payload = BTreeMap::new();
        payload.insert(start, 10_000.0);
        payload.insert(start.succ_opt().unwrap(), 11_000.0);
        payload.insert(end, 12_000.0);

        let service = PriceIndexService::new(FixedPriceSource(payload), NoopBlockSource, fast_retry_policy());
        let written = service.refresh_daily_prices(&store, start, end).unwrap();
        assert_eq!(written, 3);
        assert_eq!(store.get_daily_price(end).unwrap(), 12_000.0);
    }

    #[test]
    fn refresh_daily_prices_fails_fatally_on_gap() {
        let store = Store::open_in_memory().unwrap();
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        let mut payload = BTreeMap::new();
        payload.insert(start, 10_000.0);
        // gap: 2021-01-02 missing
        payload.insert(end, 12_000.0);

        let service = PriceIndexService::new(FixedPriceSource(payload), NoopBlockSource, fast_retry_policy());
        let err = service.refresh_daily_prices(&store, start, end).unwrap_err();
        assert!(matches!(err, StoreError::PriceSourceUnavailable(_)));
    }

    #[test]
    fn retry_succeeds_after_transient_failures() {
        let store = Store::open_in_memory().unwrap();
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let mut payload = BTreeMap::new();
        payload.insert(start, 10_000.0);

        let source = FlakyPriceSource {
            attempts_until_success: Cell::new(2),
            payload,
        };
        let service = PriceIndexService::new(source, NoopBlockSource, fast_retry_policy());
        let written = service.refresh_daily_prices(&store, start, start).unwrap();
        assert_eq!(written, 1);
    }
}
