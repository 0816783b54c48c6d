//! The lifecycle store (C1): the sole owner of the `utxo`, `daily_prices`,
//! and `block_heights` tables.
//!
//! `Store` wraps a single [`duckdb::Connection`] behind a [`parking_lot::Mutex`].
//! DuckDB's own MVCC gives snapshot-isolated reads, but a single `Connection`
//! handle is not safe to drive from two threads at once, so the mutex models
//! §5's "writers serialise" rule directly: every query (read or write) takes
//! the lock for the duration of one statement, and callers that need
//! overlapping reads open additional `Store` handles against the same file.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{params, Connection};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::model::{BlockHeightRow, DailyPrice, PriceBucket, SpentRow, Utxo};
use crate::schema;
use ocf_core::error::{MissingHeightData, MissingPriceData};

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (creating if absent) the lifecycle database at `path` and
    /// ensures its schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory store, used by tests and by callers that only need a
    /// throwaway snapshot (e.g. backtest fixtures).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ---- C1 read contract --------------------------------------------

    /// Sum of `btc_value` where not spent.
    pub fn get_unspent_supply(&self) -> Result<f64, StoreError> {
        let conn = self.conn.lock();
        let value: Option<f64> = conn.query_row(
            "SELECT SUM(btc_value) FROM utxo WHERE is_spent = FALSE",
            [],
            |row| row.get(0),
        )?;
        Ok(value.unwrap_or(0.0))
    }

    /// `Σ btc_value × creation_price_usd` over unspent UTXOs, optionally
    /// restricted to a `creation_block` range (inclusive lower, exclusive
    /// upper — matches the STH/LTH cutoff convention used by `ocf-metrics`).
    pub fn get_realized_cap(&self, filter: Option<CohortFilter>) -> Result<f64, StoreError> {
        let conn = self.conn.lock();
        let value: Option<f64> = match filter {
            None => conn.query_row(
                "SELECT SUM(btc_value * creation_price_usd) FROM utxo WHERE is_spent = FALSE",
                [],
                |row| row.get(0),
            )?,
            Some(CohortFilter::CreationBlockGreaterThan(cutoff)) => conn.query_row(
                "SELECT SUM(btc_value * creation_price_usd) FROM utxo \
                 WHERE is_spent = FALSE AND creation_block > ?",
                params![cutoff],
                |row| row.get(0),
            )?,
            Some(CohortFilter::CreationBlockAtMost(cutoff)) => conn.query_row(
                "SELECT SUM(btc_value * creation_price_usd) FROM utxo \
                 WHERE is_spent = FALSE AND creation_block <= ?",
                params![cutoff],
                |row| row.get(0),
            )?,
        };
        Ok(value.unwrap_or(0.0))
    }

    /// Groups unspent UTXOs by price bucket:
    /// `FLOOR(creation_price_usd / bucket) * bucket` as key.
    pub fn group_unspent_by_price_bucket(&self, bucket_size_usd: f64) -> Result<Vec<PriceBucket>, StoreError> {
        assert!(bucket_size_usd > 0.0, "bucket_size_usd must be positive");
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT FLOOR(creation_price_usd / ?) * ? AS low, \
                    SUM(btc_value) AS btc, \
                    COUNT(*) AS cnt \
             FROM utxo \
             WHERE is_spent = FALSE \
             GROUP BY low \
             ORDER BY low DESC",
        )?;
        let rows = stmt.query_map(params![bucket_size_usd, bucket_size_usd], |row| {
            let low: f64 = row.get(0)?;
            let btc: f64 = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok(PriceBucket {
                price_low: low,
                price_high: low + bucket_size_usd,
                btc,
                count: count as u64,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Classifies unspent supply by `sign(current_price − creation_price)`,
    /// with `|current − creation| < 0.01 × current` counting as break-even
    /// (§4.4.2), restricted to `filter`'s cohort if given. Pushed into SQL
    /// rather than materialised so the classification scales with the full
    /// UTXO set rather than application-side iteration.
    pub fn get_profit_loss_supply(
        &self,
        current_price: f64,
        filter: Option<CohortFilter>,
    ) -> Result<(f64, f64, f64), StoreError> {
        let conn = self.conn.lock();
        let cohort_clause = match filter {
            None => String::new(),
            Some(CohortFilter::CreationBlockGreaterThan(cutoff)) => format!(" AND creation_block > {cutoff}"),
            Some(CohortFilter::CreationBlockAtMost(cutoff)) => format!(" AND creation_block <= {cutoff}"),
        };
        let sql = format!(
            "SELECT \
                SUM(CASE WHEN ABS(? - creation_price_usd) < 0.01 * ? THEN btc_value ELSE 0 END) AS breakeven, \
                SUM(CASE WHEN ? - creation_price_usd >= 0.01 * ? THEN btc_value ELSE 0 END) AS profit, \
                SUM(CASE WHEN creation_price_usd - ? >= 0.01 * ? THEN btc_value ELSE 0 END) AS loss \
             FROM utxo WHERE is_spent = FALSE{cohort_clause}"
        );
        let (breakeven, profit, loss): (Option<f64>, Option<f64>, Option<f64>) = conn.query_row(
            &sql,
            params![current_price, current_price, current_price, current_price, current_price, current_price],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok((profit.unwrap_or(0.0), loss.unwrap_or(0.0), breakeven.unwrap_or(0.0)))
    }

    /// `Σ btc_value × (spent_block − creation_block)` over every spent UTXO
    /// ever recorded — the coin-blocks-destroyed total the Reserve Risk
    /// HODL-Bank proxy is built from (§4.4.4).
    pub fn get_cumulative_coinblocks_destroyed(&self) -> Result<f64, StoreError> {
        let conn = self.conn.lock();
        let value: Option<f64> = conn.query_row(
            "SELECT SUM(btc_value * (spent_block - creation_block)) FROM utxo \
             WHERE is_spent = TRUE AND spent_block IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(value.unwrap_or(0.0))
    }

    /// Spent UTXOs whose `spent_timestamp` falls in `[start_ts, end_ts)`,
    /// materialised eagerly — `ocf-metrics` consumes this for several
    /// metrics and §9 requires multi-pass consumers to materialise once.
    pub fn get_spent_in_window(
        &self,
        start_ts: DateTime<Utc>,
        end_ts: DateTime<Utc>,
    ) -> Result<Vec<SpentRow>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT btc_value, creation_price_usd, spent_price_usd, creation_block, spent_block, \
                    date_diff('day', creation_timestamp, spent_timestamp) AS age_days \
             FROM utxo \
             WHERE is_spent = TRUE AND spent_timestamp >= ? AND spent_timestamp < ?",
        )?;
        let rows = stmt.query_map(params![start_ts, end_ts], |row| {
            Ok(SpentRow {
                btc_value: row.get(0)?,
                creation_price_usd: row.get(1)?,
                spent_price_usd: row.get(2)?,
                creation_block: row.get::<_, i64>(3)? as u64,
                spent_block: row.get::<_, i64>(4)? as u64,
                age_days: row.get::<_, i64>(5)? as f64,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    pub fn get_daily_price(&self, date: NaiveDate) -> Result<f64, StoreError> {
        let conn = self.conn.lock();
        let value: Option<f64> = conn
            .query_row("SELECT price_usd FROM daily_prices WHERE date = ?", params![date], |row| row.get(0))
            .ok();
        value.ok_or_else(|| StoreError::MissingPrice(MissingPriceData { date }))
    }

    pub fn get_block_date(&self, height: u64) -> Result<NaiveDate, StoreError> {
        let conn = self.conn.lock();
        let ts: Option<DateTime<Utc>> = conn
            .query_row(
                "SELECT timestamp FROM block_heights WHERE height = ?",
                params![height],
                |row| row.get(0),
            )
            .ok();
        ts.map(|t| t.date_naive())
            .ok_or(StoreError::MissingHeight(MissingHeightData { height }))
    }

    /// Highest height present in the `block_heights` mapping, used as "now"
    /// by metrics that need a reference block height.
    pub fn latest_height(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let value: Option<i64> = conn.query_row("SELECT MAX(height) FROM block_heights", [], |row| row.get(0))?;
        Ok(value.unwrap_or(0) as u64)
    }

    /// Historical market-cap time series, one point per day, used by
    /// MVRV-Z (§4.4.3). `market_cap(date) = price(date) × unspent_supply_asof(date)`
    /// is not reconstructable from this table alone once UTXOs have moved;
    /// callers that need true historical market caps store them separately
    /// (see `ocf-metrics::mvrv::HistoricalMarketCap`). This helper only
    /// exposes the daily price series needed to build that input.
    pub fn daily_prices_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyPrice>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT date, price_usd FROM daily_prices WHERE date >= ? AND date <= ? ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(DailyPrice {
                date: row.get(0)?,
                price_usd: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    // ---- C2/C3 write contract (only these components may call these) --

    /// Upserts a single daily price row (append-mostly; late corrections
    /// overwrite by primary key — §4.3).
    pub fn upsert_daily_price(&self, price: DailyPrice) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO daily_prices (date, price_usd) VALUES (?, ?) \
             ON CONFLICT (date) DO UPDATE SET price_usd = excluded.price_usd",
            params![price.date, price.price_usd],
        )?;
        Ok(())
    }

    /// Upserts a single block-height row.
    pub fn upsert_block_height(&self, row: BlockHeightRow) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO block_heights (height, timestamp) VALUES (?, ?) \
             ON CONFLICT (height) DO UPDATE SET timestamp = excluded.timestamp",
            params![row.height, row.timestamp],
        )?;
        Ok(())
    }

    /// Bulk-loads UTXO rows via DuckDB's native [`duckdb::Appender`], the
    /// path required by §4.2 Tier 1 to be ≥1000× faster than row-by-row
    /// `INSERT`. All rows are inserted with `is_spent = false`.
    pub fn bulk_load_utxos(&self, rows: &[Utxo]) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let mut appender = conn.appender("utxo")?;
        for utxo in rows {
            appender.append_row(params![
                utxo.txid,
                utxo.vout,
                utxo.btc_value,
                utxo.creation_block,
                utxo.creation_timestamp,
                utxo.creation_price_usd,
                false,
                Option::<u64>::None,
                Option::<DateTime<Utc>>::None,
                Option::<f64>::None,
            ])?;
        }
        appender.flush()?;
        Ok(())
    }

    /// Inserts a single new UTXO (Tier 2, per-block new outputs).
    pub fn insert_utxo(&self, utxo: &Utxo) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO utxo (txid, vout, btc_value, creation_block, creation_timestamp, creation_price_usd, is_spent) \
             VALUES (?, ?, ?, ?, ?, ?, FALSE)",
            params![
                utxo.txid,
                utxo.vout,
                utxo.btc_value,
                utxo.creation_block,
                utxo.creation_timestamp,
                utxo.creation_price_usd,
            ],
        )?;
        Ok(())
    }

    /// Marks a UTXO spent. Creation fields are untouched (preserved
    /// verbatim, per §4.2 step 2). Returns `false` if no matching row
    /// existed (a Tier-1 gap, handled by the caller in `ocf-bootstrap`).
    pub fn mark_spent(
        &self,
        txid: &str,
        vout: u32,
        spent_block: u64,
        spent_timestamp: DateTime<Utc>,
        spent_price_usd: f64,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "UPDATE utxo SET is_spent = TRUE, spent_block = ?, spent_timestamp = ?, spent_price_usd = ? \
             WHERE txid = ? AND vout = ? AND is_spent = FALSE",
            params![spent_block, spent_timestamp, spent_price_usd, txid, vout],
        )?;
        Ok(affected > 0)
    }

    /// Checks whether a UTXO exists (used by Tier-2 replay to classify a
    /// missing prevout as a Tier-1 gap).
    pub fn utxo_exists(&self, txid: &str, vout: u32) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM utxo WHERE txid = ? AND vout = ?",
            params![txid, vout],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Runs `f` inside a DuckDB transaction, committing on `Ok` and rolling
    /// back on `Err` — the Tier-2 "commit per block" boundary (§4.2 step 3,
    /// §5 cancellation rollback).
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let conn = self.conn.lock();
        conn.execute_batch("BEGIN TRANSACTION")?;
        match f(&conn) {
            Ok(value) => {
                conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                conn.execute_batch("ROLLBACK")?;
                Err(e)
            }
        }
    }
}

/// Cohort restriction for [`Store::get_realized_cap`] (STH/LTH split, §4.4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortFilter {
    CreationBlockGreaterThan(u64),
    CreationBlockAtMost(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_utxo(txid: &str, vout: u32, btc: f64, block: u64, price: f64) -> Utxo {
        Utxo {
            txid: txid.to_string(),
            vout,
            btc_value: btc,
            creation_block: block,
            creation_timestamp: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            creation_price_usd: price,
            is_spent: false,
            spent_block: None,
            spent_timestamp: None,
            spent_price_usd: None,
        }
    }

    #[test]
    fn unspent_supply_sums_only_unspent_rows() {
        let store = Store::open_in_memory().unwrap();
        store
            .bulk_load_utxos(&[
                sample_utxo("a", 0, 1.0, 100, 10_000.0),
                sample_utxo("b", 0, 2.0, 100, 10_000.0),
            ])
            .unwrap();
        assert_eq!(store.get_unspent_supply().unwrap(), 3.0);

        store
            .mark_spent("a", 0, 200, Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(), 40_000.0)
            .unwrap();
        assert_eq!(store.get_unspent_supply().unwrap(), 2.0);
    }

    #[test]
    fn urpd_buckets_match_scenario_s1() {
        let store = Store::open_in_memory().unwrap();
        store
            .bulk_load_utxos(&[
                sample_utxo("a", 0, 1.0, 100, 10_000.0),
                sample_utxo("b", 0, 2.0, 100, 12_500.0),
                sample_utxo("c", 0, 0.5, 100, 54_000.0),
            ])
            .unwrap();

        let buckets = store.group_unspent_by_price_bucket(5_000.0).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].price_low, 50_000.0);
        assert!((buckets[0].btc - 0.5).abs() < 1e-9);
        assert_eq!(buckets[1].price_low, 10_000.0);
        assert!((buckets[1].btc - 3.0).abs() < 1e-9);
    }

    #[test]
    fn missing_price_is_fatal() {
        let store = Store::open_in_memory().unwrap();
        let err = store.get_daily_price(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::MissingPrice(_)));
    }

    #[test]
    fn cohort_realized_cap_reconciles_with_total() {
        let store = Store::open_in_memory().unwrap();
        store
            .bulk_load_utxos(&[
                sample_utxo("a", 0, 1.0, 50, 10_000.0),
                sample_utxo("b", 0, 1.0, 150, 20_000.0),
            ])
            .unwrap();

        let total = store.get_realized_cap(None).unwrap();
        let sth = store.get_realized_cap(Some(CohortFilter::CreationBlockGreaterThan(100))).unwrap();
        let lth = store.get_realized_cap(Some(CohortFilter::CreationBlockAtMost(100))).unwrap();
        assert!((sth + lth - total).abs() / total < 0.01);
    }

    #[test]
    fn profit_loss_supply_classifies_by_current_price() {
        let store = Store::open_in_memory().unwrap();
        store
            .bulk_load_utxos(&[
                sample_utxo("profit", 0, 1.0, 100, 10_000.0),
                sample_utxo("loss", 0, 1.0, 100, 50_000.0),
                sample_utxo("breakeven", 0, 1.0, 100, 19_990.0),
            ])
            .unwrap();

        let (profit, loss, breakeven) = store.get_profit_loss_supply(20_000.0, None).unwrap();
        assert!((profit - 1.0).abs() < 1e-9);
        assert!((loss - 1.0).abs() < 1e-9);
        assert!((breakeven - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cumulative_coinblocks_destroyed_only_counts_spent_rows() {
        let store = Store::open_in_memory().unwrap();
        store.bulk_load_utxos(&[sample_utxo("a", 0, 2.0, 100, 10_000.0)]).unwrap();
        store
            .mark_spent("a", 0, 300, Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(), 40_000.0)
            .unwrap();
        assert_eq!(store.get_cumulative_coinblocks_destroyed().unwrap(), 400.0);
    }

    #[test]
    fn with_transaction_rolls_back_on_error() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), StoreError> = store.with_transaction(|conn| {
            conn.execute(
                "INSERT INTO utxo (txid, vout, btc_value, creation_block, creation_timestamp, creation_price_usd) \
                 VALUES ('x', 0, 1.0, 1, '2021-01-01T00:00:00Z', 1.0)",
                [],
            )?;
            Err(StoreError::Integrity {
                row: "x:0".to_string(),
                reason: "forced rollback for test".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(store.get_unspent_supply().unwrap(), 0.0);
    }
}
