//! The two-tier, idempotent bootstrap pipeline (C2).

use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use ocf_store::{DailyPrice, Store, Utxo};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::BootstrapError;
use crate::model::{BlockData, ChainstateEntry, HeightDate, PricePoint, Progress};

/// Result of a Tier-1 snapshot load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tier1Summary {
    pub heights_written: usize,
    pub prices_written: usize,
    pub utxos_written: usize,
}

/// Result of a Tier-2 incremental replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier2Summary {
    pub blocks_applied: u64,
    pub rows_written: u64,
    pub skipped_blocks: Vec<u64>,
}

/// Tier 1 — bulk-loads a chainstate (UTXO-set) snapshot.
///
/// `heights` and `prices` seed the height→date and daily-price tables for
/// the full span covered by the dump (§4.2 step i/ii) *before* the bulk
/// load, so every row's `creation_price_usd` can be resolved by joining
/// `creation_block → date → price` in memory rather than one query per row.
pub fn tier1_snapshot(
    store: &Store,
    heights: &[HeightDate],
    prices: &[PricePoint],
    entries: &[ChainstateEntry],
) -> Result<Tier1Summary, BootstrapError> {
    for h in heights {
        store.upsert_block_height(ocf_store::BlockHeightRow {
            height: h.height,
            timestamp: h.timestamp,
        })?;
    }
    for p in prices {
        store.upsert_daily_price(DailyPrice {
            date: p.date,
            price_usd: p.price_usd,
        })?;
    }

    let height_to_date: HashMap<u64, NaiveDate> = heights.iter().map(|h| (h.height, h.timestamp.date_naive())).collect();
    let date_to_price: HashMap<NaiveDate, f64> = prices.iter().map(|p| (p.date, p.price_usd)).collect();

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let date = *height_to_date
            .get(&entry.creation_block)
            .ok_or(ocf_store::StoreError::MissingHeight(ocf_core::error::MissingHeightData {
                height: entry.creation_block,
            }))?;
        let price = *date_to_price
            .get(&date)
            .ok_or(ocf_store::StoreError::MissingPrice(ocf_core::error::MissingPriceData { date }))?;

        rows.push(Utxo {
            txid: entry.txid.clone(),
            vout: entry.vout,
            btc_value: entry.btc_value,
            creation_block: entry.creation_block,
            creation_timestamp: date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
            creation_price_usd: price,
            is_spent: false,
            spent_block: None,
            spent_timestamp: None,
            spent_price_usd: None,
        });
    }

    let utxos_written = rows.len();
    store.bulk_load_utxos(&rows)?;

    info!(
        heights = heights.len(),
        prices = prices.len(),
        utxos = utxos_written,
        "tier 1 snapshot loaded"
    );

    Ok(Tier1Summary {
        heights_written: heights.len(),
        prices_written: prices.len(),
        utxos_written,
    })
}

/// Tier 2 — replays blocks in strict height order, preserving creation
/// fields of spent rows verbatim (§4.2 step 2) and committing per block
/// (§4.2 step 3 / §5 ordering guarantees).
///
/// `progress_cadence` controls how often `on_progress` is invoked (every
/// `progress_cadence` blocks); pass `1` to report every block.
pub fn tier2_replay(
    store: &Store,
    blocks: impl IntoIterator<Item = BlockData>,
    target_height: u64,
    progress_cadence: u64,
    mut on_progress: impl FnMut(Progress),
) -> Result<Tier2Summary, BootstrapError> {
    let started = Instant::now();
    let mut summary = Tier2Summary {
        blocks_applied: 0,
        rows_written: 0,
        skipped_blocks: Vec::new(),
    };

    for block in blocks {
        let height = block.height;
        let result = store.with_transaction(|conn| apply_block(conn, &block));

        match result {
            Ok(rows) => {
                summary.blocks_applied += 1;
                summary.rows_written += rows;
            }
            Err(e) => {
                warn!(height, error = %e, "skipping block: Tier-1 gap with insufficient data to synthesise");
                summary.skipped_blocks.push(height);
            }
        }

        if summary.blocks_applied % progress_cadence == 0 {
            on_progress(Progress {
                current_height: height,
                target_height,
                rows_written: summary.rows_written,
                elapsed: started.elapsed(),
            });
        }
    }

    Ok(summary)
}

/// Applies a single block's outputs and inputs. Returns the number of rows
/// touched. The caller wraps this in a transaction so a failure here rolls
/// back the whole block (no partial commits, §4.2 step 3).
///
/// `conn` is the connection `Store::with_transaction` already holds locked
/// for this call — every read/write here goes through it directly with raw
/// SQL, mirroring `Store`'s own query bodies, rather than calling back into
/// `Store`'s public methods (which would try to re-lock the same mutex on
/// the same thread and deadlock).
fn apply_block(conn: &duckdb::Connection, block: &BlockData) -> Result<u64, ocf_store::StoreError> {
    let mut rows = 0u64;
    let creation_price = query_daily_price(conn, block.timestamp.date_naive())?;

    for output in &block.new_outputs {
        insert_utxo(
            conn,
            &output.txid,
            output.vout,
            output.btc_value,
            block.height,
            block.timestamp,
            creation_price,
        )?;
        rows += 1;
    }

    let spent_price = creation_price;
    for input in &block.spent_inputs {
        let marked = mark_spent(conn, &input.txid, input.vout, block.height, block.timestamp, spent_price)?;
        if marked {
            rows += 1;
            continue;
        }

        // Tier-1 gap: the prevout was never observed. Synthesise it if the
        // input carries enough data, otherwise surface the block as a
        // whole (caller rolls back and skips it) — §4.2 Failure semantics.
        match (input.btc_value, input.creation_block) {
            (Some(btc_value), Some(creation_block)) => {
                let creation_date = query_block_date(conn, creation_block)?;
                let creation_price_usd = query_daily_price(conn, creation_date)?;
                insert_utxo(
                    conn,
                    &input.txid,
                    input.vout,
                    btc_value,
                    creation_block,
                    creation_date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
                    creation_price_usd,
                )?;
                mark_spent(conn, &input.txid, input.vout, block.height, block.timestamp, spent_price)?;
                rows += 2;
            }
            _ => {
                return Err(ocf_store::StoreError::Integrity {
                    row: format!("{}:{}", input.txid, input.vout),
                    reason: "unresolvable prevout: missing both local row and synthesis data".to_string(),
                });
            }
        }
    }

    Ok(rows)
}

/// Mirrors `Store::get_daily_price`, issued against an already-locked connection.
fn query_daily_price(conn: &duckdb::Connection, date: NaiveDate) -> Result<f64, ocf_store::StoreError> {
    let value: Option<f64> = conn
        .query_row("SELECT price_usd FROM daily_prices WHERE date = ?", duckdb::params![date], |row| row.get(0))
        .ok();
    value.ok_or_else(|| ocf_store::StoreError::MissingPrice(ocf_core::error::MissingPriceData { date }))
}

/// Mirrors `Store::get_block_date`, issued against an already-locked connection.
fn query_block_date(conn: &duckdb::Connection, height: u64) -> Result<NaiveDate, ocf_store::StoreError> {
    let ts: Option<chrono::DateTime<chrono::Utc>> = conn
        .query_row("SELECT timestamp FROM block_heights WHERE height = ?", duckdb::params![height], |row| row.get(0))
        .ok();
    ts.map(|t| t.date_naive())
        .ok_or(ocf_store::StoreError::MissingHeight(ocf_core::error::MissingHeightData { height }))
}

/// Mirrors `Store::insert_utxo`, issued against an already-locked connection.
#[allow(clippy::too_many_arguments)]
fn insert_utxo(
    conn: &duckdb::Connection,
    txid: &str,
    vout: u32,
    btc_value: f64,
    creation_block: u64,
    creation_timestamp: chrono::DateTime<chrono::Utc>,
    creation_price_usd: f64,
) -> Result<(), ocf_store::StoreError> {
    conn.execute(
        "INSERT INTO utxo (txid, vout, btc_value, creation_block, creation_timestamp, creation_price_usd, is_spent) \
         VALUES (?, ?, ?, ?, ?, ?, FALSE)",
        duckdb::params![txid, vout, btc_value, creation_block, creation_timestamp, creation_price_usd],
    )?;
    Ok(())
}

/// Mirrors `Store::mark_spent`, issued against an already-locked connection.
fn mark_spent(
    conn: &duckdb::Connection,
    txid: &str,
    vout: u32,
    spent_block: u64,
    spent_timestamp: chrono::DateTime<chrono::Utc>,
    spent_price_usd: f64,
) -> Result<bool, ocf_store::StoreError> {
    let affected = conn.execute(
        "UPDATE utxo SET is_spent = TRUE, spent_block = ?, spent_timestamp = ?, spent_price_usd = ? \
         WHERE txid = ? AND vout = ? AND is_spent = FALSE",
        duckdb::params![spent_block, spent_timestamp, spent_price_usd, txid, vout],
    )?;
    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewOutput, SpentInput};

    fn height_date(height: u64, date: NaiveDate) -> HeightDate {
        HeightDate {
            height,
            timestamp: date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
        }
    }

    fn price(date: NaiveDate, price_usd: f64) -> PricePoint {
        PricePoint { date, price_usd }
    }

    fn block(height: u64, date: NaiveDate) -> BlockData {
        BlockData {
            height,
            timestamp: date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
            new_outputs: Vec::new(),
            spent_inputs: Vec::new(),
        }
    }

    #[test]
    fn tier1_joins_creation_block_to_price_via_date() {
        let store = Store::open_in_memory().unwrap();
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let heights = vec![height_date(100, d)];
        let prices = vec![price(d, 10_000.0)];
        let entries = vec![ChainstateEntry {
            txid: "a".to_string(),
            vout: 0,
            btc_value: 1.5,
            creation_block: 100,
        }];

        let summary = tier1_snapshot(&store, &heights, &prices, &entries).unwrap();
        assert_eq!(summary.utxos_written, 1);
        assert_eq!(store.get_unspent_supply().unwrap(), 1.5);
    }

    #[test]
    fn tier2_replay_preserves_creation_fields_on_spend() {
        let store = Store::open_in_memory().unwrap();
        let d0 = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        store.upsert_daily_price(DailyPrice { date: d0, price_usd: 10_000.0 }).unwrap();
        store.upsert_daily_price(DailyPrice { date: d1, price_usd: 20_000.0 }).unwrap();

        let mut block0 = block(100, d0);
        block0.new_outputs.push(NewOutput {
            txid: "a".to_string(),
            vout: 0,
            btc_value: 1.0,
        });

        let mut block1 = block(101, d1);
        block1.spent_inputs.push(SpentInput {
            txid: "a".to_string(),
            vout: 0,
            btc_value: None,
            creation_block: None,
        });

        let summary = tier2_replay(&store, vec![block0, block1], 101, 1, |_p| {}).unwrap();
        assert_eq!(summary.blocks_applied, 2);
        assert!(summary.skipped_blocks.is_empty());
        assert_eq!(store.get_unspent_supply().unwrap(), 0.0);
    }

    #[test]
    fn tier2_skips_block_with_unresolvable_prevout() {
        let store = Store::open_in_memory().unwrap();
        let d0 = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        store.upsert_daily_price(DailyPrice { date: d0, price_usd: 10_000.0 }).unwrap();

        let mut blk = block(100, d0);
        blk.spent_inputs.push(SpentInput {
            txid: "ghost".to_string(),
            vout: 0,
            btc_value: None,
            creation_block: None,
        });

        let summary = tier2_replay(&store, vec![blk], 100, 1, |_p| {}).unwrap();
        assert_eq!(summary.blocks_applied, 0);
        assert_eq!(summary.skipped_blocks, vec![100]);
    }

    #[test]
    fn tier2_synthesises_row_when_input_carries_enough_data() {
        let store = Store::open_in_memory().unwrap();
        let d0 = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        store.upsert_block_height(ocf_store::BlockHeightRow { height: 50, timestamp: d0.and_hms_opt(0, 0, 0).unwrap().and_utc() }).unwrap();
        store.upsert_daily_price(DailyPrice { date: d0, price_usd: 10_000.0 }).unwrap();
        store.upsert_daily_price(DailyPrice { date: d1, price_usd: 20_000.0 }).unwrap();

        let mut blk = block(100, d1);
        blk.spent_inputs.push(SpentInput {
            txid: "ghost".to_string(),
            vout: 0,
            btc_value: Some(2.0),
            creation_block: Some(50),
        });

        let summary = tier2_replay(&store, vec![blk], 100, 1, |_p| {}).unwrap();
        assert_eq!(summary.blocks_applied, 1);
        assert!(summary.skipped_blocks.is_empty());
        assert_eq!(store.get_unspent_supply().unwrap(), 0.0);
    }
}
