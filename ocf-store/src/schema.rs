//! DDL for the `utxo`, `daily_prices`, and `block_heights` tables.
//!
//! Indexing policy (§4.1): B-tree on `(is_spent)` and `(creation_block)`,
//! uniqueness on `(txid, vout)`. DuckDB auto-indexes primary keys; the
//! secondary indexes are created explicitly since `is_spent`/`creation_block`
//! range scans back every metric in `ocf-metrics`.

use duckdb::Connection;

use crate::error::StoreError;

pub(crate) const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS utxo (
    txid TEXT NOT NULL,
    vout UINTEGER NOT NULL,
    btc_value DOUBLE NOT NULL,
    creation_block UBIGINT NOT NULL,
    creation_timestamp TIMESTAMP NOT NULL,
    creation_price_usd DOUBLE NOT NULL,
    is_spent BOOLEAN NOT NULL DEFAULT FALSE,
    spent_block UBIGINT,
    spent_timestamp TIMESTAMP,
    spent_price_usd DOUBLE,
    PRIMARY KEY (txid, vout)
);

CREATE TABLE IF NOT EXISTS daily_prices (
    date DATE PRIMARY KEY,
    price_usd DOUBLE NOT NULL
);

CREATE TABLE IF NOT EXISTS block_heights (
    height UBIGINT PRIMARY KEY,
    timestamp TIMESTAMP NOT NULL
);
"#;

pub(crate) const CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_utxo_is_spent ON utxo (is_spent);
CREATE INDEX IF NOT EXISTS idx_utxo_creation_block ON utxo (creation_block);
"#;

/// Creates the schema if absent. Idempotent — safe to call on every
/// process start-up (§4.2's bootstrap pipeline is itself idempotent).
pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_TABLES)?;
    conn.execute_batch(CREATE_INDEXES)?;
    Ok(())
}
