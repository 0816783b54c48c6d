//! `ocf bootstrap --from-snapshot <path>` (§6).

use std::path::Path;

use ocf_bootstrap::model::{ChainstateEntry, HeightDate, PricePoint};
use ocf_bootstrap::{tier1_snapshot, Tier1Summary};
use ocf_store::Store;
use serde::Deserialize;

use crate::error::CliError;

/// On-disk shape of a Tier-1 snapshot file: the height→date and daily-price
/// series that seed the store, plus the chainstate rows themselves. Live
/// Tier-2 replay needs a running full-node / block-indexer feed, which is
/// outside this interface's scope (§1 excludes that protocol) — only the
/// snapshot path is wired into the CLI.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub heights: Vec<HeightDate>,
    pub prices: Vec<PricePoint>,
    pub utxos: Vec<ChainstateEntry>,
}

pub fn run(store_path: &str, from_snapshot: Option<&Path>) -> Result<Tier1Summary, CliError> {
    let from_snapshot = from_snapshot.ok_or_else(|| CliError::Usage("bootstrap requires --from-snapshot <path>".to_string()))?;

    let raw = std::fs::read_to_string(from_snapshot)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;

    let store = Store::open(store_path)?;
    let summary = tier1_snapshot(&store, &snapshot.heights, &snapshot.prices, &snapshot.utxos)?;
    Ok(summary)
}

/// Maps a bootstrap failure to one of §6's exit-code families.
pub fn exit_code(err: &ocf_bootstrap::BootstrapError) -> i32 {
    use ocf_bootstrap::BootstrapError;
    use ocf_store::StoreError;

    match err {
        BootstrapError::Store(StoreError::MissingPrice(_)) => 10,
        BootstrapError::Store(StoreError::MissingHeight(_)) => 11,
        BootstrapError::Store(StoreError::Integrity { .. }) => 12,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_from_snapshot_is_a_usage_error() {
        let err = run("ignored.duckdb", None).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn loads_a_snapshot_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        let store_path = dir.path().join("store.duckdb");

        std::fs::write(
            &snapshot_path,
            r#"{
                "heights": [{"height": 100, "timestamp": "2021-01-01T00:00:00Z"}],
                "prices": [{"date": "2021-01-01", "price_usd": 10000.0}],
                "utxos": [{"txid": "a", "vout": 0, "btc_value": 1.5, "creation_block": 100}]
            }"#,
        )
        .unwrap();

        let summary = run(store_path.to_str().unwrap(), Some(snapshot_path.as_path())).unwrap();
        assert_eq!(summary.utxos_written, 1);
    }
}
