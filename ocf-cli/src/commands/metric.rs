//! `ocf metric <name>` (§6).

use chrono::{Duration, Utc};
use ocf_core::config::Config;
use ocf_metrics::{MetricError, MetricService};
use ocf_store::Store;
use serde_json::Value;

use crate::error::CliError;

pub fn run(config: &Config, name: &str, bucket_size: f64, window_days: u32, current_price: Option<f64>) -> Result<Value, CliError> {
    let store = Store::open(&config.store_path)?;
    let service = MetricService::new(&store, config);
    let block_height = store.latest_height()?;
    let current_price = current_price.ok_or_else(|| CliError::Usage("metric requires --current-price".to_string()))?;

    let value = match name {
        "urpd" => serde_json::to_value(service.urpd(bucket_size, current_price, block_height)?)?,
        "supply_profit_loss" => serde_json::to_value(service.supply_profit_loss(current_price, block_height)?)?,
        "mvrv" => serde_json::to_value(service.mvrv(current_price, block_height)?)?,
        "mvrv_z" => {
            let unspent_supply = store.get_unspent_supply()?;
            let realised_cap = store.get_realized_cap(None)?;
            let market_cap = current_price * unspent_supply;
            let history = market_cap_history(&store, unspent_supply)?;
            serde_json::to_value(service.mvrv_z(market_cap, realised_cap, &history, block_height))?
        }
        "nupl" => {
            let unspent_supply = store.get_unspent_supply()?;
            let realised_cap = store.get_realized_cap(None)?;
            let market_cap = current_price * unspent_supply;
            serde_json::to_value(service.nupl(market_cap, realised_cap, block_height))?
        }
        "reserve_risk" => serde_json::to_value(service.reserve_risk(current_price, block_height)?)?,
        "sell_side_risk" => {
            let (start, end) = trailing_window(window_days);
            let market_cap = current_price * store.get_unspent_supply()?;
            serde_json::to_value(service.sell_side_risk(start, end, window_days, market_cap, block_height)?)?
        }
        "cdd_vdd" => {
            let (start, end) = trailing_window(window_days);
            // No persisted daily-VDD series (§4.4.6 note): this always runs
            // degraded (vdd_multiple/zone = None) until a time-series store
            // exists to back the 365-day moving average.
            serde_json::to_value(service.cdd_vdd(start, end, window_days, &[], block_height)?)?
        }
        "pl_ratio" => {
            let (start, end) = trailing_window(window_days);
            serde_json::to_value(service.pl_ratio(start, end, block_height)?)?
        }
        other => return Err(CliError::Usage(format!("unknown metric {other:?}"))),
    };

    Ok(value)
}

fn trailing_window(window_days: u32) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let end = Utc::now();
    let start = end - Duration::days(window_days as i64);
    (start, end)
}

/// Approximates a trailing daily market-cap series as `daily_price ×
/// current unspent supply` — the store keeps only the current UTXO set, not
/// historical supply snapshots, so this is a stand-in documented in the
/// design ledger rather than a true historical series.
fn market_cap_history(store: &Store, unspent_supply: f64) -> Result<Vec<f64>, CliError> {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(400);
    let prices = store.daily_prices_between(start, end)?;
    Ok(prices.into_iter().map(|p| p.price_usd * unspent_supply).collect())
}

/// Maps a metric failure to one of §6's exit-code families.
pub fn exit_code(err: &MetricError) -> i32 {
    match err {
        MetricError::NoUnspentSupply { .. } => 20,
        _ => 21,
    }
}
