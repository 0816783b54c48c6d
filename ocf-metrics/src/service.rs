//! Glues the pure metric calculators to an [`ocf_store::Store`]: pulls
//! aggregated inputs through the store's read contract and hands them to
//! each value object's `calculate`.

use chrono::{DateTime, Utc};
use ocf_core::config::Config;
use ocf_store::{CohortFilter, Store};

use crate::cdd_vdd::CddVddResult;
use crate::error::MetricError;
use crate::mvrv::{MvrvResult, MvrvZResult, NuplResult};
use crate::pl_ratio::PlRatioResult;
use crate::reserve_risk::ReserveRiskResult;
use crate::sell_side_risk::SellSideRiskResult;
use crate::supply_pl::{sth_lth_cutoff_block, SupplyProfitLossResult};
use crate::urpd::UrpdResult;

/// Glues the pure calculators to a store *and* a config: `blocks_per_day`
/// and `sth_lth_threshold_days` flow from here into every calculator that
/// needs them, rather than each one embedding its own constant (§9).
pub struct MetricService<'a> {
    store: &'a Store,
    config: &'a Config,
}

impl<'a> MetricService<'a> {
    pub fn new(store: &'a Store, config: &'a Config) -> Self {
        Self { store, config }
    }

    pub fn urpd(&self, bucket_size_usd: f64, current_price_usd: f64, block_height: u64) -> Result<UrpdResult, MetricError> {
        let buckets = self.store.group_unspent_by_price_bucket(bucket_size_usd)?;
        UrpdResult::calculate(&buckets, current_price_usd, block_height, Utc::now())
    }

    fn sth_lth_cutoff(&self, block_height: u64) -> u64 {
        sth_lth_cutoff_block(block_height, self.config.sth_lth_threshold_days, self.config.blocks_per_day)
    }

    pub fn supply_profit_loss(&self, current_price_usd: f64, block_height: u64) -> Result<SupplyProfitLossResult, MetricError> {
        let cutoff = self.sth_lth_cutoff(block_height);
        let overall = self.store.get_profit_loss_supply(current_price_usd, None)?;
        let sth = self.store.get_profit_loss_supply(current_price_usd, Some(CohortFilter::CreationBlockGreaterThan(cutoff)))?;
        let lth = self.store.get_profit_loss_supply(current_price_usd, Some(CohortFilter::CreationBlockAtMost(cutoff)))?;
        SupplyProfitLossResult::calculate(overall, sth, lth, block_height, Utc::now())
    }

    pub fn mvrv(&self, current_price_usd: f64, block_height: u64) -> Result<MvrvResult, MetricError> {
        let cutoff = self.sth_lth_cutoff(block_height);
        let unspent_supply = self.store.get_unspent_supply()?;
        let realised_cap = self.store.get_realized_cap(None)?;
        let sth_realised_cap = self.store.get_realized_cap(Some(CohortFilter::CreationBlockGreaterThan(cutoff)))?;
        let lth_realised_cap = self.store.get_realized_cap(Some(CohortFilter::CreationBlockAtMost(cutoff)))?;
        MvrvResult::calculate(current_price_usd, unspent_supply, realised_cap, sth_realised_cap, lth_realised_cap, block_height, Utc::now())
    }

    /// `market_cap_history` is the trailing daily market-cap series the
    /// caller has assembled (e.g. `daily_price × current unspent_supply`,
    /// an approximation noted in the design ledger since historical supply
    /// snapshots are not retained).
    pub fn mvrv_z(&self, market_cap: f64, realised_cap: f64, market_cap_history: &[f64], block_height: u64) -> MvrvZResult {
        MvrvZResult::calculate(market_cap, realised_cap, market_cap_history, block_height, Utc::now())
    }

    pub fn nupl(&self, market_cap: f64, realised_cap: f64, block_height: u64) -> NuplResult {
        NuplResult::calculate(market_cap, realised_cap, block_height, Utc::now())
    }

    pub fn reserve_risk(&self, current_price_usd: f64, block_height: u64) -> Result<ReserveRiskResult, MetricError> {
        let unspent_supply = self.store.get_unspent_supply()?;
        let cumulative_coinblocks_destroyed = self.store.get_cumulative_coinblocks_destroyed()?;
        Ok(ReserveRiskResult::calculate(
            current_price_usd,
            unspent_supply,
            cumulative_coinblocks_destroyed,
            self.config.blocks_per_day as f64,
            block_height,
            Utc::now(),
        ))
    }

    pub fn sell_side_risk(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        window_days: u32,
        market_cap: f64,
        block_height: u64,
    ) -> Result<SellSideRiskResult, MetricError> {
        let rows = self.store.get_spent_in_window(window_start, window_end)?;
        Ok(SellSideRiskResult::calculate(&rows, market_cap, window_days, block_height, Utc::now()))
    }

    /// `vdd_history` is the caller-assembled trailing daily-VDD series used
    /// for the 365-day moving average (see `mvrv_z`'s note on history
    /// inputs).
    pub fn cdd_vdd(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        window_days: u32,
        vdd_history: &[f64],
        block_height: u64,
    ) -> Result<CddVddResult, MetricError> {
        let rows = self.store.get_spent_in_window(window_start, window_end)?;
        Ok(CddVddResult::calculate(&rows, vdd_history, self.config.blocks_per_day as f64, window_days, block_height, Utc::now()))
    }

    pub fn pl_ratio(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        block_height: u64,
    ) -> Result<PlRatioResult, MetricError> {
        let rows = self.store.get_spent_in_window(window_start, window_end)?;
        let mut profit = rust_decimal::Decimal::ZERO;
        let mut loss = rust_decimal::Decimal::ZERO;
        for row in &rows {
            let pnl = (row.spent_price_usd - row.creation_price_usd) * row.btc_value;
            let pnl = rust_decimal::Decimal::from_f64_retain(pnl).unwrap_or(rust_decimal::Decimal::ZERO);
            if pnl > rust_decimal::Decimal::ZERO {
                profit += pnl;
            } else {
                loss -= pnl;
            }
        }
        Ok(PlRatioResult::calculate(profit, loss, block_height, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ocf_store::Utxo;

    fn sample_utxo(txid: &str, btc: f64, block: u64, price: f64) -> Utxo {
        Utxo {
            txid: txid.to_string(),
            vout: 0,
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
    fn mvrv_service_reconciles_cohorts() {
        let store = Store::open_in_memory().unwrap();
        store
            .bulk_load_utxos(&[
                sample_utxo("a", 1.0, 10, 10_000.0),
                sample_utxo("b", 1.0, 900_000, 40_000.0),
            ])
            .unwrap();

        let config = Config::default();
        let service = MetricService::new(&store, &config);
        let result = service.mvrv(50_000.0, 900_100).unwrap();
        assert!(result.mvrv > 0.0);
    }

    #[test]
    fn urpd_service_matches_store_buckets() {
        let store = Store::open_in_memory().unwrap();
        store.bulk_load_utxos(&[sample_utxo("a", 1.0, 10, 10_000.0)]).unwrap();
        let config = Config::default();
        let service = MetricService::new(&store, &config);
        let result = service.urpd(5_000.0, 20_000.0, 11).unwrap();
        assert_eq!(result.buckets.len(), 1);
    }
}
