//! UTXO Realised Price Distribution (§4.4.1).

use chrono::{DateTime, Utc};
use ocf_core::check_range;
use ocf_store::PriceBucket;

use crate::error::MetricError;

/// One bucket of the distribution with its share of total unspent supply.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UrpdBucket {
    pub price_low: f64,
    pub price_high: f64,
    pub btc: f64,
    pub count: u64,
    pub pct_of_total: f64,
}

/// Frozen result of a URPD computation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UrpdResult {
    pub buckets: Vec<UrpdBucket>,
    pub supply_above_price_pct: f64,
    pub supply_below_price_pct: f64,
    pub dominant_bucket_price_low: f64,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl UrpdResult {
    /// Builds a result from buckets already aggregated by the store
    /// (`buckets` ordered by price descending, as returned by
    /// `Store::group_unspent_by_price_bucket`).
    pub fn calculate(
        buckets: &[PriceBucket],
        current_price_usd: f64,
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Result<Self, MetricError> {
        check_range("current_price_usd", current_price_usd, f64::EPSILON, f64::MAX)?;

        let total_btc: f64 = buckets.iter().map(|b| b.btc).sum();
        let mut out = Vec::with_capacity(buckets.len());
        let mut above = 0.0;
        let mut below = 0.0;
        let mut dominant: Option<&PriceBucket> = None;

        for b in buckets {
            let pct = if total_btc > 0.0 { b.btc / total_btc * 100.0 } else { 0.0 };
            out.push(UrpdBucket {
                price_low: b.price_low,
                price_high: b.price_high,
                btc: b.btc,
                count: b.count,
                pct_of_total: pct,
            });

            if b.price_low > current_price_usd {
                above += b.btc;
            } else {
                below += b.btc;
            }

            dominant = match dominant {
                None => Some(b),
                Some(d) if b.btc > d.btc || (b.btc == d.btc && b.price_low < d.price_low) => Some(b),
                some => some,
            };
        }

        let pct_sum: f64 = out.iter().map(|b| b.pct_of_total).sum();
        debug_assert!(total_btc <= 0.0 || (pct_sum - 100.0).abs() < 0.01, "bucket percentages must sum to ~100%");

        Ok(Self {
            supply_above_price_pct: if total_btc > 0.0 { above / total_btc * 100.0 } else { 0.0 },
            supply_below_price_pct: if total_btc > 0.0 { below / total_btc * 100.0 } else { 0.0 },
            dominant_bucket_price_low: dominant.map(|d| d.price_low).unwrap_or(0.0),
            buckets: out,
            block_height,
            computed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(low: f64, btc: f64, count: u64) -> PriceBucket {
        PriceBucket { price_low: low, price_high: low + 5_000.0, btc, count }
    }

    #[test]
    fn scenario_s1_bucket_percentages_and_dominant_bucket() {
        let buckets = vec![bucket(50_000.0, 0.5, 1), bucket(10_000.0, 3.0, 2)];
        let result = UrpdResult::calculate(&buckets, 30_000.0, 700_000, Utc::now()).unwrap();

        assert_eq!(result.dominant_bucket_price_low, 10_000.0);
        assert!((result.supply_above_price_pct - (0.5 / 3.5 * 100.0)).abs() < 1e-6);
        assert!((result.supply_below_price_pct - (3.0 / 3.5 * 100.0)).abs() < 1e-6);

        let pct_sum: f64 = result.buckets.iter().map(|b| b.pct_of_total).sum();
        assert!((pct_sum - 100.0).abs() < 0.01);
    }

    #[test]
    fn dominant_bucket_ties_broken_by_lowest_price() {
        let buckets = vec![bucket(20_000.0, 1.0, 1), bucket(10_000.0, 1.0, 1)];
        let result = UrpdResult::calculate(&buckets, 15_000.0, 1, Utc::now()).unwrap();
        assert_eq!(result.dominant_bucket_price_low, 10_000.0);
    }

    #[test]
    fn rejects_non_positive_current_price() {
        assert!(UrpdResult::calculate(&[], 0.0, 1, Utc::now()).is_err());
    }
}
