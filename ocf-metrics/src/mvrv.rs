//! Realised Cap & the MVRV family: MVRV, MVRV-Z, and the supplemented NUPL
//! (§4.4.3).

use chrono::{DateTime, Utc};

use crate::common::stdev;
use crate::error::MetricError;

const MVRV_Z_MIN_HISTORY_DAYS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MvrvZone {
    ExtremeSell,
    Caution,
    Normal,
    Accumulation,
}

/// `market_cap`, `realised_cap`, and their ratio, plus the STH/LTH cohort
/// decomposition of realised cap.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MvrvResult {
    pub market_cap: f64,
    pub realised_cap: f64,
    pub mvrv: f64,
    pub sth_realised_cap: f64,
    pub lth_realised_cap: f64,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl MvrvResult {
    pub fn calculate(
        current_price_usd: f64,
        unspent_supply: f64,
        realised_cap: f64,
        sth_realised_cap: f64,
        lth_realised_cap: f64,
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Result<Self, MetricError> {
        let market_cap = current_price_usd * unspent_supply;
        let mvrv = if realised_cap > 0.0 { market_cap / realised_cap } else { 0.0 };

        if realised_cap > 0.0 {
            let reconciliation = ((sth_realised_cap + lth_realised_cap) - realised_cap).abs() / realised_cap;
            ocf_core::check_range("sth_lth_realised_cap_reconciliation", reconciliation, 0.0, 0.01)?;
        }

        Ok(Self {
            market_cap,
            realised_cap,
            mvrv,
            sth_realised_cap,
            lth_realised_cap,
            block_height,
            computed_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MvrvZResult {
    pub mvrv_z: f64,
    pub zone: MvrvZone,
    pub confidence: f64,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl MvrvZResult {
    /// `market_cap_history` should cover the trailing window available;
    /// fewer than 30 days or a zero stdev degrades to `0.0`/`Normal` at
    /// zero confidence rather than erroring (§4.4.3 Open Question).
    pub fn calculate(
        market_cap: f64,
        realised_cap: f64,
        market_cap_history: &[f64],
        block_height: u64,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let sigma = stdev(market_cap_history);
        let (mvrv_z, confidence) = if market_cap_history.len() < MVRV_Z_MIN_HISTORY_DAYS || sigma == 0.0 {
            (0.0, 0.0)
        } else {
            ((market_cap - realised_cap) / sigma, 1.0)
        };

        let zone = if confidence == 0.0 {
            MvrvZone::Normal
        } else if mvrv_z > 7.0 {
            MvrvZone::ExtremeSell
        } else if mvrv_z > 3.0 {
            MvrvZone::Caution
        } else if mvrv_z > -0.5 {
            MvrvZone::Normal
        } else {
            MvrvZone::Accumulation
        };

        let confidence = if confidence == 0.0 {
            0.0
        } else {
            match zone {
                MvrvZone::ExtremeSell => 0.95,
                MvrvZone::Caution => 0.75,
                MvrvZone::Normal => 0.50,
                MvrvZone::Accumulation => 0.85,
            }
        };

        Self {
            mvrv_z,
            zone,
            confidence,
            block_height,
            computed_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NuplZone {
    EuphoriaGreed,
    Belief,
    Optimism,
    Hope,
    Capitulation,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NuplResult {
    pub nupl: f64,
    pub zone: NuplZone,
    pub confidence: f64,
    pub block_height: u64,
    pub computed_at: DateTime<Utc>,
}

impl NuplResult {
    pub fn calculate(market_cap: f64, realised_cap: f64, block_height: u64, computed_at: DateTime<Utc>) -> Self {
        let nupl = if market_cap > 0.0 { (market_cap - realised_cap) / market_cap } else { 0.0 };
        let zone = if nupl > 0.75 {
            NuplZone::EuphoriaGreed
        } else if nupl > 0.5 {
            NuplZone::Belief
        } else if nupl > 0.25 {
            NuplZone::Optimism
        } else if nupl >= 0.0 {
            NuplZone::Hope
        } else {
            NuplZone::Capitulation
        };

        Self {
            nupl,
            zone,
            confidence: 0.6,
            block_height,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mvrv_zero_when_realised_cap_non_positive() {
        let r = MvrvResult::calculate(10_000.0, 5.0, 0.0, 0.0, 0.0, 1, Utc::now()).unwrap();
        assert_eq!(r.mvrv, 0.0);
    }

    #[test]
    fn mvrv_rejects_mismatched_cohort_decomposition() {
        let r = MvrvResult::calculate(10_000.0, 5.0, 10_000.0, 1_000.0, 1_000.0, 1, Utc::now());
        assert!(r.is_err());
    }

    #[test]
    fn mvrv_z_degrades_to_normal_with_insufficient_history() {
        let r = MvrvZResult::calculate(100.0, 80.0, &[1.0, 2.0], 1, Utc::now());
        assert_eq!(r.mvrv_z, 0.0);
        assert_eq!(r.zone, MvrvZone::Normal);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn mvrv_z_extreme_sell_zone() {
        let history: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.01).collect();
        let r = MvrvZResult::calculate(1_000.0, 10.0, &history, 1, Utc::now());
        assert_eq!(r.zone, MvrvZone::ExtremeSell);
        assert_eq!(r.confidence, 0.95);
    }

    #[test]
    fn nupl_zones_match_bands() {
        assert_eq!(NuplResult::calculate(100.0, 20.0, 1, Utc::now()).zone, NuplZone::EuphoriaGreed);
        assert_eq!(NuplResult::calculate(100.0, 90.0, 1, Utc::now()).zone, NuplZone::Hope);
        assert_eq!(NuplResult::calculate(100.0, 150.0, 1, Utc::now()).zone, NuplZone::Capitulation);
    }
}
