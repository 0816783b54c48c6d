//! Reference-oracle wrapper: a `PriceModel` backed by a third-party
//! prediction feed rather than a fit against local history.
//!
//! The oracle itself is a genuinely external collaborator, modelled as a
//! trait the same way C3 models its price and block-metadata feeds
//! ([`ocf_store::price_index::PriceSource`]) — production wiring supplies a
//! concrete implementation, tests supply an in-memory fixture.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ocf_core::SignalVote;

use crate::error::ModelError;
use crate::model::{HistoryPoint, Prediction};
use crate::traits::PriceModel;

/// One opaque reading from the external oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleReading {
    pub predicted_price: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// The oracle's own confidence in this reading, in `[0, 1]`.
    pub confidence: f64,
}

pub trait ReferenceOracle: Send + Sync {
    fn query(&self, target_date: NaiveDate) -> Result<OracleReading, String>;
}

pub struct ReferenceOracleModel {
    oracle: Box<dyn ReferenceOracle>,
    /// Below this confidence the reading is still reported through
    /// `predict` (the `PriceModel` contract always returns a price), but
    /// its vote for the fusion engine is damped rather than passed through
    /// at face value. Sourced from
    /// [`ocf_core::config::Config::oracle_confidence_threshold`].
    confidence_threshold: f64,
}

impl ReferenceOracleModel {
    pub fn new(oracle: Box<dyn ReferenceOracle>, confidence_threshold: f64) -> Self {
        Self { oracle, confidence_threshold }
    }

    /// Converts the oracle's latest reading into a fusion vote, damping it
    /// below `confidence_threshold` rather than dropping it to `None` the
    /// way a stale derivatives feed would (Open Question: the oracle
    /// degrades gracefully instead of going fully unavailable).
    pub fn vote_for_fusion(&self, target_date: NaiveDate, current_price: f64, weight: f64) -> SignalVote {
        let reading = match self.oracle.query(target_date) {
            Ok(r) => r,
            Err(_) => return SignalVote::unavailable("reference_oracle", weight),
        };

        let spread = (reading.predicted_price - current_price) / current_price.max(f64::EPSILON);
        let raw_vote = spread.clamp(-1.0, 1.0);

        let effective_vote = if reading.confidence < self.confidence_threshold {
            raw_vote * (reading.confidence / self.confidence_threshold)
        } else {
            raw_vote
        };

        SignalVote::try_new("reference_oracle", Some(effective_vote), reading.confidence, weight)
            .unwrap_or_else(|_| SignalVote::unavailable("reference_oracle", weight))
    }
}

impl PriceModel for ReferenceOracleModel {
    fn name(&self) -> &'static str {
        "reference_oracle"
    }

    fn description(&self) -> &'static str {
        "Wraps an external price-prediction oracle behind the PriceModel contract"
    }

    fn required_data(&self) -> &'static [&'static str] {
        &[]
    }

    fn fit(&mut self, _history: &[HistoryPoint]) -> Result<(), ModelError> {
        Ok(())
    }

    fn predict(&self, target_date: NaiveDate) -> Result<Prediction, ModelError> {
        let reading = self
            .oracle
            .query(target_date)
            .map_err(ModelError::OracleUnavailable)?;

        let mut metadata = BTreeMap::new();
        metadata.insert("oracle_confidence".to_string(), reading.confidence.to_string());

        Ok(Prediction {
            model_name: self.name().to_string(),
            date: target_date,
            predicted_price: reading.predicted_price,
            ci_lower: reading.ci_lower,
            ci_upper: reading.ci_upper,
            confidence_level: reading.confidence,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedOracle(Result<OracleReading, String>);

    impl ReferenceOracle for FixedOracle {
        fn query(&self, _target_date: NaiveDate) -> Result<OracleReading, String> {
            self.0.clone()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    /// Matches `ocf_core::config::Config::default().oracle_confidence_threshold`.
    const TEST_THRESHOLD: f64 = 0.4;

    #[test]
    fn predict_surfaces_oracle_reading_even_at_low_confidence() {
        let oracle = FixedOracle(Ok(OracleReading { predicted_price: 70_000.0, ci_lower: 60_000.0, ci_upper: 80_000.0, confidence: 0.2 }));
        let model = ReferenceOracleModel::new(Box::new(oracle), TEST_THRESHOLD);
        let prediction = model.predict(date()).unwrap();
        assert_eq!(prediction.predicted_price, 70_000.0);
        assert_eq!(prediction.confidence_level, 0.2);
    }

    #[test]
    fn predict_propagates_oracle_error() {
        let oracle = FixedOracle(Err("timeout".to_string()));
        let model = ReferenceOracleModel::new(Box::new(oracle), TEST_THRESHOLD);
        assert!(matches!(model.predict(date()), Err(ModelError::OracleUnavailable(_))));
    }

    #[test]
    fn vote_is_damped_below_confidence_threshold() {
        let oracle = FixedOracle(Ok(OracleReading { predicted_price: 66_000.0, ci_lower: 60_000.0, ci_upper: 72_000.0, confidence: 0.25 }));
        let model = ReferenceOracleModel::new(Box::new(oracle), TEST_THRESHOLD);
        let vote = model.vote_for_fusion(date(), 60_000.0, 0.1);

        let raw_spread: f64 = (66_000.0 - 60_000.0) / 60_000.0;
        let expected = raw_spread * (0.25 / TEST_THRESHOLD);
        assert!((vote.vote.unwrap() - expected).abs() < 1e-9);
        assert!(vote.vote.unwrap() < raw_spread);
    }

    #[test]
    fn vote_passes_through_at_full_confidence() {
        let oracle = FixedOracle(Ok(OracleReading { predicted_price: 66_000.0, ci_lower: 60_000.0, ci_upper: 72_000.0, confidence: 0.9 }));
        let model = ReferenceOracleModel::new(Box::new(oracle), TEST_THRESHOLD);
        let vote = model.vote_for_fusion(date(), 60_000.0, 0.1);

        let raw_spread: f64 = (66_000.0 - 60_000.0) / 60_000.0;
        assert!((vote.vote.unwrap() - raw_spread).abs() < 1e-9);
    }

    #[test]
    fn vote_is_unavailable_when_oracle_errors() {
        let oracle = FixedOracle(Err("down".to_string()));
        let model = ReferenceOracleModel::new(Box::new(oracle), TEST_THRESHOLD);
        let vote = model.vote_for_fusion(date(), 60_000.0, 0.1);
        assert!(!vote.is_available());
    }
}
