//! Combines several [`PriceModel`]s into one prediction (§4.7 "Ensemble").

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::model::{HistoryPoint, Prediction};
use crate::traits::PriceModel;

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMethod {
    WeightedAverage,
    Median,
    Min,
    Max,
}

fn aggregate(method: AggregationMethod, values: &[f64], weights: &[f64]) -> f64 {
    match method {
        AggregationMethod::WeightedAverage => values.iter().zip(weights).map(|(v, w)| v * w).sum(),
        AggregationMethod::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).expect("no NaN in predicted prices"));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
        AggregationMethod::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
        AggregationMethod::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}

pub struct Ensemble {
    members: Vec<(Box<dyn PriceModel>, f64)>,
}

impl Ensemble {
    /// Builds an ensemble from `(model, weight)` pairs. Weights must sum to
    /// `1.0 ± 1e-6`; the tolerance absorbs floating-point accumulation, not
    /// caller sloppiness.
    pub fn new(members: Vec<(Box<dyn PriceModel>, f64)>) -> Result<Self, ModelError> {
        if members.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }
        let total: f64 = members.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ModelError::WeightsDoNotSumToOne { actual: total });
        }
        Ok(Self { members })
    }

    pub fn fit(&mut self, history: &[HistoryPoint]) -> Result<(), ModelError> {
        for (model, _) in &mut self.members {
            model.fit(history)?;
        }
        Ok(())
    }

    pub fn predict(&self, target_date: NaiveDate, method: AggregationMethod) -> Result<Prediction, ModelError> {
        let mut predictions = Vec::with_capacity(self.members.len());
        let mut weights = Vec::with_capacity(self.members.len());
        for (model, weight) in &self.members {
            predictions.push(model.predict(target_date)?);
            weights.push(*weight);
        }

        let predicted_prices: Vec<f64> = predictions.iter().map(|p| p.predicted_price).collect();
        let ci_lowers: Vec<f64> = predictions.iter().map(|p| p.ci_lower).collect();
        let ci_uppers: Vec<f64> = predictions.iter().map(|p| p.ci_upper).collect();

        let mut metadata = BTreeMap::new();
        metadata.insert(
            "members".to_string(),
            self.members.iter().map(|(m, _)| m.name()).collect::<Vec<_>>().join(","),
        );

        Ok(Prediction {
            model_name: "ensemble".to_string(),
            date: target_date,
            predicted_price: aggregate(method, &predicted_prices, &weights),
            ci_lower: aggregate(method, &ci_lowers, &weights),
            ci_upper: aggregate(method, &ci_uppers, &weights),
            confidence_level: predictions.iter().map(|p| p.confidence_level).sum::<f64>() / predictions.len() as f64,
            metadata,
        })
    }
}
