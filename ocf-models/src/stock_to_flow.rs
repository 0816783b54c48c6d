//! Stock-to-Flow price model: regresses price against the Stock-to-Flow
//! ratio derived from the deterministic halving schedule in [`crate::halving`].

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::halving;
use crate::model::{HistoryPoint, Prediction};
use crate::traits::PriceModel;

#[derive(Debug, Clone, Copy)]
struct HeightMap {
    anchor_date: NaiveDate,
    anchor_height: u64,
    blocks_per_day: f64,
}

impl HeightMap {
    fn height_at(&self, date: NaiveDate) -> u64 {
        let delta_days = (date - self.anchor_date).num_days() as f64;
        let estimated = self.anchor_height as f64 + delta_days * self.blocks_per_day;
        estimated.max(0.0).round() as u64
    }
}

#[derive(Debug, Clone, Copy)]
struct FitParams {
    heights: HeightMap,
    intercept: f64,
    slope: f64,
    residual_std_log10: f64,
}

pub struct StockToFlowModel {
    params: Option<FitParams>,
}

impl StockToFlowModel {
    pub fn new() -> Self {
        Self { params: None }
    }
}

impl Default for StockToFlowModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceModel for StockToFlowModel {
    fn name(&self) -> &'static str {
        "stock_to_flow"
    }

    fn description(&self) -> &'static str {
        "Log-log regression of price against Stock-to-Flow, derived from the halving schedule"
    }

    fn required_data(&self) -> &'static [&'static str] {
        &["date", "height", "price"]
    }

    fn fit(&mut self, history: &[HistoryPoint]) -> Result<(), ModelError> {
        if history.len() < 2 {
            return Err(ModelError::EmptyHistory(self.name()));
        }

        let first = history.first().expect("checked len >= 2");
        let last = history.last().expect("checked len >= 2");
        let span_days = (last.date - first.date).num_days() as f64;
        let blocks_per_day = if span_days > 0.0 {
            (last.height as f64 - first.height as f64) / span_days
        } else {
            144.0
        };
        let heights = HeightMap {
            anchor_date: first.date,
            anchor_height: first.height,
            blocks_per_day: if blocks_per_day > 0.0 { blocks_per_day } else { 144.0 },
        };

        let points: Vec<(f64, f64)> = history
            .iter()
            .filter(|h| h.price_usd > 0.0)
            .filter_map(|h| halving::stock_to_flow(h.height).map(|s2f| (s2f.log10(), h.price_usd.log10())))
            .collect();
        if points.is_empty() {
            return Err(ModelError::EmptyHistory(self.name()));
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let cov: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
        let var_x: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let slope = if var_x > 0.0 { cov / var_x } else { 0.0 };
        let intercept = mean_y - slope * mean_x;
        let residual_std_log10 = {
            let sse: f64 = points.iter().map(|(x, y)| (y - (intercept + slope * x)).powi(2)).sum();
            (sse / n).sqrt()
        };

        self.params = Some(FitParams { heights, intercept, slope, residual_std_log10 });
        Ok(())
    }

    fn predict(&self, target_date: NaiveDate) -> Result<Prediction, ModelError> {
        let params = self.params.ok_or(ModelError::NotFitted(self.name()))?;
        let height = params.heights.height_at(target_date);

        // Past the final halving epoch Stock-to-Flow is undefined; this model
        // has no useful prediction that far out.
        let s2f = halving::stock_to_flow(height).ok_or(ModelError::NotFitted(self.name()))?;

        let log_price = params.intercept + params.slope * s2f.log10();
        let predicted_price = 10f64.powf(log_price);
        let ci_lower = 10f64.powf(log_price - 1.96 * params.residual_std_log10);
        let ci_upper = 10f64.powf(log_price + 1.96 * params.residual_std_log10);

        let mut metadata = BTreeMap::new();
        metadata.insert("estimated_height".to_string(), height.to_string());
        metadata.insert("stock_to_flow".to_string(), s2f.to_string());

        Ok(Prediction {
            model_name: self.name().to_string(),
            date: target_date,
            predicted_price,
            ci_lower,
            ci_upper,
            confidence_level: 0.95,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(days_from_genesis: i64, height: u64, price: f64) -> HistoryPoint {
        HistoryPoint {
            date: NaiveDate::from_ymd_opt(2009, 1, 3).unwrap() + chrono::Duration::days(days_from_genesis),
            height,
            price_usd: price,
            thermocap_usd: None,
        }
    }

    fn sample_history() -> Vec<HistoryPoint> {
        (0..3000)
            .step_by(50)
            .map(|d| {
                let height = d as u64 * 144;
                let s2f = halving::stock_to_flow(height).unwrap_or(1.0);
                point(d, height, 100.0 * s2f.powf(3.0))
            })
            .collect()
    }

    #[test]
    fn predict_before_fit_errors() {
        let model = StockToFlowModel::new();
        assert!(matches!(model.predict(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()), Err(ModelError::NotFitted(_))));
    }

    #[test]
    fn fit_then_predict_returns_positive_price() {
        let mut model = StockToFlowModel::new();
        model.fit(&sample_history()).unwrap();

        let prediction = model.predict(NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()).unwrap();
        assert!(prediction.predicted_price > 0.0);
        assert!(prediction.ci_lower <= prediction.predicted_price);
        assert!(prediction.ci_upper >= prediction.predicted_price);
    }

    #[test]
    fn fit_rejects_single_point_history() {
        let mut model = StockToFlowModel::new();
        assert!(model.fit(&[point(0, 0, 1.0)]).is_err());
    }
}
