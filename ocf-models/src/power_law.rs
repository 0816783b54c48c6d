//! Power-Law price model: `price = 10^(a + b·log10(days_since_genesis))`,
//! fit by ordinary least squares in log-log space (§4.7).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::model::{HistoryPoint, Prediction};
use crate::traits::PriceModel;

const DEFAULT_GENESIS_DATE: (i32, u32, u32) = (2009, 1, 3);

#[derive(Debug, Clone, Copy)]
struct FitParams {
    intercept: f64,
    slope: f64,
    residual_std_log10: f64,
}

pub struct PowerLawModel {
    genesis_date: NaiveDate,
    params: Option<FitParams>,
}

impl PowerLawModel {
    pub fn new() -> Self {
        let (y, m, d) = DEFAULT_GENESIS_DATE;
        Self {
            genesis_date: NaiveDate::from_ymd_opt(y, m, d).expect("valid constant date"),
            params: None,
        }
    }

    fn days_since_genesis(&self, date: NaiveDate) -> f64 {
        (date - self.genesis_date).num_days().max(1) as f64
    }
}

impl Default for PowerLawModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceModel for PowerLawModel {
    fn name(&self) -> &'static str {
        "power_law"
    }

    fn description(&self) -> &'static str {
        "Log-log power-law fit of price against days since the genesis block"
    }

    fn required_data(&self) -> &'static [&'static str] {
        &["date", "price"]
    }

    fn fit(&mut self, history: &[HistoryPoint]) -> Result<(), ModelError> {
        if history.is_empty() {
            return Err(ModelError::EmptyHistory(self.name()));
        }

        let points: Vec<(f64, f64)> = history
            .iter()
            .filter(|h| h.price_usd > 0.0)
            .map(|h| (self.days_since_genesis(h.date).log10(), h.price_usd.log10()))
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

        self.params = Some(FitParams { intercept, slope, residual_std_log10 });
        Ok(())
    }

    fn predict(&self, target_date: NaiveDate) -> Result<Prediction, ModelError> {
        let params = self.params.ok_or(ModelError::NotFitted(self.name()))?;
        let x = self.days_since_genesis(target_date).log10();
        let log_price = params.intercept + params.slope * x;
        let predicted_price = 10f64.powf(log_price);

        let ci_lower = 10f64.powf(log_price - 1.96 * params.residual_std_log10);
        let ci_upper = 10f64.powf(log_price + 1.96 * params.residual_std_log10);

        let mut metadata = BTreeMap::new();
        metadata.insert("slope".to_string(), params.slope.to_string());
        metadata.insert("intercept".to_string(), params.intercept.to_string());

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

    fn point(days: i64, price: f64) -> HistoryPoint {
        HistoryPoint {
            date: NaiveDate::from_ymd_opt(2009, 1, 3).unwrap() + chrono::Duration::days(days),
            height: 0,
            price_usd: price,
            thermocap_usd: None,
        }
    }

    #[test]
    fn predict_before_fit_errors() {
        let model = PowerLawModel::new();
        assert!(matches!(model.predict(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()), Err(ModelError::NotFitted(_))));
    }

    #[test]
    fn fit_then_predict_returns_positive_price_with_ci() {
        let mut model = PowerLawModel::new();
        let history: Vec<HistoryPoint> = (1..2000).step_by(100).map(|d| point(d, 0.01 * (d as f64).powf(2.0))).collect();
        model.fit(&history).unwrap();

        let prediction = model.predict(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()).unwrap();
        assert!(prediction.predicted_price > 0.0);
        assert!(prediction.ci_lower <= prediction.predicted_price);
        assert!(prediction.ci_upper >= prediction.predicted_price);
    }

    #[test]
    fn fit_rejects_empty_history() {
        let mut model = PowerLawModel::new();
        assert!(model.fit(&[]).is_err());
    }
}
