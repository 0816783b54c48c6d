//! Thermocap-multiple price model: fits price against cumulative miner
//! revenue ("thermocap"), itself projected forward from its own historical
//! trend so that `predict` can be driven by `target_date` alone, matching
//! the other built-ins' call shape.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::model::{HistoryPoint, Prediction};
use crate::traits::PriceModel;

#[derive(Debug, Clone, Copy)]
struct LogLogFit {
    intercept: f64,
    slope: f64,
    residual_std: f64,
}

fn fit_log_log(points: &[(f64, f64)]) -> LogLogFit {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let cov: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let var_x: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let slope = if var_x > 0.0 { cov / var_x } else { 0.0 };
    let intercept = mean_y - slope * mean_x;
    let sse: f64 = points.iter().map(|(x, y)| (y - (intercept + slope * x)).powi(2)).sum();
    LogLogFit { intercept, slope, residual_std: (sse / n).sqrt() }
}

pub struct ThermocapModel {
    genesis_date: NaiveDate,
    thermocap_trend: Option<LogLogFit>,
    price_from_thermocap: Option<LogLogFit>,
}

impl ThermocapModel {
    pub fn new() -> Self {
        Self {
            genesis_date: NaiveDate::from_ymd_opt(2009, 1, 3).expect("valid constant date"),
            thermocap_trend: None,
            price_from_thermocap: None,
        }
    }

    fn days_since_genesis(&self, date: NaiveDate) -> f64 {
        (date - self.genesis_date).num_days().max(1) as f64
    }
}

impl Default for ThermocapModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceModel for ThermocapModel {
    fn name(&self) -> &'static str {
        "thermocap_multiple"
    }

    fn description(&self) -> &'static str {
        "Price regressed against cumulative miner revenue (thermocap), projected forward by its own trend"
    }

    fn required_data(&self) -> &'static [&'static str] {
        &["date", "price", "thermocap"]
    }

    fn fit(&mut self, history: &[HistoryPoint]) -> Result<(), ModelError> {
        let usable: Vec<&HistoryPoint> = history
            .iter()
            .filter(|h| h.price_usd > 0.0 && h.thermocap_usd.is_some_and(|t| t > 0.0))
            .collect();
        if usable.is_empty() {
            return Err(ModelError::EmptyHistory(self.name()));
        }

        let trend_points: Vec<(f64, f64)> = usable
            .iter()
            .map(|h| (self.days_since_genesis(h.date).log10(), h.thermocap_usd.expect("filtered Some above").log10()))
            .collect();
        let price_points: Vec<(f64, f64)> = usable
            .iter()
            .map(|h| (h.thermocap_usd.expect("filtered Some above").log10(), h.price_usd.log10()))
            .collect();

        self.thermocap_trend = Some(fit_log_log(&trend_points));
        self.price_from_thermocap = Some(fit_log_log(&price_points));
        Ok(())
    }

    fn predict(&self, target_date: NaiveDate) -> Result<Prediction, ModelError> {
        let trend = self.thermocap_trend.ok_or(ModelError::NotFitted(self.name()))?;
        let price_fit = self.price_from_thermocap.ok_or(ModelError::NotFitted(self.name()))?;

        let x = self.days_since_genesis(target_date).log10();
        let projected_log_thermocap = trend.intercept + trend.slope * x;

        let log_price = price_fit.intercept + price_fit.slope * projected_log_thermocap;
        let predicted_price = 10f64.powf(log_price);

        let combined_std = (trend.residual_std.powi(2) * price_fit.slope.powi(2) + price_fit.residual_std.powi(2)).sqrt();
        let ci_lower = 10f64.powf(log_price - 1.96 * combined_std);
        let ci_upper = 10f64.powf(log_price + 1.96 * combined_std);

        let mut metadata = BTreeMap::new();
        metadata.insert("projected_thermocap_usd".to_string(), 10f64.powf(projected_log_thermocap).to_string());

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

    fn point(days: i64, price: f64, thermocap: f64) -> HistoryPoint {
        HistoryPoint {
            date: NaiveDate::from_ymd_opt(2009, 1, 3).unwrap() + chrono::Duration::days(days),
            height: 0,
            price_usd: price,
            thermocap_usd: Some(thermocap),
        }
    }

    #[test]
    fn predict_before_fit_errors() {
        let model = ThermocapModel::new();
        assert!(matches!(model.predict(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()), Err(ModelError::NotFitted(_))));
    }

    #[test]
    fn fit_rejects_history_without_thermocap() {
        let mut model = ThermocapModel::new();
        let history = vec![HistoryPoint {
            date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            height: 0,
            price_usd: 100.0,
            thermocap_usd: None,
        }];
        assert!(model.fit(&history).is_err());
    }

    #[test]
    fn fit_then_predict_returns_positive_price_with_ci() {
        let mut model = ThermocapModel::new();
        let history: Vec<HistoryPoint> = (100..3000).step_by(50).map(|d| point(d, 0.02 * (d as f64), 0.01 * (d as f64).powf(1.5))).collect();
        model.fit(&history).unwrap();

        let prediction = model.predict(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()).unwrap();
        assert!(prediction.predicted_price > 0.0);
        assert!(prediction.ci_lower <= prediction.predicted_price);
        assert!(prediction.ci_upper >= prediction.predicted_price);
    }
}
