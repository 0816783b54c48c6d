//! Shared input/output shapes for the model framework.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One calibration observation. `height` and `thermocap_usd` are optional
/// because not every model needs them (Power-Law needs only `date`/`price`;
/// Stock-to-Flow needs `height`; Thermocap-multiple needs `thermocap_usd`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub height: u64,
    pub price_usd: f64,
    pub thermocap_usd: Option<f64>,
}

/// `predict`'s output (§4.7 "Model Framework").
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub model_name: String,
    pub date: NaiveDate,
    pub predicted_price: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence_level: f64,
    pub metadata: BTreeMap<String, String>,
}
