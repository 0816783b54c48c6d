//! Fusion result types (§3 "Fusion result").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionType {
    Unimodal,
    Bimodal,
    InsufficientData,
}

/// One component's contribution to the fused signal, after renormalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentContribution {
    pub name: String,
    pub vote: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub signal_mean: f64,
    pub signal_std: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub action: Action,
    pub action_confidence: f64,
    pub components: Vec<ComponentContribution>,
    pub derivatives_available: bool,
    pub distribution_type: DistributionType,
    pub n_samples: usize,
}

impl FusionResult {
    /// The degenerate result returned when no component has an available
    /// vote (§4.6): zero mean, maximum-width CI, `HOLD`, zero confidence.
    pub fn insufficient_data(components: Vec<ComponentContribution>) -> Self {
        Self {
            signal_mean: 0.0,
            signal_std: 0.0,
            ci_lower: -1.0,
            ci_upper: 1.0,
            action: Action::Hold,
            action_confidence: 0.0,
            components,
            derivatives_available: false,
            distribution_type: DistributionType::InsufficientData,
            n_samples: 0,
        }
    }
}
