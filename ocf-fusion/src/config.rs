//! Fusion-specific tunables. Mirrors the corresponding fields on
//! `ocf_core::Config`; kept as a standalone struct so this crate has no
//! dependency on the environment-variable surface.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionConfig {
    pub samples: usize,
    /// `k` in `σ_i = (1 − confidence_i) × k` (§4.6 step 1a).
    pub perturbation_k: f64,
    /// Minimum saddle depth, as a fraction of the lower mode's height, to
    /// classify a sample distribution as bimodal (§4.6 step 3).
    pub bimodal_saddle_depth: f64,
    pub histogram_bins: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            perturbation_k: 0.25,
            bimodal_saddle_depth: 0.30,
            histogram_bins: 50,
        }
    }
}
