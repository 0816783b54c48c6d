//! The Monte-Carlo resampling engine (§4.6).

use ocf_core::SignalVote;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::config::FusionConfig;
use crate::result::{Action, ComponentContribution, DistributionType, FusionResult};

const BUY_THRESHOLD: f64 = 0.25;
const SELL_THRESHOLD: f64 = -0.25;

/// Fuses `votes` into a [`FusionResult`]. Deterministic given the same
/// `seed` and `votes` (§4.6: "fusion is deterministic given the same RNG
/// seed").
pub fn fuse(votes: &[SignalVote], config: &FusionConfig, seed: u64) -> FusionResult {
    let active: Vec<&SignalVote> = votes.iter().filter(|v| v.is_available()).collect();
    if active.is_empty() {
        let components = votes
            .iter()
            .map(|v| ComponentContribution { name: v.name.clone(), vote: 0.0, weight: 0.0 })
            .collect();
        return FusionResult::insufficient_data(components);
    }

    let derivatives_available = active.iter().any(|v| v.name == "funding" || v.name == "open_interest");

    let total_weight: f64 = active.iter().map(|v| v.weight).sum();
    let renormalised: Vec<(&SignalVote, f64)> = if total_weight > 0.0 {
        active.iter().map(|v| (*v, v.weight / total_weight)).collect()
    } else {
        let equal = 1.0 / active.len() as f64;
        active.iter().map(|v| (*v, equal)).collect()
    };

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(config.samples);

    for _ in 0..config.samples {
        let mut signal = 0.0;
        for (vote, weight) in &renormalised {
            let v = vote.vote.expect("filtered to available votes above");
            let sigma = (1.0 - vote.confidence) * config.perturbation_k;
            let perturbed = if sigma > 0.0 {
                let noise = Normal::new(0.0, sigma).expect("sigma is non-negative and finite").sample(&mut rng);
                (v + noise).clamp(-1.0, 1.0)
            } else {
                v
            };
            signal += weight * perturbed;
        }
        samples.push(signal);
    }

    let signal_mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let signal_std = {
        let variance = samples.iter().map(|s| (s - signal_mean).powi(2)).sum::<f64>() / samples.len() as f64;
        variance.sqrt()
    };

    let mut sorted = samples.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let ci_lower = percentile(&sorted, 2.5);
    let ci_upper = percentile(&sorted, 97.5);

    let distribution_type = classify_distribution(&samples, config.histogram_bins, config.bimodal_saddle_depth);

    let action = if signal_mean > BUY_THRESHOLD {
        Action::Buy
    } else if signal_mean < SELL_THRESHOLD {
        Action::Sell
    } else {
        Action::Hold
    };

    let agreeing = samples
        .iter()
        .filter(|&&s| match action {
            Action::Buy => s > 0.0,
            Action::Sell => s < 0.0,
            Action::Hold => (SELL_THRESHOLD..=BUY_THRESHOLD).contains(&s),
        })
        .count();
    let action_confidence = agreeing as f64 / samples.len() as f64;

    debug!(?action, signal_mean, signal_std, ?distribution_type, "fusion complete");

    FusionResult {
        signal_mean,
        signal_std,
        ci_lower,
        ci_upper,
        action,
        action_confidence,
        components: renormalised
            .iter()
            .map(|(v, w)| ComponentContribution { name: v.name.clone(), vote: v.vote.unwrap(), weight: *w })
            .collect(),
        derivatives_available,
        distribution_type,
        n_samples: samples.len(),
    }
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Bimodality test: builds a histogram, finds local maxima, and checks
/// whether the saddle between the two tallest maxima dips by at least
/// `saddle_depth_threshold` of the lower mode's height (§4.6 step 3).
fn classify_distribution(samples: &[f64], bins: usize, saddle_depth_threshold: f64) -> DistributionType {
    if samples.len() < 2 {
        return DistributionType::InsufficientData;
    }
    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max - min < 1e-12 || bins == 0 {
        return DistributionType::Unimodal;
    }

    let width = (max - min) / bins as f64;
    let mut hist = vec![0u32; bins];
    for &s in samples {
        let idx = (((s - min) / width) as usize).min(bins - 1);
        hist[idx] += 1;
    }

    let maxima: Vec<usize> = (0..bins)
        .filter(|&i| {
            let left = if i == 0 { 0 } else { hist[i - 1] };
            let right = if i == bins - 1 { 0 } else { hist[i + 1] };
            hist[i] > left && hist[i] > right
        })
        .collect();
    if maxima.len() < 2 {
        return DistributionType::Unimodal;
    }

    let mut by_height = maxima.clone();
    by_height.sort_by_key(|&i| std::cmp::Reverse(hist[i]));
    let (a, b) = (by_height[0], by_height[1]);
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let saddle = *hist[lo..=hi].iter().min().unwrap();
    let lower_mode_height = hist[a].min(hist[b]) as f64;

    if lower_mode_height <= 0.0 {
        return DistributionType::Unimodal;
    }
    let depth = (lower_mode_height - saddle as f64) / lower_mode_height;
    if depth >= saddle_depth_threshold {
        DistributionType::Bimodal
    } else {
        DistributionType::Unimodal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(name: &str, v: f64, confidence: f64, weight: f64) -> SignalVote {
        SignalVote::try_new(name, Some(v), confidence, weight).unwrap()
    }

    #[test]
    fn deterministic_given_same_seed() {
        let votes = vec![vote("whale", 0.5, 0.9, 0.4), vote("utxo", -0.2, 0.8, 0.6)];
        let config = FusionConfig::default();
        let r1 = fuse(&votes, &config, 42);
        let r2 = fuse(&votes, &config, 42);
        assert_eq!(r1, r2);
    }

    #[test]
    fn different_seeds_can_differ() {
        let votes = vec![vote("whale", 0.5, 0.1, 0.4), vote("utxo", -0.2, 0.1, 0.6)];
        let config = FusionConfig::default();
        let r1 = fuse(&votes, &config, 1);
        let r2 = fuse(&votes, &config, 2);
        assert_ne!(r1.signal_mean, r2.signal_mean);
    }

    #[test]
    fn no_active_components_yields_insufficient_data() {
        let votes = vec![SignalVote::unavailable("whale", 0.5)];
        let r = fuse(&votes, &FusionConfig::default(), 1);
        assert_eq!(r.distribution_type, DistributionType::InsufficientData);
        assert_eq!(r.action, Action::Hold);
        assert_eq!(r.action_confidence, 0.0);
    }

    #[test]
    fn strong_bullish_votes_produce_buy() {
        let votes = vec![vote("whale", 0.9, 0.95, 0.5), vote("utxo", 0.8, 0.95, 0.5)];
        let r = fuse(&votes, &FusionConfig::default(), 7);
        assert_eq!(r.action, Action::Buy);
        assert!(r.action_confidence > 0.8);
    }

    #[test]
    fn degradation_equivalence_when_derivatives_absent() {
        let two_component = vec![vote("whale", 0.5, 0.9, 0.4 / 0.6), vote("utxo", -0.1, 0.8, 0.2 / 0.6)];
        let four_component_degraded = vec![
            vote("whale", 0.5, 0.9, 0.4),
            vote("utxo", -0.1, 0.8, 0.2),
            SignalVote::unavailable("funding", 0.25),
            SignalVote::unavailable("open_interest", 0.15),
        ];
        let config = FusionConfig::default();
        let a = fuse(&two_component, &config, 99);
        let b = fuse(&four_component_degraded, &config, 99);
        assert!((a.signal_mean - b.signal_mean).abs() < 1e-9);
        assert_eq!(a.action, b.action);
    }

    #[test]
    fn active_weights_renormalise_to_one() {
        let votes = vec![vote("whale", 0.5, 0.9, 0.4), vote("utxo", -0.1, 0.8, 0.2)];
        let r = fuse(&votes, &FusionConfig::default(), 3);
        let sum: f64 = r.components.iter().map(|c| c.weight).sum();
        assert!((sum - 1.0).abs() < 1e-2);
    }
}
