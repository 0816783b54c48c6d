//! `ocf fuse [--components list] [--weights list] [--seed N]` (§6).
//!
//! `--components` is read as explicit `name:vote:confidence` triples rather
//! than something this crate derives from on-chain metrics itself — the
//! caller (or a future glue layer) is responsible for turning a metric
//! reading into a vote.

use ocf_core::SignalVote;
use ocf_fusion::{fuse, FusionConfig, FusionResult};

use crate::error::CliError;

pub fn run(components: Option<&str>, weights: Option<&str>, seed: u64, config: &FusionConfig) -> Result<FusionResult, CliError> {
    let components = components.ok_or_else(|| CliError::Usage("fuse requires --components name:vote:confidence,...".to_string()))?;
    let triples: Vec<&str> = components.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if triples.is_empty() {
        return Err(CliError::Usage("--components listed no entries".to_string()));
    }

    let explicit_weights = weights
        .map(|w| {
            w.split(',')
                .map(|s| {
                    s.trim()
                        .parse::<f64>()
                        .map_err(|_| CliError::Usage(format!("invalid weight {s:?}")))
                })
                .collect::<Result<Vec<f64>, CliError>>()
        })
        .transpose()?;

    if let Some(w) = &explicit_weights {
        if w.len() != triples.len() {
            return Err(CliError::Usage(format!(
                "--weights has {} entries but --components has {}",
                w.len(),
                triples.len()
            )));
        }
    }

    let equal_weight = 1.0 / triples.len() as f64;
    let mut votes = Vec::with_capacity(triples.len());
    for (i, triple) in triples.iter().enumerate() {
        let parts: Vec<&str> = triple.split(':').collect();
        let [name, vote, confidence] = parts.as_slice() else {
            return Err(CliError::Usage(format!("malformed component {triple:?}, expected name:vote:confidence")));
        };
        let weight = explicit_weights.as_ref().map(|w| w[i]).unwrap_or(equal_weight);

        let vote = match vote.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                votes.push(SignalVote::unavailable(*name, weight));
                continue;
            }
        };
        let confidence = confidence
            .parse::<f64>()
            .map_err(|_| CliError::Usage(format!("invalid confidence in {triple:?}")))?;

        votes.push(SignalVote::try_new(*name, Some(vote), confidence, weight).map_err(ocf_core::error::CoreError::from)?);
    }

    Ok(fuse(&votes, config, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explicit_triples_into_votes() {
        let config = FusionConfig::default();
        let result = run(Some("whale:0.6:0.8,utxo:0.3:0.9"), None, 1, &config).unwrap();
        assert_eq!(result.components.len(), 2);
    }

    #[test]
    fn na_vote_becomes_unavailable_rather_than_an_error() {
        let config = FusionConfig::default();
        let result = run(Some("whale:na:0.8"), None, 1, &config).unwrap();
        assert!(result.components.iter().any(|c| c.name == "whale" && c.vote == 0.0));
    }

    #[test]
    fn mismatched_weight_count_is_a_usage_error() {
        let config = FusionConfig::default();
        let err = run(Some("whale:0.6:0.8,utxo:0.3:0.9"), Some("1.0"), 1, &config).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn missing_components_is_a_usage_error() {
        let config = FusionConfig::default();
        let err = run(None, None, 1, &config).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }
}
