//! `ocf` — the on-chain/derivatives signal fusion command-line tool (§6).

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use cli::{Cli, Command};
use error::CliError;
use ocf_core::config::Config;
use ocf_fusion::FusionConfig;

fn main() {
    logging::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let cli = Cli::parse();
    let result = dispatch(cli.command, &config);

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).expect("JSON values from this CLI always serialise"));
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            std::process::exit(exit_code(&e));
        }
    }
}

fn fusion_config(config: &Config) -> FusionConfig {
    FusionConfig {
        samples: config.fusion_samples,
        perturbation_k: config.fusion_perturbation_k,
        bimodal_saddle_depth: config.fusion_bimodal_saddle_depth,
        histogram_bins: config.fusion_histogram_bins,
    }
}

fn dispatch(command: Command, config: &Config) -> Result<serde_json::Value, CliError> {
    match command {
        Command::Bootstrap { from_snapshot } => {
            let summary = commands::bootstrap::run(&config.store_path, from_snapshot.as_deref())?;
            Ok(serde_json::to_value(summary)?)
        }
        Command::Metric { name, bucket_size, window_days, current_price } => {
            commands::metric::run(config, &name, bucket_size, window_days, current_price)
        }
        Command::Fuse { components, weights, seed } => {
            let fusion_cfg = fusion_config(config);
            let result = commands::fuse::run(components.as_deref(), weights.as_deref(), seed, &fusion_cfg)?;
            Ok(serde_json::to_value(result)?)
        }
        Command::Backtest { start, end, prices, votes, optimize, seed } => {
            let fusion_cfg = fusion_config(config);
            let report = commands::backtest::run(start, end, &prices, &votes, optimize, seed, &fusion_cfg)?;
            Ok(serde_json::to_value(report)?)
        }
    }
}

/// Maps a failed command to its §6 exit-code family. Falls back to `1` for
/// usage errors and anything not named a specific code there.
fn exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Bootstrap(e) => commands::bootstrap::exit_code(e),
        CliError::Metric(e) => commands::metric::exit_code(e),
        _ => 1,
    }
}
