//! Command-line surface (§6 "Inbound CLI").

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ocf", author, version, about = "On-chain/derivatives signal fusion engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the lifecycle store from a Tier-1 snapshot and replay Tier-2 blocks.
    Bootstrap {
        /// Path to a JSON Tier-1 snapshot (heights, prices, chainstate entries).
        #[arg(long)]
        from_snapshot: Option<PathBuf>,
    },

    /// Compute one metric from the current store state and print it as JSON.
    Metric {
        /// Metric name: urpd, supply_profit_loss, mvrv, mvrv_z, nupl,
        /// reserve_risk, sell_side_risk, cdd_vdd, pl_ratio.
        name: String,

        #[arg(long, default_value_t = 5_000.0)]
        bucket_size: f64,

        #[arg(long, default_value_t = 30)]
        window_days: u32,

        #[arg(long)]
        current_price: Option<f64>,
    },

    /// Run the Monte-Carlo fusion engine over an explicit set of component votes.
    Fuse {
        /// Comma-separated `name:vote:confidence` triples, e.g.
        /// `whale:0.6:0.8,utxo:0.3:0.9`. Omitted components fall back to
        /// `None` (unavailable) at their configured weight.
        #[arg(long)]
        components: Option<String>,

        /// Comma-separated weights, positionally matched to `--components`.
        /// Defaults to the configured weight for each named component.
        #[arg(long)]
        weights: Option<String>,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Walk the fusion engine forward over a realised-price window and report performance.
    Backtest {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        /// Path to a JSON array of `{"date": ..., "price_usd": ...}` points
        /// covering `[start, end]`.
        #[arg(long)]
        prices: PathBuf,

        /// Path to a JSON array of per-day vote sets, positionally aligned
        /// with `prices` (one fewer entry, since the last day has no
        /// forward-looking vote).
        #[arg(long)]
        votes: PathBuf,

        #[arg(long, default_value_t = false)]
        optimize: bool,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}
