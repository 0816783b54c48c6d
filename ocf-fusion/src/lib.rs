//! # 🎲 ocf-fusion — Monte-Carlo Fusion Engine
//!
//! Combines weighted, confidence-scaled [`ocf_core::SignalVote`]s into a
//! sampled distribution and a trading action (C6, §4.6). Deterministic
//! given the same RNG seed.
//!
//! ## 🏗️ Module Structure
//!
//! ```text
//! ocf-fusion/
//!  ├─ config.rs   # FusionConfig
//!  ├─ result.rs   # FusionResult, Action, DistributionType
//!  └─ engine.rs    # fuse()
//! ```

pub mod config;
pub mod engine;
pub mod result;

pub use config::FusionConfig;
pub use engine::fuse;
pub use result::{Action, ComponentContribution, DistributionType, FusionResult};
