//! # 🧱 ocf-bootstrap — Two-Tier Bootstrap Pipeline
//!
//! Populates an [`ocf_store::Store`] from a one-time chainstate (UTXO-set)
//! snapshot (Tier 1) and then replays subsequent blocks to keep it current
//! (Tier 2), per §4.2. Both tiers accept data through small, opaque structs
//! in [`model`] — the full-node RPC / block-indexer protocol itself is out
//! of scope (§1).
//!
//! ## 🏗️ Module Structure
//!
//! ```text
//! ocf-bootstrap/
//!  ├─ model.rs      # ChainstateEntry / BlockData / Progress / HeightDate / PricePoint
//!  ├─ pipeline.rs   # tier1_snapshot, tier2_replay
//!  └─ error.rs      # BootstrapError
//! ```

pub mod error;
pub mod model;
pub mod pipeline;

pub use error::BootstrapError;
pub use model::{BlockData, ChainstateEntry, HeightDate, NewOutput, Progress, PricePoint, SpentInput};
pub use pipeline::{tier1_snapshot, tier2_replay, Tier1Summary, Tier2Summary};
