//! # 📊 ocf-metrics — On-Chain Metric Library
//!
//! Pure, immutable value objects over C1 snapshots (C4, §4.4): URPD,
//! Supply in Profit/Loss, the MVRV family (MVRV, MVRV-Z, NUPL), Reserve
//! Risk, Sell-side Risk, CDD/VDD, and the P/L Ratio. Each result type's
//! `calculate` is a pure function of its inputs; [`service::MetricService`]
//! is the thin glue that pulls those inputs out of an [`ocf_store::Store`].
//!
//! ## 🏗️ Module Structure
//!
//! ```text
//! ocf-metrics/
//!  ├─ urpd.rs             # UrpdResult
//!  ├─ supply_pl.rs        # SupplyProfitLossResult, MarketPhase
//!  ├─ mvrv.rs             # MvrvResult, MvrvZResult, NuplResult
//!  ├─ reserve_risk.rs     # ReserveRiskResult
//!  ├─ sell_side_risk.rs   # SellSideRiskResult
//!  ├─ cdd_vdd.rs          # CddVddResult
//!  ├─ pl_ratio.rs         # PlRatioResult
//!  ├─ service.rs          # MetricService: store → calculate glue
//!  ├─ common.rs           # shared constants and numeric helpers
//!  └─ error.rs            # MetricError
//! ```

pub mod cdd_vdd;
pub mod common;
pub mod error;
pub mod mvrv;
pub mod pl_ratio;
pub mod reserve_risk;
pub mod sell_side_risk;
pub mod service;
pub mod supply_pl;
pub mod urpd;

pub use cdd_vdd::{CddVddResult, VddZone};
pub use error::MetricError;
pub use mvrv::{MvrvResult, MvrvZResult, MvrvZone, NuplResult, NuplZone};
pub use pl_ratio::{PlDominanceZone, PlRatioResult};
pub use reserve_risk::{ReserveRiskResult, ReserveRiskZone};
pub use sell_side_risk::{SellSideRiskResult, SellSideRiskZone};
pub use service::MetricService;
pub use supply_pl::{sth_lth_cutoff_block, MarketPhase, SupplyProfitLossResult, SupplySplit};
pub use urpd::{UrpdBucket, UrpdResult};
