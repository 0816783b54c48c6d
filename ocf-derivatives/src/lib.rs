//! # 📈 ocf-derivatives — Derivatives Signal Adapters
//!
//! Two adapters over an externally-owned derivatives analytics database,
//! attached read-only (C5, §4.5): a contrarian funding-rate conversion and
//! an open-interest decision table gated by whale-direction context. Both
//! degrade to a `None` [`ocf_core::SignalVote`] when the database is
//! unreachable, a query exhausts its retries, or the nearest row falls
//! outside the alignment tolerance.
//!
//! ## 🏗️ Module Structure
//!
//! ```text
//! ocf-derivatives/
//!  ├─ model.rs           # FundingRateRow / OpenInterestRow / WhaleDirection
//!  ├─ db.rs              # DerivativesDb: ATTACH ... (READ_ONLY) + retry + alignment
//!  ├─ funding.rs         # funding_vote, FundingRateReading
//!  ├─ open_interest.rs   # open_interest_vote, OpenInterestReading
//!  └─ error.rs           # DerivativesError
//! ```

pub mod db;
pub mod error;
pub mod funding;
pub mod model;
pub mod open_interest;

pub use db::{DerivativesDb, RetryPolicy};
pub use error::DerivativesError;
pub use funding::{funding_vote, FundingRateReading};
pub use model::{FundingRateRow, OpenInterestRow, WhaleDirection};
pub use open_interest::{open_interest_vote, OpenInterestReading};
