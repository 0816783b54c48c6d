//! # 🗄️ ocf-store — Lifecycle Store & Price-Indexing Service
//!
//! Owns the `utxo`, `daily_prices`, and `block_heights` tables (C1), and the
//! service that keeps the latter two fresh from external price/block-metadata
//! feeds (C3). Every other crate in this workspace reaches these tables only
//! through [`Store`]'s read contract.
//!
//! ## 🏗️ Module Structure
//!
//! ```text
//! ocf-store/
//!  ├─ schema.rs       # DDL + index creation, idempotent
//!  ├─ model.rs         # Utxo / DailyPrice / BlockHeightRow / PriceBucket / SpentRow
//!  ├─ store.rs         # Store: the C1 read contract + C2/C3 write contract
//!  ├─ price_index.rs   # PriceIndexService: C3, refreshes prices/heights
//!  └─ error.rs         # StoreError
//! ```
//!
//! Backed by an embedded DuckDB database, chosen for its native bulk
//! `Appender` (required by the bootstrap pipeline's ≥1000× speed-up over
//! row-by-row insertion) and its `ATTACH ... (READ_ONLY)` support (used by
//! `ocf-derivatives` to read the externally-owned derivatives database).

pub mod error;
pub mod model;
pub mod price_index;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use model::{BlockHeightRow, DailyPrice, PriceBucket, SpentRow, Utxo};
pub use price_index::{BlockMetadataSource, PriceIndexService, PriceSource, RetryPolicy};
pub use store::{CohortFilter, Store};
