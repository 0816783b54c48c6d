//! Model Framework (C7): a uniform `fit`/`predict` contract over several
//! price models, composable into a weighted ensemble.
//!
//! ```text
//! traits.rs             # PriceModel — the fit/predict contract
//! model.rs              # HistoryPoint, Prediction
//! halving.rs            # pure issuance-schedule arithmetic
//! power_law.rs           \
//! stock_to_flow.rs        \_ built-in models
//! thermocap.rs            /
//! reference_oracle.rs    /
//! registry.rs            # name -> factory lookup
//! ensemble.rs            # weighted composition of registered models
//! error.rs               # ModelError
//! ```

pub mod ensemble;
pub mod error;
pub mod halving;
pub mod model;
pub mod power_law;
pub mod reference_oracle;
pub mod registry;
pub mod stock_to_flow;
pub mod thermocap;
pub mod traits;

pub use ensemble::{AggregationMethod, Ensemble};
pub use error::ModelError;
pub use model::{HistoryPoint, Prediction};
pub use power_law::PowerLawModel;
pub use reference_oracle::{OracleReading, ReferenceOracle, ReferenceOracleModel};
pub use registry::Registry;
pub use stock_to_flow::StockToFlowModel;
pub use thermocap::ThermocapModel;
pub use traits::PriceModel;
