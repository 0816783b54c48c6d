//! The `PriceModel` contract (§4.7).

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::model::{HistoryPoint, Prediction};

pub trait PriceModel: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Data-source keys this model needs from `history` (e.g. `"price"`,
    /// `"height"`, `"thermocap"`) — informational, used by callers deciding
    /// which models they can feed.
    fn required_data(&self) -> &'static [&'static str];

    /// Trains/calibrates the model. A no-op for closed-form models that
    /// need no fitting, but still required before `predict` (§4.7).
    fn fit(&mut self, history: &[HistoryPoint]) -> Result<(), ModelError>;

    /// Produces a prediction for `target_date`. Implementations must return
    /// `ModelError::NotFitted` if called before a successful `fit`.
    fn predict(&self, target_date: NaiveDate) -> Result<Prediction, ModelError>;
}
