//! Factory registry for [`PriceModel`] implementations, keyed by name.

use indexmap::IndexMap;

use crate::error::ModelError;
use crate::traits::PriceModel;

type Factory = Box<dyn Fn() -> Box<dyn PriceModel>>;

/// Maps model names to factories, so an [`crate::ensemble::Ensemble`] can be
/// assembled from names alone (e.g. from a CLI argument or config file).
#[derive(Default)]
pub struct Registry {
    factories: IndexMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self { factories: IndexMap::new() }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn PriceModel> + 'static,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(ModelError::DuplicateRegistration(name));
        }
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn PriceModel>, ModelError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ModelError::UnknownModel(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_law::PowerLawModel;
    use crate::stock_to_flow::StockToFlowModel;

    #[test]
    fn register_then_create_round_trips() {
        let mut registry = Registry::new();
        registry.register("power_law", || Box::new(PowerLawModel::new())).unwrap();

        let model = registry.create("power_law").unwrap();
        assert_eq!(model.name(), "power_law");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        registry.register("power_law", || Box::new(PowerLawModel::new())).unwrap();
        let result = registry.register("power_law", || Box::new(PowerLawModel::new()));
        assert!(matches!(result, Err(ModelError::DuplicateRegistration(_))));
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        let registry = Registry::new();
        assert!(matches!(registry.create("does_not_exist"), Err(ModelError::UnknownModel(_))));
    }

    #[test]
    fn names_lists_registered_models_in_insertion_order() {
        let mut registry = Registry::new();
        registry.register("power_law", || Box::new(PowerLawModel::new())).unwrap();
        registry.register("stock_to_flow", || Box::new(StockToFlowModel::new())).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["power_law", "stock_to_flow"]);
    }
}
