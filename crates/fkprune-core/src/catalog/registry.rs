//! The model catalog.

use serde::{Deserialize, Serialize};

use super::model::ModelDef;
use crate::error::{Error, Result};

/// Ordered collection of model definitions.
///
/// Several models may share one physical table; the first one registered is
/// that table's representative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalog {
    models: Vec<ModelDef>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model.
    pub fn with_model(mut self, model: ModelDef) -> Self {
        self.models.push(model);
        self
    }

    /// Add the join model for a many-to-many pair of registered models.
    pub fn with_join_table(self, left_model: &str, right_model: &str) -> Result<Self> {
        let left = self.require_model(left_model)?.table.clone();
        let right = self.require_model(right_model)?.table.clone();
        Ok(self.with_model(ModelDef::join_table(left_model, &left, right_model, &right)))
    }

    /// All models in registration order.
    pub fn models(&self) -> &[ModelDef] {
        &self.models
    }

    /// Get a model by name.
    pub fn get_model(&self, name: &str) -> Option<&ModelDef> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Get the representative model of a table.
    pub fn model_for_table(&self, table: &str) -> Option<&ModelDef> {
        self.models.iter().find(|m| m.table == table)
    }

    /// Distinct physical tables in registration order.
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = Vec::with_capacity(self.models.len());
        for model in &self.models {
            if !tables.contains(&model.table) {
                tables.push(model.table.clone());
            }
        }
        tables
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn require_model(&self, name: &str) -> Result<&ModelDef> {
        self.get_model(name)
            .ok_or_else(|| Error::UnknownModel(name.to_string()))
    }
}
