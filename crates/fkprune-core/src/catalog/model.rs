//! Model definitions.

use serde::{Deserialize, Serialize};

use super::association::{foreign_key_for_table, BelongsTo, LEFT_SIDE_PLACEHOLDER};

fn default_primary_key() -> String {
    "id".to_string()
}

/// A logical model backed by a physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Model name (also the value stored in polymorphic discriminators).
    pub name: String,
    /// Physical table name.
    pub table: String,
    /// Primary key column.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Parent associations declared by this model.
    #[serde(default)]
    pub associations: Vec<BelongsTo>,
}

impl ModelDef {
    /// Create a model with an `id` primary key.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: default_primary_key(),
            associations: Vec::new(),
        }
    }

    /// Build the automatically named join model for a many-to-many pair.
    ///
    /// The table is named after both sides in lexical order. The left side's
    /// foreign key is reported as [`LEFT_SIDE_PLACEHOLDER`] and resolved
    /// during edge discovery.
    pub fn join_table(
        left_model: &str,
        left_table: &str,
        right_model: &str,
        right_table: &str,
    ) -> Self {
        let mut tables = [left_table, right_table];
        tables.sort_unstable();

        Self::new(
            format!("HABTM_{}_{}", left_model, right_model),
            tables.join("_"),
        )
        .with_association(BelongsTo::model("left_side", left_model, LEFT_SIDE_PLACEHOLDER))
        .with_association(BelongsTo::model(
            right_model.to_string(),
            right_model,
            foreign_key_for_table(right_table),
        ))
    }

    /// Set the primary key column.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Add an association.
    pub fn with_association(mut self, association: BelongsTo) -> Self {
        self.associations.push(association);
        self
    }

    /// Declare `belongs_to` another model.
    pub fn belongs_to(
        self,
        name: impl Into<String>,
        model: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.with_association(BelongsTo::model(name, model, foreign_key))
    }

    /// Declare a polymorphic `belongs_to`.
    pub fn belongs_to_polymorphic(self, name: impl Into<String>) -> Self {
        self.with_association(BelongsTo::polymorphic(name))
    }

    /// Get an association by name.
    pub fn get_association(&self, name: &str) -> Option<&BelongsTo> {
        self.associations.iter().find(|a| a.name == name)
    }
}
