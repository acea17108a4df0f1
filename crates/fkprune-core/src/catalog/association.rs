//! Parent association declarations.

use serde::{Deserialize, Serialize};

/// Foreign key name reported for the left side of an automatically named
/// many-to-many join table. The real column is derived from the
/// destination table.
pub const LEFT_SIDE_PLACEHOLDER: &str = "left_side_id";

/// What a `belongs_to` association points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssociationTarget {
    /// A single, statically known model.
    Model {
        /// Target model name.
        model: String,
    },
    /// Destination chosen per row by a discriminator column holding the
    /// target model name.
    Polymorphic {
        /// Discriminator column on the source table.
        type_column: String,
    },
}

/// A parent association declared by a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelongsTo {
    /// Association name.
    pub name: String,
    /// Foreign key column on the declaring model's table.
    pub foreign_key: String,
    /// Referenced column; `None` means the destination's primary key.
    #[serde(default)]
    pub primary_key: Option<String>,
    /// Association target.
    pub target: AssociationTarget,
}

impl BelongsTo {
    /// Declare an association to a single model.
    pub fn model(
        name: impl Into<String>,
        model: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            foreign_key: foreign_key.into(),
            primary_key: None,
            target: AssociationTarget::Model {
                model: model.into(),
            },
        }
    }

    /// Declare a polymorphic association using `<name>_id` and `<name>_type`.
    pub fn polymorphic(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            foreign_key: format!("{}_id", name),
            primary_key: None,
            target: AssociationTarget::Polymorphic {
                type_column: format!("{}_type", name),
            },
            name,
        }
    }

    /// Override the referenced column.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    /// Check if this association is polymorphic.
    pub fn is_polymorphic(&self) -> bool {
        matches!(self.target, AssociationTarget::Polymorphic { .. })
    }
}

/// Singular form of a pluralized table name: one trailing `s` is dropped.
pub fn singularize(table: &str) -> String {
    table.strip_suffix('s').unwrap_or(table).to_string()
}

/// Conventional foreign key column referencing `table`.
pub fn foreign_key_for_table(table: &str) -> String {
    format!("{}_id", singularize(table))
}
