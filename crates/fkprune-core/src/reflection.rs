//! Schema reflection.
//!
//! Edge discovery only talks to [`SchemaReflection`]; where declarations come
//! from and how live data is read is up to the implementation.

use crate::catalog::{AssociationTarget, ModelCatalog};
use crate::error::{Error, Result};
use crate::executor::SqlExecutor;

/// Where a declared relationship points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredDestination {
    /// A single model, resolved to a table with
    /// [`SchemaReflection::resolve_model`].
    Model(String),
    /// Per-row destination named by a discriminator column.
    Polymorphic {
        /// Discriminator column on the source table.
        type_column: String,
    },
}

/// A parent relationship as declared for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDeclaration {
    /// Declaration name.
    pub name: String,
    /// Declaring (child) table.
    pub source_table: String,
    /// Foreign key column as declared.
    pub foreign_key: String,
    /// Referenced column override.
    pub primary_key: Option<String>,
    /// Destination.
    pub destination: DeclaredDestination,
}

/// Read access to declared relationships and live schema data.
pub trait SchemaReflection {
    /// Every known table, deduplicated by physical name.
    fn tables(&self) -> Vec<String>;

    /// Parent relationships declared for `table`.
    fn relationships_of(&self, table: &str) -> Result<Vec<RelationshipDeclaration>>;

    /// Primary key column of `table`.
    fn primary_key(&self, table: &str) -> Result<String>;

    /// Live column names of `table`.
    fn columns(&self, table: &str) -> Result<Vec<String>>;

    /// Resolve a model name to its table.
    fn resolve_model(&self, model: &str) -> Result<String>;

    /// Resolve a discriminator value to its table.
    fn resolve_type(&self, type_name: &str) -> Result<String> {
        self.resolve_model(type_name)
    }

    /// Distinct non-null values stored in `table.column`.
    fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<String>>;
}

/// [`SchemaReflection`] over a [`ModelCatalog`] and a live connection.
pub struct CatalogReflection<'a, E: SqlExecutor + ?Sized> {
    catalog: &'a ModelCatalog,
    executor: &'a E,
}

impl<'a, E: SqlExecutor + ?Sized> CatalogReflection<'a, E> {
    /// Create a reflection provider.
    pub fn new(catalog: &'a ModelCatalog, executor: &'a E) -> Self {
        Self { catalog, executor }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &ModelCatalog {
        self.catalog
    }
}

impl<E: SqlExecutor + ?Sized> SchemaReflection for CatalogReflection<'_, E> {
    fn tables(&self) -> Vec<String> {
        self.catalog.tables()
    }

    fn relationships_of(&self, table: &str) -> Result<Vec<RelationshipDeclaration>> {
        let model = self
            .catalog
            .model_for_table(table)
            .ok_or_else(|| Error::UnknownTable(table.to_string()))?;

        Ok(model
            .associations
            .iter()
            .map(|assoc| RelationshipDeclaration {
                name: assoc.name.clone(),
                source_table: model.table.clone(),
                foreign_key: assoc.foreign_key.clone(),
                primary_key: assoc.primary_key.clone(),
                destination: match &assoc.target {
                    AssociationTarget::Model { model } => DeclaredDestination::Model(model.clone()),
                    AssociationTarget::Polymorphic { type_column } => {
                        DeclaredDestination::Polymorphic {
                            type_column: type_column.clone(),
                        }
                    }
                },
            })
            .collect())
    }

    fn primary_key(&self, table: &str) -> Result<String> {
        self.catalog
            .model_for_table(table)
            .map(|m| m.primary_key.clone())
            .ok_or_else(|| Error::UnknownTable(table.to_string()))
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        self.executor.table_columns(table)
    }

    fn resolve_model(&self, model: &str) -> Result<String> {
        self.catalog
            .get_model(model)
            .map(|m| m.table.clone())
            .ok_or_else(|| Error::UnknownModel(model.to_string()))
    }

    fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM {table} WHERE {column} IS NOT NULL",
            column = column,
            table = table
        );
        self.executor.query_strings(&sql)
    }
}
