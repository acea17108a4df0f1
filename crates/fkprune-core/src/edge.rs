//! Parent→child relationship edges.

use std::fmt;

/// One directed parent→child foreign key relationship.
///
/// `source_table.foreign_key_column` references
/// `destination_table.destination_key_column`. Polymorphic edges also carry
/// the discriminator column and the discriminator value that selects this
/// destination; a single polymorphic declaration yields one edge per
/// destination found in live data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipEdge {
    /// Table holding the foreign key (child side).
    pub source_table: String,
    /// Referenced table (parent side).
    pub destination_table: String,
    /// Foreign key column on the source table.
    pub foreign_key_column: String,
    /// Referenced column on the destination table (usually its primary key).
    pub destination_key_column: String,
    /// Discriminator column, present only for polymorphic edges.
    pub type_column: Option<String>,
    /// Discriminator value identifying the destination.
    pub destination_type_name: Option<String>,
}

impl RelationshipEdge {
    /// Create a plain (non-polymorphic) edge.
    pub fn new(
        source_table: impl Into<String>,
        foreign_key_column: impl Into<String>,
        destination_table: impl Into<String>,
        destination_key_column: impl Into<String>,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            destination_table: destination_table.into(),
            foreign_key_column: foreign_key_column.into(),
            destination_key_column: destination_key_column.into(),
            type_column: None,
            destination_type_name: None,
        }
    }

    /// Create a polymorphic edge for one discriminator value.
    pub fn polymorphic(
        source_table: impl Into<String>,
        foreign_key_column: impl Into<String>,
        type_column: impl Into<String>,
        destination_type_name: impl Into<String>,
        destination_table: impl Into<String>,
        destination_key_column: impl Into<String>,
    ) -> Self {
        Self {
            type_column: Some(type_column.into()),
            destination_type_name: Some(destination_type_name.into()),
            ..Self::new(
                source_table,
                foreign_key_column,
                destination_table,
                destination_key_column,
            )
        }
    }

    /// Check if this edge is polymorphic.
    pub fn is_polymorphic(&self) -> bool {
        self.type_column.is_some()
    }

    /// Check if the edge points back at its own table.
    pub fn is_self_referential(&self) -> bool {
        self.source_table == self.destination_table
    }
}

impl fmt::Display for RelationshipEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source_table,
            self.foreign_key_column,
            self.destination_table,
            self.destination_key_column
        )?;
        if let (Some(column), Some(name)) = (&self.type_column, &self.destination_type_name) {
            write!(f, " [{} = {}]", column, name)?;
        }
        Ok(())
    }
}
