//! Foreign key constraint definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::edge::RelationshipEdge;
use crate::error::Error;

/// Action taken on referencing rows when a referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Reject the change at the end of the statement.
    #[default]
    NoAction,
    /// Reject the change immediately.
    Restrict,
    /// Propagate the change to referencing rows.
    Cascade,
    /// Set the referencing column to null.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
}

impl ReferentialAction {
    /// SQL keyword form.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Check if the action rejects changes to referenced rows.
    pub fn is_rejecting(&self) -> bool {
        matches!(self, ReferentialAction::NoAction | ReferentialAction::Restrict)
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ReferentialAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', " ");
        match normalized.as_str() {
            "NO ACTION" => Ok(ReferentialAction::NoAction),
            "RESTRICT" => Ok(ReferentialAction::Restrict),
            "CASCADE" => Ok(ReferentialAction::Cascade),
            "SET NULL" => Ok(ReferentialAction::SetNull),
            "SET DEFAULT" => Ok(ReferentialAction::SetDefault),
            _ => Err(Error::Config(format!("unknown referential action: {}", s))),
        }
    }
}

/// A named foreign key constraint on a live table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name.
    pub name: String,
    /// Table holding the foreign key.
    pub table: String,
    /// Foreign key column.
    pub column: String,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced column.
    pub referenced_column: String,
    /// Action on update of the referenced key.
    #[serde(default)]
    pub on_update: ReferentialAction,
    /// Action on delete of the referenced row.
    #[serde(default)]
    pub on_delete: ReferentialAction,
}

impl ForeignKeyConstraint {
    /// Create a constraint with `NO ACTION` rules.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::NoAction,
        }
    }

    /// Build a `RESTRICT` constraint mirroring a plain edge.
    pub fn from_edge(name: impl Into<String>, edge: &RelationshipEdge) -> Self {
        Self::new(
            name,
            edge.source_table.as_str(),
            edge.foreign_key_column.as_str(),
            edge.destination_table.as_str(),
            edge.destination_key_column.as_str(),
        )
        .with_on_update(ReferentialAction::Restrict)
        .with_on_delete(ReferentialAction::Restrict)
    }

    /// Set the update rule.
    pub fn with_on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    /// Set the delete rule.
    pub fn with_on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// `ALTER TABLE ... ADD CONSTRAINT` statement for dialects that have one.
    pub fn add_sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
            self.table,
            self.name,
            self.column,
            self.referenced_table,
            self.referenced_column,
            self.on_update,
            self.on_delete
        )
    }

    /// `ALTER TABLE ... DROP CONSTRAINT` statement for dialects that have one.
    pub fn drop_sql(&self) -> String {
        format!("ALTER TABLE {} DROP CONSTRAINT {}", self.table, self.name)
    }
}
