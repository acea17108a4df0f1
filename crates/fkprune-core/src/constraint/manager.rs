//! Constraint lifecycle during a run.
//!
//! Real constraints are snapshotted up front, dropped while rows are deleted,
//! and recreated afterwards. Throwaway constraints built from discovered
//! edges let the database itself confirm that no orphan is left: adding a
//! constraint fails if any row violates it.

use std::collections::HashSet;

use tracing::{debug, error};

use super::foreign_key::ForeignKeyConstraint;
use super::naming::generate_constraint_name;
use crate::edge::RelationshipEdge;
use crate::error::{Error, Result};
use crate::executor::ConstraintAdapter;

/// Generated names tried per edge before giving up on a collision.
const NAME_ATTEMPTS: usize = 8;

/// Snapshots, drops, and recreates foreign key constraints.
///
/// Every operation is a no-op when the backend does not support foreign
/// keys.
pub struct ConstraintManager<'a, A: ConstraintAdapter + ?Sized> {
    adapter: &'a A,
    supported: bool,
    original: Vec<ForeignKeyConstraint>,
}

impl<'a, A: ConstraintAdapter + ?Sized> ConstraintManager<'a, A> {
    /// Snapshot the constraints currently defined on `tables`.
    pub fn snapshot(adapter: &'a A, tables: &[String]) -> Result<Self> {
        let supported = adapter.supports_foreign_keys();
        let mut original = Vec::new();

        if supported {
            let mut names = HashSet::new();
            for table in tables {
                for constraint in adapter.foreign_keys(table)? {
                    if names.insert(constraint.name.clone()) {
                        original.push(constraint);
                    }
                }
            }
        }

        debug!(supported, constraints = original.len(), "snapshotted foreign keys");

        Ok(Self {
            adapter,
            supported,
            original,
        })
    }

    /// Whether the backend supports foreign keys.
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Constraints found when the snapshot was taken.
    pub fn original_foreign_keys(&self) -> &[ForeignKeyConstraint] {
        &self.original
    }

    /// Drop constraints by name.
    pub fn drop_foreign_keys(&self, constraints: &[ForeignKeyConstraint]) -> Result<()> {
        if !self.supported {
            return Ok(());
        }

        for constraint in constraints {
            debug!(
                name = %constraint.name,
                table = %constraint.table,
                column = %constraint.column,
                "dropping foreign key"
            );
            self.adapter.drop_foreign_key(constraint)?;
        }
        Ok(())
    }

    /// Create constraints.
    pub fn create_foreign_keys(&self, constraints: &[ForeignKeyConstraint]) -> Result<()> {
        if !self.supported {
            return Ok(());
        }

        for constraint in constraints {
            debug!(
                name = %constraint.name,
                table = %constraint.table,
                column = %constraint.column,
                "creating foreign key"
            );
            self.adapter.add_foreign_key(constraint)?;
        }
        Ok(())
    }

    /// Create a uniquely named `RESTRICT` constraint for every plain edge.
    ///
    /// Polymorphic edges are skipped since no single foreign key can express
    /// them. The first constraint the database refuses aborts the call with
    /// [`Error::ConstraintRejected`]. A generated name that is already taken
    /// on the table is regenerated, so an existing constraint is never
    /// shadowed. Returns the constraints created.
    pub fn create_from_edges(&self, edges: &[RelationshipEdge]) -> Result<Vec<ForeignKeyConstraint>> {
        if !self.supported {
            return Ok(Vec::new());
        }

        let max_len = self.adapter.max_identifier_length();
        let mut created = Vec::new();

        for edge in edges.iter().filter(|e| !e.is_polymorphic()) {
            let name = self.unused_name(edge, || generate_constraint_name(edge, max_len))?;
            let constraint = ForeignKeyConstraint::from_edge(name, edge);

            debug!(
                name = %constraint.name,
                edge = %edge,
                "creating sanity check foreign key"
            );

            if let Err(e) = self.adapter.add_foreign_key(&constraint) {
                error!(name = %constraint.name, edge = %edge, error = %e, "foreign key rejected");
                return Err(match e {
                    rejected @ Error::ConstraintRejected { .. } => rejected,
                    other => Error::ConstraintRejected {
                        constraint: constraint.name,
                        table: constraint.table,
                        column: constraint.column,
                        referenced_table: constraint.referenced_table,
                        reason: other.to_string(),
                    },
                });
            }

            created.push(constraint);
        }

        Ok(created)
    }

    /// Draw names from `generate` until one is free on the edge's table.
    fn unused_name(
        &self,
        edge: &RelationshipEdge,
        mut generate: impl FnMut() -> String,
    ) -> Result<String> {
        let taken: HashSet<String> = self
            .adapter
            .foreign_keys(&edge.source_table)?
            .into_iter()
            .chain(self.original.iter().cloned())
            .map(|c| c.name)
            .collect();

        let mut name = generate();
        for _ in 1..NAME_ATTEMPTS {
            if !taken.contains(&name) {
                return Ok(name);
            }
            debug!(name = %name, edge = %edge, "constraint name taken, regenerating");
            name = generate();
        }
        if !taken.contains(&name) {
            return Ok(name);
        }

        Err(Error::ConstraintRejected {
            constraint: name,
            table: edge.source_table.clone(),
            column: edge.foreign_key_column.clone(),
            referenced_table: edge.destination_table.clone(),
            reason: "a constraint with this name already exists".to_string(),
        })
    }
}
