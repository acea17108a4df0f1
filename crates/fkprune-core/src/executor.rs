//! Collaborator interfaces for the SQL backend.
//!
//! The engine issues every statement through these traits. Calls are
//! synchronous and strictly sequential; a run holds a single ambient
//! transaction opened with [`SqlExecutor::begin`].

use crate::constraint::ForeignKeyConstraint;
use crate::error::Result;

/// Executes SQL against one connection.
pub trait SqlExecutor {
    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> Result<usize>;

    /// Run a single-value `COUNT(*)` style query.
    fn query_count(&self, sql: &str) -> Result<u64>;

    /// Run a query and return the first column of every row as text.
    fn query_strings(&self, sql: &str) -> Result<Vec<String>>;

    /// List the columns of a live table. Unknown tables yield an empty list.
    fn table_columns(&self, table: &str) -> Result<Vec<String>>;

    /// Open the run's transaction.
    fn begin(&self) -> Result<()>;

    /// Commit the run's transaction.
    fn commit(&self) -> Result<()>;

    /// Roll back the run's transaction.
    fn rollback(&self) -> Result<()>;

    /// Statement that removes every row of `table`.
    fn truncate_statement(&self, table: &str) -> String {
        format!("TRUNCATE {}", table)
    }
}

/// Lists, adds, and drops named foreign key constraints.
///
/// Backends without enforced foreign keys return `false` from
/// [`supports_foreign_keys`](ConstraintAdapter::supports_foreign_keys); the
/// engine then never calls the other methods.
pub trait ConstraintAdapter {
    /// Whether the dialect supports named foreign key constraints.
    fn supports_foreign_keys(&self) -> bool;

    /// Constraints currently defined on `table`.
    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyConstraint>>;

    /// Add a constraint, validating existing rows.
    fn add_foreign_key(&self, constraint: &ForeignKeyConstraint) -> Result<()>;

    /// Drop a constraint by name.
    fn drop_foreign_key(&self, constraint: &ForeignKeyConstraint) -> Result<()>;

    /// Longest identifier the dialect accepts.
    fn max_identifier_length(&self) -> usize {
        64
    }
}

/// A backend that can both run SQL and manage constraints.
pub trait Database: SqlExecutor + ConstraintAdapter {}

impl<T: SqlExecutor + ConstraintAdapter + ?Sized> Database for T {}
