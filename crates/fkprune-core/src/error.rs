//! Core error types.

use thiserror::Error;

use crate::pruner::PruneStage;

/// Boxed error produced by a backend adapter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core pruning errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A SQL statement was rejected by the backend.
    #[error("statement failed: {statement}: {source}")]
    Statement {
        /// The statement text.
        statement: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// The database refused to add a foreign key constraint because
    /// existing rows violate it.
    #[error(
        "foreign key {constraint} rejected on {table}.{column} -> {referenced_table}: {reason}"
    )]
    ConstraintRejected {
        /// Constraint name.
        constraint: String,
        /// Table holding the foreign key.
        table: String,
        /// Foreign key column.
        column: String,
        /// Referenced table.
        referenced_table: String,
        /// Why the backend refused it.
        reason: String,
    },

    /// A model name could not be resolved by the catalog.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A table is not known to the catalog.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Transaction control failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Criteria were still matching rows when the iteration cap was hit.
    #[error("deletion did not converge after {iterations} iterations")]
    NonConvergent {
        /// Iterations performed.
        iterations: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A run stage failed and the transaction was rolled back.
    #[error("{stage} failed, changes rolled back: {source}")]
    Aborted {
        /// The stage that failed.
        stage: PruneStage,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build a statement error from anything convertible into a boxed error.
    pub fn statement(statement: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Statement {
            statement: statement.into(),
            source: source.into(),
        }
    }

    /// Strip any stage wrapper and return the root error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
