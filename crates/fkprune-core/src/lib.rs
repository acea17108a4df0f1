//! fkprune core - referential-integrity-preserving bulk deletion.
//!
//! Given seed deletion criteria, the engine deletes the seed rows and then
//! every row left orphaned by them, repeating until no orphan remains
//! anywhere in the tracked schema. Relationship edges, including polymorphic
//! ones, are discovered from a model catalog and live data. Foreign keys are
//! dropped for the duration of the run and recreated afterwards, and
//! throwaway constraints let the database confirm integrity before commit.

pub mod catalog;
pub mod config;
pub mod constraint;
pub mod criterion;
pub mod deleter;
pub mod discovery;
pub mod edge;
pub mod error;
pub mod executor;
pub mod predicate;
pub mod pruner;
pub mod reflection;

#[cfg(test)]
mod testing;

pub use catalog::{AssociationTarget, BelongsTo, ModelCatalog, ModelDef};
pub use config::{PruneConfig, TrackedTables};
pub use constraint::{ConstraintManager, ForeignKeyConstraint, ReferentialAction};
pub use criterion::DeletionCriterion;
pub use deleter::{ConvergentDeleter, DeletionStats};
pub use discovery::EdgeDiscovery;
pub use edge::RelationshipEdge;
pub use error::{BoxError, Error, Result};
pub use executor::{ConstraintAdapter, Database, SqlExecutor};
pub use predicate::{build_orphaned_selection, OrphanPredicateBuilder};
pub use pruner::{PruneReport, PruneStage, Pruner};
pub use reflection::{CatalogReflection, DeclaredDestination, RelationshipDeclaration, SchemaReflection};
