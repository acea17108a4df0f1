//! The pruning orchestrator.
//!
//! A run executes a fixed sequence of stages inside one transaction:
//!
//! 1. drop the original foreign keys of the tracked tables
//! 2. run pre-queries
//! 3. delete by seed criteria (to fixpoint)
//! 4. empty full-delete tables
//! 5. delete orphans and conjunctive criteria together (to fixpoint)
//! 6. sanity check: add, then drop, a foreign key for every plain edge
//! 7. recreate the original foreign keys
//! 8. commit
//!
//! Any failure rolls the transaction back, so a run either completes or
//! leaves the database as it found it.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument};

use crate::config::{PruneConfig, TrackedTables};
use crate::constraint::ConstraintManager;
use crate::criterion::{flatten_criteria, DeletionCriterion};
use crate::deleter::{ConvergentDeleter, DeletionStats};
use crate::discovery::EdgeDiscovery;
use crate::edge::RelationshipEdge;
use crate::error::{Error, Result};
use crate::executor::Database;
use crate::predicate::OrphanPredicateBuilder;
use crate::reflection::SchemaReflection;

/// A stage of a pruning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PruneStage {
    /// Drop the snapshotted foreign keys.
    DropOriginalConstraints,
    /// Run configured pre-queries.
    RunPreQueries,
    /// Delete by seed criteria.
    DeleteBySeedCriteria,
    /// Empty full-delete tables.
    TruncateFullDeleteTables,
    /// Delete orphans and conjunctive criteria to fixpoint.
    DeleteOrphans,
    /// Verify integrity with throwaway constraints.
    SanityCheck,
    /// Recreate the snapshotted foreign keys.
    RecreateOriginalConstraints,
    /// Commit the transaction.
    Commit,
}

impl PruneStage {
    /// Stages in execution order.
    pub const SEQUENCE: [PruneStage; 8] = [
        PruneStage::DropOriginalConstraints,
        PruneStage::RunPreQueries,
        PruneStage::DeleteBySeedCriteria,
        PruneStage::TruncateFullDeleteTables,
        PruneStage::DeleteOrphans,
        PruneStage::SanityCheck,
        PruneStage::RecreateOriginalConstraints,
        PruneStage::Commit,
    ];
}

impl fmt::Display for PruneStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PruneStage::DropOriginalConstraints => "dropping original foreign keys",
            PruneStage::RunPreQueries => "running pre-queries",
            PruneStage::DeleteBySeedCriteria => "deleting by seed criteria",
            PruneStage::TruncateFullDeleteTables => "truncating full-delete tables",
            PruneStage::DeleteOrphans => "deleting orphans",
            PruneStage::SanityCheck => "sanity check",
            PruneStage::RecreateOriginalConstraints => "recreating original foreign keys",
            PruneStage::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Pre-queries executed.
    pub pre_queries_run: usize,
    /// Seed criteria phase.
    pub seed: DeletionStats,
    /// Tables emptied.
    pub truncated_tables: Vec<String>,
    /// Orphan and conjunctive criteria phase.
    pub orphans: DeletionStats,
    /// Sanity check constraints added and dropped. None when skipped.
    pub constraints_verified: Option<usize>,
    /// Original constraints recreated.
    pub constraints_restored: usize,
    /// Wall time of the run.
    pub duration: Duration,
}

impl PruneReport {
    /// Rows deleted by criteria across both phases (truncations excluded).
    pub fn rows_deleted(&self) -> u64 {
        self.seed.total() + self.orphans.total()
    }
}

/// Prunes rows while preserving referential integrity.
///
/// Edges and the original constraint set are captured once, when the pruner
/// is built.
pub struct Pruner<'a, D: Database + ?Sized> {
    db: &'a D,
    config: PruneConfig,
    tables: Vec<String>,
    edges: Vec<RelationshipEdge>,
    constraints: ConstraintManager<'a, D>,
    predicates: OrphanPredicateBuilder,
}

impl<'a, D: Database + ?Sized> Pruner<'a, D> {
    /// Build a pruner, discovering edges and snapshotting constraints.
    pub fn new<R: SchemaReflection + ?Sized>(
        db: &'a D,
        reflection: &R,
        config: PruneConfig,
    ) -> Result<Self> {
        config.validate()?;

        let tables = match &config.tracked_tables {
            TrackedTables::All => reflection.tables(),
            TrackedTables::Only(tables) => {
                let mut seen = HashSet::new();
                tables
                    .iter()
                    .filter(|t| seen.insert(t.as_str()))
                    .cloned()
                    .collect()
            }
        };

        let edges = EdgeDiscovery::new(reflection).discover(&tables);
        let constraints = ConstraintManager::snapshot(db, &tables)?;

        info!(
            tables = tables.len(),
            edges = edges.len(),
            constraints = constraints.original_foreign_keys().len(),
            "pruner ready"
        );

        Ok(Self {
            db,
            config,
            tables,
            edges,
            constraints,
            predicates: OrphanPredicateBuilder::new(),
        })
    }

    /// Tracked tables.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Discovered edges.
    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// The run configuration.
    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    /// Run every stage in one transaction.
    ///
    /// On failure the transaction is rolled back and the error is returned
    /// wrapped in [`Error::Aborted`] naming the failed stage.
    #[instrument(skip(self), fields(tables = self.tables.len(), edges = self.edges.len()))]
    pub fn prune(&mut self) -> Result<PruneReport> {
        let start = Instant::now();
        let mut report = PruneReport::default();

        self.db.begin()?;

        for stage in PruneStage::SEQUENCE {
            if let Err(e) = self.run_stage(stage, &mut report) {
                error!(stage = %stage, error = %e, "pruning failed, rolling back");
                if let Err(rollback) = self.db.rollback() {
                    error!(error = %rollback, "rollback failed");
                }
                return Err(Error::Aborted {
                    stage,
                    source: Box::new(e),
                });
            }
        }

        report.duration = start.elapsed();
        info!(
            rows_deleted = report.rows_deleted(),
            truncated = report.truncated_tables.len(),
            duration_ms = report.duration.as_millis() as u64,
            "pruning completed"
        );

        Ok(report)
    }

    fn run_stage(&mut self, stage: PruneStage, report: &mut PruneReport) -> Result<()> {
        match stage {
            PruneStage::DropOriginalConstraints => {
                info!("dropping existing foreign key constraints");
                self.constraints
                    .drop_foreign_keys(self.constraints.original_foreign_keys())
            }
            PruneStage::RunPreQueries => {
                report.pre_queries_run = self.run_pre_queries()?;
                Ok(())
            }
            PruneStage::DeleteBySeedCriteria => {
                info!("deleting via deletion criteria");
                report.seed = self.delete(flatten_criteria(&self.config.deletion_criteria))?;
                Ok(())
            }
            PruneStage::TruncateFullDeleteTables => {
                report.truncated_tables = self.truncate_full_delete_tables()?;
                Ok(())
            }
            PruneStage::DeleteOrphans => {
                info!("deleting via conjunctive criteria and pruning orphaned rows");
                let criteria = self.orphan_phase_criteria();
                report.orphans = self.delete(criteria)?;
                Ok(())
            }
            PruneStage::SanityCheck => {
                report.constraints_verified = self.sanity_check()?;
                Ok(())
            }
            PruneStage::RecreateOriginalConstraints => {
                info!("recreating original foreign key constraints");
                let original = self.constraints.original_foreign_keys();
                self.constraints.create_foreign_keys(original)?;
                report.constraints_restored = original.len();
                Ok(())
            }
            PruneStage::Commit => self.db.commit(),
        }
    }

    fn run_pre_queries(&self) -> Result<usize> {
        info!(count = self.config.pre_queries.len(), "running pre-queries");
        for sql in &self.config.pre_queries {
            debug!(sql = %sql, "running pre-query");
            self.db.execute(sql)?;
        }
        Ok(self.config.pre_queries.len())
    }

    fn truncate_full_delete_tables(&self) -> Result<Vec<String>> {
        info!(count = self.config.full_delete_tables.len(), "truncating full-delete tables");
        for table in &self.config.full_delete_tables {
            debug!(table = %table, "truncating");
            self.db.execute(&self.db.truncate_statement(table))?;
        }
        Ok(self.config.full_delete_tables.clone())
    }

    /// Orphan criteria for every edge outside the full-delete tables, plus the
    /// conjunctive criteria, sorted and deduplicated.
    fn orphan_phase_criteria(&mut self) -> Vec<DeletionCriterion> {
        let mut criteria = flatten_criteria(&self.config.conjunctive_deletion_criteria);

        if self.config.prune_orphans {
            let emptied: HashSet<&str> = self
                .config
                .full_delete_tables
                .iter()
                .map(String::as_str)
                .collect();
            for edge in &self.edges {
                if emptied.contains(edge.source_table.as_str()) {
                    continue;
                }
                criteria.push(self.predicates.criterion(edge));
            }
        } else {
            info!("orphan pruning disabled");
        }

        criteria.sort();
        criteria.dedup();
        criteria
    }

    fn delete(&self, criteria: Vec<DeletionCriterion>) -> Result<DeletionStats> {
        ConvergentDeleter::new(self.db, criteria)
            .with_max_iterations(self.config.max_iterations)
            .run()
    }

    /// Add a throwaway foreign key per plain edge, then drop them all.
    fn sanity_check(&self) -> Result<Option<usize>> {
        if !self.config.perform_sanity_check {
            debug!("sanity check disabled");
            return Ok(None);
        }
        if !self.constraints.is_supported() {
            debug!("sanity check skipped, foreign keys unsupported");
            return Ok(None);
        }

        info!("sanity checking via foreign key constraints");
        let created = self.constraints.create_from_edges(&self.edges)?;
        self.constraints.drop_foreign_keys(&created)?;
        Ok(Some(created.len()))
    }
}
