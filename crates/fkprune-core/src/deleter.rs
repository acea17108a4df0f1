//! Convergent deletion.
//!
//! Deletes rows matched by a set of criteria until a full measurement pass
//! finds nothing left to delete. Criteria are not ordered by dependency;
//! cascades between tables (including cycles) are resolved by repeating the
//! pass. A criterion that keeps matching new rows forever never converges
//! unless an iteration cap is set.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::criterion::DeletionCriterion;
use crate::error::{Error, Result};
use crate::executor::SqlExecutor;

/// Outcome of a convergent deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionStats {
    /// Number of passes that deleted something.
    pub iterations: usize,
    /// Rows deleted, by table.
    pub rows_deleted: BTreeMap<String, u64>,
}

impl DeletionStats {
    /// Total rows deleted.
    pub fn total(&self) -> u64 {
        self.rows_deleted.values().sum()
    }

    fn record(&mut self, table: &str, rows: u64) {
        *self.rows_deleted.entry(table.to_string()).or_default() += rows;
    }
}

/// Repeatedly deletes rows matching a set of criteria until fixpoint.
pub struct ConvergentDeleter<'a, E: SqlExecutor + ?Sized> {
    executor: &'a E,
    criteria: Vec<DeletionCriterion>,
    max_iterations: Option<usize>,
}

impl<'a, E: SqlExecutor + ?Sized> ConvergentDeleter<'a, E> {
    /// Create a deleter over `criteria`.
    pub fn new(executor: &'a E, criteria: Vec<DeletionCriterion>) -> Self {
        Self {
            executor,
            criteria,
            max_iterations: None,
        }
    }

    /// Fail with [`Error::NonConvergent`] if rows still match after `max`
    /// deleting passes.
    pub fn with_max_iterations(mut self, max: Option<usize>) -> Self {
        self.max_iterations = max;
        self
    }

    /// The criteria this deleter runs.
    pub fn criteria(&self) -> &[DeletionCriterion] {
        &self.criteria
    }

    /// Delete until no criterion matches any row.
    pub fn run(&self) -> Result<DeletionStats> {
        let mut stats = DeletionStats::default();

        loop {
            debug!(iteration = stats.iterations, "deletion loop iteration");

            let pending = self.measure()?;
            if pending.is_empty() {
                return Ok(stats);
            }

            if let Some(max) = self.max_iterations {
                if stats.iterations >= max {
                    return Err(Error::NonConvergent {
                        iterations: stats.iterations,
                    });
                }
            }

            for (criterion, count) in pending {
                info!(
                    table = %criterion.table,
                    predicate = %criterion.predicate,
                    count,
                    "deleting matched rows"
                );
                let deleted = self.executor.execute(&criterion.delete_sql())?;
                stats.record(&criterion.table, deleted as u64);
            }

            stats.iterations += 1;
        }
    }

    /// Count matches for every criterion, keeping those with any.
    fn measure(&self) -> Result<Vec<(&DeletionCriterion, u64)>> {
        let mut pending = Vec::new();
        for criterion in &self.criteria {
            let count = self.executor.query_count(&criterion.count_sql())?;
            debug!(
                table = %criterion.table,
                predicate = %criterion.predicate,
                count,
                "measured criterion"
            );
            if count > 0 {
                pending.push((criterion, count));
            }
        }
        Ok(pending)
    }
}
