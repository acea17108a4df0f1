//! Pruning configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which tables a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedTables {
    /// Every table known to schema reflection.
    #[default]
    All,
    /// An explicit list. Duplicates are ignored.
    Only(Vec<String>),
}

/// Options for one pruning run. Read-only while the run executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PruneConfig {
    /// Tables whose edges are discovered and whose constraints are managed.
    pub tracked_tables: TrackedTables,

    /// Table → predicates deleted up front.
    pub deletion_criteria: BTreeMap<String, Vec<String>>,

    /// Tables emptied unconditionally.
    pub full_delete_tables: Vec<String>,

    /// Raw statements run before anything is deleted.
    pub pre_queries: Vec<String>,

    /// Table → predicates deleted together with orphans until fixpoint.
    /// Useful for rows tied to pruned rows only through join tables.
    pub conjunctive_deletion_criteria: BTreeMap<String, Vec<String>>,

    /// Prove integrity afterwards by adding (then dropping) a foreign key
    /// for every plain edge.
    pub perform_sanity_check: bool,

    /// Delete orphaned rows. Turning this off leaves only explicit criteria.
    pub prune_orphans: bool,

    /// Deleting passes allowed per convergence phase. None means unbounded.
    pub max_iterations: Option<usize>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            tracked_tables: TrackedTables::All,
            deletion_criteria: BTreeMap::new(),
            full_delete_tables: Vec::new(),
            pre_queries: Vec::new(),
            conjunctive_deletion_criteria: BTreeMap::new(),
            perform_sanity_check: true,
            prune_orphans: true,
            max_iterations: None,
        }
    }
}

impl PruneConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the run to the given tables.
    pub fn with_tracked_tables(mut self, tables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tracked_tables = TrackedTables::Only(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Add up-front deletion predicates for a table.
    pub fn with_deletion_criteria(
        mut self,
        table: impl Into<String>,
        predicates: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.deletion_criteria
            .entry(table.into())
            .or_default()
            .extend(predicates.into_iter().map(Into::into));
        self
    }

    /// Add a table to empty completely.
    pub fn with_full_delete_table(mut self, table: impl Into<String>) -> Self {
        self.full_delete_tables.push(table.into());
        self
    }

    /// Add a statement to run first.
    pub fn with_pre_query(mut self, sql: impl Into<String>) -> Self {
        self.pre_queries.push(sql.into());
        self
    }

    /// Add predicates deleted alongside orphans.
    pub fn with_conjunctive_criteria(
        mut self,
        table: impl Into<String>,
        predicates: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.conjunctive_deletion_criteria
            .entry(table.into())
            .or_default()
            .extend(predicates.into_iter().map(Into::into));
        self
    }

    /// Enable or disable the constraint sanity check.
    pub fn with_sanity_check(mut self, enabled: bool) -> Self {
        self.perform_sanity_check = enabled;
        self
    }

    /// Skip orphan pruning.
    pub fn without_orphan_pruning(mut self) -> Self {
        self.prune_orphans = false;
        self
    }

    /// Cap deleting passes per convergence phase.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Check that every table name, predicate, and statement is non-blank.
    pub fn validate(&self) -> Result<()> {
        fn check_criteria(kind: &str, criteria: &BTreeMap<String, Vec<String>>) -> Result<()> {
            for (table, predicates) in criteria {
                if table.trim().is_empty() {
                    return Err(Error::Config(format!("{} has a blank table name", kind)));
                }
                if predicates.iter().any(|p| p.trim().is_empty()) {
                    return Err(Error::Config(format!(
                        "{} for {} has a blank predicate",
                        kind, table
                    )));
                }
            }
            Ok(())
        }

        check_criteria("deletion_criteria", &self.deletion_criteria)?;
        check_criteria(
            "conjunctive_deletion_criteria",
            &self.conjunctive_deletion_criteria,
        )?;

        if self.full_delete_tables.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::Config("full_delete_tables has a blank table name".into()));
        }
        if self.pre_queries.iter().any(|q| q.trim().is_empty()) {
            return Err(Error::Config("pre_queries has a blank statement".into()));
        }
        if let TrackedTables::Only(tables) = &self.tracked_tables {
            if tables.iter().any(|t| t.trim().is_empty()) {
                return Err(Error::Config("tracked_tables has a blank table name".into()));
            }
        }
        if self.max_iterations == Some(0) {
            return Err(Error::Config("max_iterations must be at least 1".into()));
        }

        Ok(())
    }
}
