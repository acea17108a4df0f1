//! Deletion criteria.

use std::collections::BTreeMap;
use std::fmt;

/// A `(table, predicate)` pair selecting rows to delete.
///
/// The predicate is a boolean SQL expression evaluated against rows of
/// `table`. Ordering is by table, then predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeletionCriterion {
    /// Table to delete from.
    pub table: String,
    /// Boolean SQL expression scoped to the table's rows.
    pub predicate: String,
}

impl DeletionCriterion {
    /// Create a criterion.
    pub fn new(table: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicate: predicate.into(),
        }
    }

    /// `SELECT COUNT(*)` statement for the matching rows.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {} WHERE {}", self.table, self.predicate)
    }

    /// `DELETE` statement for the matching rows.
    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {}", self.table, self.predicate)
    }
}

impl fmt::Display for DeletionCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} where {}", self.table, self.predicate)
    }
}

/// Flatten a table → predicates mapping into criteria, in map order.
pub fn flatten_criteria(criteria: &BTreeMap<String, Vec<String>>) -> Vec<DeletionCriterion> {
    criteria
        .iter()
        .flat_map(|(table, predicates)| {
            predicates
                .iter()
                .map(move |p| DeletionCriterion::new(table.as_str(), p.as_str()))
        })
        .collect()
}
