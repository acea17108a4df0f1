//! Orphaned-row predicates.

use std::collections::HashMap;

use crate::criterion::DeletionCriterion;
use crate::edge::RelationshipEdge;

/// Alias given to the destination table inside orphan subqueries, so the
/// outer reference to the source table stays unambiguous even when both are
/// the same table.
pub const DESTINATION_ALIAS: &str = "dst";

/// Builds and memoizes orphan predicates per edge.
#[derive(Debug, Default)]
pub struct OrphanPredicateBuilder {
    cache: HashMap<RelationshipEdge, String>,
}

impl OrphanPredicateBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicate selecting rows of `edge.source_table` orphaned through `edge`.
    pub fn orphaned_selection(&mut self, edge: &RelationshipEdge) -> &str {
        self.cache
            .entry(edge.clone())
            .or_insert_with(|| build_orphaned_selection(edge))
    }

    /// Deletion criterion for the orphans of `edge`.
    pub fn criterion(&mut self, edge: &RelationshipEdge) -> DeletionCriterion {
        let predicate = self.orphaned_selection(edge).to_string();
        DeletionCriterion::new(edge.source_table.as_str(), predicate)
    }

    /// Number of memoized predicates.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Build the orphan predicate for an edge.
///
/// Plain edges select rows whose foreign key is set but matches no
/// destination row. Polymorphic edges additionally require the discriminator
/// to name this edge's destination.
pub fn build_orphaned_selection(edge: &RelationshipEdge) -> String {
    let src = &edge.source_table;
    let fk = &edge.foreign_key_column;
    let orphaned = format!(
        "{src}.{fk} IS NOT NULL AND NOT EXISTS (SELECT 1 FROM {dst} {alias} WHERE {alias}.{key} = {src}.{fk})",
        src = src,
        fk = fk,
        dst = edge.destination_table,
        alias = DESTINATION_ALIAS,
        key = edge.destination_key_column,
    );

    match (&edge.type_column, &edge.destination_type_name) {
        (Some(type_column), Some(type_name)) => format!(
            "{}.{} = {} AND {}",
            src,
            type_column,
            quote_literal(type_name),
            orphaned
        ),
        _ => orphaned,
    }
}

/// Render a string as a single-quoted SQL literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
