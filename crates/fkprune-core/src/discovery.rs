//! Relationship edge discovery.
//!
//! Walks the declared parent relationships of every tracked table and turns
//! them into [`RelationshipEdge`]s. Polymorphic declarations are resolved
//! against live data: one edge per distinct discriminator value that maps to
//! a known table.
//!
//! Discovery is tolerant. A relationship, destination, or discriminator value
//! that cannot be resolved is logged and skipped, and so is an edge whose
//! columns do not exist in the live schema.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::catalog::{foreign_key_for_table, LEFT_SIDE_PLACEHOLDER};
use crate::edge::RelationshipEdge;
use crate::error::Result;
use crate::reflection::{DeclaredDestination, RelationshipDeclaration, SchemaReflection};

/// Discovers relationship edges through a [`SchemaReflection`].
pub struct EdgeDiscovery<'a, R: SchemaReflection + ?Sized> {
    reflection: &'a R,
    columns: HashMap<String, Vec<String>>,
}

/// A resolved destination of a declaration.
struct Destination {
    table: String,
    type_name: Option<String>,
}

impl<'a, R: SchemaReflection + ?Sized> EdgeDiscovery<'a, R> {
    /// Create a discovery pass.
    pub fn new(reflection: &'a R) -> Self {
        Self {
            reflection,
            columns: HashMap::new(),
        }
    }

    /// Discover all edges declared by `tables`.
    ///
    /// Tables are deduplicated; output order follows table and declaration
    /// order with duplicate edges removed.
    pub fn discover(&mut self, tables: &[String]) -> Vec<RelationshipEdge> {
        let mut seen_tables = HashSet::new();
        let mut seen_edges = HashSet::new();
        let mut edges = Vec::new();

        for table in tables {
            if !seen_tables.insert(table.as_str()) {
                continue;
            }

            let declarations = match self.reflection.relationships_of(table) {
                Ok(declarations) => declarations,
                Err(e) => {
                    warn!(table = %table, error = %e, "failed to read relationships");
                    continue;
                }
            };

            for declaration in &declarations {
                for edge in self.edges_for_declaration(declaration) {
                    if seen_edges.insert(edge.clone()) {
                        debug!(edge = %edge, "discovered edge");
                        edges.push(edge);
                    }
                }
            }
        }

        edges
    }

    fn edges_for_declaration(&mut self, declaration: &RelationshipDeclaration) -> Vec<RelationshipEdge> {
        let destinations = self.destinations(declaration);
        let mut edges = Vec::with_capacity(destinations.len());

        for destination in destinations {
            match self.build_edge(declaration, destination) {
                Ok(Some(edge)) => edges.push(edge),
                Ok(None) => {}
                Err(e) => warn!(
                    table = %declaration.source_table,
                    relationship = %declaration.name,
                    error = %e,
                    "failed to build edge"
                ),
            }
        }

        edges
    }

    fn destinations(&self, declaration: &RelationshipDeclaration) -> Vec<Destination> {
        match &declaration.destination {
            DeclaredDestination::Model(model) => match self.reflection.resolve_model(model) {
                Ok(table) => vec![Destination {
                    table,
                    type_name: None,
                }],
                Err(e) => {
                    warn!(
                        table = %declaration.source_table,
                        relationship = %declaration.name,
                        error = %e,
                        "failed to resolve relationship destination"
                    );
                    Vec::new()
                }
            },
            DeclaredDestination::Polymorphic { type_column } => {
                let type_names = match self
                    .reflection
                    .distinct_values(&declaration.source_table, type_column)
                {
                    Ok(values) => values,
                    Err(e) => {
                        warn!(
                            table = %declaration.source_table,
                            column = %type_column,
                            error = %e,
                            "failed to read polymorphic types"
                        );
                        return Vec::new();
                    }
                };

                type_names
                    .into_iter()
                    .filter_map(|type_name| match self.reflection.resolve_type(&type_name) {
                        Ok(table) => Some(Destination {
                            table,
                            type_name: Some(type_name),
                        }),
                        Err(e) => {
                            warn!(
                                table = %declaration.source_table,
                                type_name = %type_name,
                                error = %e,
                                "failed to resolve polymorphic type"
                            );
                            None
                        }
                    })
                    .collect()
            }
        }
    }

    fn build_edge(
        &mut self,
        declaration: &RelationshipDeclaration,
        destination: Destination,
    ) -> Result<Option<RelationshipEdge>> {
        let foreign_key = if declaration.foreign_key == LEFT_SIDE_PLACEHOLDER {
            foreign_key_for_table(&destination.table)
        } else {
            declaration.foreign_key.clone()
        };

        let destination_key = match &declaration.primary_key {
            Some(key) => key.clone(),
            None => self.reflection.primary_key(&destination.table)?,
        };

        if !self.has_column(&destination.table, &destination_key)? {
            warn!(
                "bad relationship? column {}.{} doesn't exist",
                destination.table, destination_key
            );
            return Ok(None);
        }

        if !self.has_column(&declaration.source_table, &foreign_key)? {
            warn!(
                "bad relationship? column {}.{} doesn't exist",
                declaration.source_table, foreign_key
            );
            return Ok(None);
        }

        let edge = match (&declaration.destination, destination.type_name) {
            (DeclaredDestination::Polymorphic { type_column }, Some(type_name)) => {
                RelationshipEdge::polymorphic(
                    declaration.source_table.as_str(),
                    foreign_key,
                    type_column.as_str(),
                    type_name,
                    destination.table,
                    destination_key,
                )
            }
            _ => RelationshipEdge::new(
                declaration.source_table.as_str(),
                foreign_key,
                destination.table,
                destination_key,
            ),
        };

        Ok(Some(edge))
    }

    fn has_column(&mut self, table: &str, column: &str) -> Result<bool> {
        if !self.columns.contains_key(table) {
            let columns = self.reflection.columns(table)?;
            self.columns.insert(table.to_string(), columns);
        }
        Ok(self
            .columns
            .get(table)
            .is_some_and(|columns| columns.iter().any(|c| c == column)))
    }
}
