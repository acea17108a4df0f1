//! Shared fixture for SQLite pruning tests.

#![allow(dead_code)]

use fkprune_core::{
    build_orphaned_selection, CatalogReflection, ModelCatalog, ModelDef, PruneConfig,
    PruneReport, Pruner, Result, SqlExecutor,
};
use fkprune_sqlite::{ForeignKeyMode, SqliteDatabase};
use rusqlite::types::Value;
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE genres (id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE movies (id INTEGER PRIMARY KEY, name TEXT, genre_id INTEGER);
    CREATE TABLE parent_models (id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE second_parent_models (id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE sub_parent_models (id INTEGER PRIMARY KEY, name TEXT, parent_model_id INTEGER);
    CREATE TABLE simple_child_models (
        id INTEGER PRIMARY KEY,
        name TEXT,
        parent_model_id INTEGER,
        second_parent_model_id INTEGER,
        sub_parent_model_id INTEGER
    );
    CREATE TABLE polymorphic_child_models (
        id INTEGER PRIMARY KEY,
        name TEXT,
        parent_id INTEGER,
        parent_type TEXT
    );
    CREATE TABLE simple_child_with_join_table_models (id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE parent_models_simple_child_with_join_table_models (
        id INTEGER PRIMARY KEY,
        parent_model_id INTEGER,
        simple_child_with_join_table_model_id INTEGER
    );
";

/// The model layer matching [`SCHEMA`].
pub fn catalog() -> ModelCatalog {
    ModelCatalog::new()
        .with_model(ModelDef::new("Genre", "genres"))
        .with_model(ModelDef::new("Movie", "movies").belongs_to("genre", "Genre", "genre_id"))
        .with_model(ModelDef::new("ParentModel", "parent_models"))
        .with_model(ModelDef::new("SecondParentModel", "second_parent_models"))
        .with_model(
            ModelDef::new("SubParentModel", "sub_parent_models").belongs_to(
                "parent_model",
                "ParentModel",
                "parent_model_id",
            ),
        )
        .with_model(
            ModelDef::new("SimpleChildModel", "simple_child_models")
                .belongs_to("parent_model", "ParentModel", "parent_model_id")
                .belongs_to(
                    "second_parent_model",
                    "SecondParentModel",
                    "second_parent_model_id",
                ),
        )
        .with_model(
            ModelDef::new("PolymorphicChildModel", "polymorphic_child_models")
                .belongs_to_polymorphic("parent"),
        )
        .with_model(ModelDef::new(
            "SimpleChildWithJoinTableModel",
            "simple_child_with_join_table_models",
        ))
        .with_join_table("SimpleChildWithJoinTableModel", "ParentModel")
        .expect("both sides registered")
}

/// A file-backed database loaded with the fixture schema.
pub struct TestContext {
    _dir: TempDir,
    pub db: SqliteDatabase,
    pub catalog: ModelCatalog,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_mode(ForeignKeyMode::Triggers)
    }

    pub fn with_mode(mode: ForeignKeyMode) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = SqliteDatabase::open(dir.path().join("prune.db"))
            .expect("Failed to open database")
            .with_foreign_key_mode(mode);
        db.connection()
            .execute_batch(SCHEMA)
            .expect("Failed to create schema");

        Self {
            _dir: dir,
            db,
            catalog: catalog(),
        }
    }

    /// Insert a row and return its id.
    pub fn insert(&self, table: &str, values: &[(&str, Value)]) -> i64 {
        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        let conn = self.db.connection();
        conn.execute(
            &sql,
            rusqlite::params_from_iter(values.iter().map(|(_, v)| v)),
        )
        .expect("Failed to insert row");
        conn.last_insert_rowid()
    }

    /// Insert a row holding only a name.
    pub fn named(&self, table: &str, name: &str) -> i64 {
        self.insert(table, &[("name", text(name))])
    }

    /// Names of every row in `table`, ordered by id.
    pub fn names(&self, table: &str) -> Vec<String> {
        self.db
            .query_strings(&format!("SELECT name FROM {} ORDER BY id", table))
            .expect("Failed to read names")
    }

    pub fn ids(&self, table: &str) -> Vec<String> {
        self.db
            .query_strings(&format!("SELECT id FROM {} ORDER BY id", table))
            .expect("Failed to read ids")
    }

    pub fn count(&self, table: &str) -> u64 {
        self.db
            .query_count(&format!("SELECT COUNT(*) FROM {}", table))
            .expect("Failed to count rows")
    }

    /// Every table's ids, for before/after comparisons.
    pub fn snapshot(&self) -> Vec<(String, Vec<String>)> {
        self.catalog
            .tables()
            .into_iter()
            .map(|t| {
                let ids = self.ids(&t);
                (t, ids)
            })
            .collect()
    }

    pub fn pruner(&self, config: PruneConfig) -> Result<Pruner<'_, SqliteDatabase>> {
        let reflection = CatalogReflection::new(&self.catalog, &self.db);
        Pruner::new(&self.db, &reflection, config)
    }

    pub fn prune(&self, config: PruneConfig) -> Result<PruneReport> {
        self.pruner(config)?.prune()
    }

    /// Assert that no row references a missing parent along any edge.
    pub fn assert_no_orphans(&self) {
        let pruner = self
            .pruner(PruneConfig::new())
            .expect("Failed to build pruner");
        for edge in pruner.edges() {
            let sql = format!(
                "SELECT COUNT(*) FROM {} WHERE {}",
                edge.source_table,
                build_orphaned_selection(edge)
            );
            assert_eq!(
                self.db.query_count(&sql).expect("Failed to count orphans"),
                0,
                "orphans left along {}",
                edge
            );
        }
    }
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub fn int(i: i64) -> Value {
    Value::Integer(i)
}

pub fn names(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|s| s.to_string()).collect()
}
