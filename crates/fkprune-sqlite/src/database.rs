//! SQLite connection wrapper.

use std::path::Path;
use std::str::FromStr;

use fkprune_core::{
    build_orphaned_selection, ConstraintAdapter, Error, ForeignKeyConstraint, ReferentialAction,
    RelationshipEdge, Result, SqlExecutor,
};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, trace};

use crate::triggers::{self, CATALOG_TABLE};

/// How named foreign keys are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyMode {
    /// Emulate named constraints with triggers.
    #[default]
    Triggers,
    /// Report no foreign key support; constraint calls are no-ops.
    Unsupported,
}

/// A SQLite database usable as a pruning backend.
pub struct SqliteDatabase {
    conn: Connection,
    mode: ForeignKeyMode,
}

impl SqliteDatabase {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            mode: ForeignKeyMode::default(),
        }
    }

    /// Set the foreign key mode.
    pub fn with_foreign_key_mode(mut self, mode: ForeignKeyMode) -> Self {
        self.mode = mode;
        self
    }

    /// How foreign keys are handled on this connection.
    pub fn foreign_key_mode(&self) -> ForeignKeyMode {
        self.mode
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give back the underlying connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }

    fn run(&self, sql: &str) -> Result<()> {
        trace!(sql = %sql, "executing");
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::statement(sql, e))
    }

    fn catalog_exists(&self) -> Result<bool> {
        let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
        let count: i64 = self
            .conn
            .query_row(sql, [CATALOG_TABLE], |row| row.get(0))
            .map_err(|e| Error::statement(sql, e))?;
        Ok(count > 0)
    }

    fn constraint_exists(&self, name: &str) -> Result<bool> {
        let sql = format!("SELECT name FROM {} WHERE name = ?1", CATALOG_TABLE);
        let found: Option<String> = self
            .conn
            .query_row(&sql, [name], |row| row.get(0))
            .optional()
            .map_err(|e| Error::statement(sql.as_str(), e))?;
        Ok(found.is_some())
    }

    fn read_constraints(&self, table: &str) -> Result<Vec<ForeignKeyConstraint>> {
        let sql = triggers::select_sql();
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::statement(sql.as_str(), e))?;
        let rows = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::statement(sql.as_str(), e))?;

        rows.into_iter()
            .map(|(name, table, column, ref_table, ref_column, on_update, on_delete)| {
                Ok(ForeignKeyConstraint::new(name, table, column, ref_table, ref_column)
                    .with_on_update(ReferentialAction::from_str(&on_update)?)
                    .with_on_delete(ReferentialAction::from_str(&on_delete)?))
            })
            .collect()
    }

    /// Rows of `fk.table` whose key has no match in the referenced table.
    fn violations(&self, fk: &ForeignKeyConstraint) -> Result<u64> {
        let edge = RelationshipEdge::new(
            fk.table.as_str(),
            fk.column.as_str(),
            fk.referenced_table.as_str(),
            fk.referenced_column.as_str(),
        );
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            fk.table,
            build_orphaned_selection(&edge)
        );
        self.query_count(&sql)
    }
}

impl SqlExecutor for SqliteDatabase {
    fn execute(&self, sql: &str) -> Result<usize> {
        trace!(sql = %sql, "executing");
        self.conn
            .execute(sql, [])
            .map_err(|e| Error::statement(sql, e))
    }

    fn query_count(&self, sql: &str) -> Result<u64> {
        trace!(sql = %sql, "counting");
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| Error::statement(sql, e))?;
        Ok(count.max(0) as u64)
    }

    fn query_strings(&self, sql: &str) -> Result<Vec<String>> {
        trace!(sql = %sql, "querying");
        let mut stmt = self.conn.prepare(sql).map_err(|e| Error::statement(sql, e))?;
        let values = stmt
            .query_map([], |row| row.get::<_, Value>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::statement(sql, e))?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Value::Null => None,
                Value::Integer(i) => Some(i.to_string()),
                Value::Real(f) => Some(f.to_string()),
                Value::Text(s) => Some(s),
                Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
            })
            .collect())
    }

    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let sql = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";
        let mut stmt = self.conn.prepare(sql).map_err(|e| Error::statement(sql, e))?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::statement(sql, e))?;
        Ok(columns)
    }

    /// Opens the transaction and defers SQLite's own foreign key checks to
    /// commit, so declared `REFERENCES` clauses do not trip mid-run.
    fn begin(&self) -> Result<()> {
        debug!("BEGIN");
        self.run("BEGIN")?;
        self.run("PRAGMA defer_foreign_keys = ON")
    }

    fn commit(&self) -> Result<()> {
        debug!("COMMIT");
        self.run("COMMIT")
            .map_err(|e| Error::Transaction(format!("commit failed: {}", e)))
    }

    fn rollback(&self) -> Result<()> {
        debug!("ROLLBACK");
        self.run("ROLLBACK")
            .map_err(|e| Error::Transaction(format!("rollback failed: {}", e)))
    }

    fn truncate_statement(&self, table: &str) -> String {
        format!("DELETE FROM {}", table)
    }
}

impl ConstraintAdapter for SqliteDatabase {
    fn supports_foreign_keys(&self) -> bool {
        self.mode == ForeignKeyMode::Triggers
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyConstraint>> {
        if !self.supports_foreign_keys() || !self.catalog_exists()? {
            return Ok(Vec::new());
        }
        self.read_constraints(table)
    }

    fn add_foreign_key(&self, fk: &ForeignKeyConstraint) -> Result<()> {
        if !self.supports_foreign_keys() {
            return Ok(());
        }

        self.run(&triggers::catalog_ddl())?;
        if self.constraint_exists(&fk.name)? {
            debug!(name = %fk.name, "foreign key already present");
            return Ok(());
        }

        let violations = self.violations(fk)?;
        if violations > 0 {
            return Err(Error::ConstraintRejected {
                constraint: fk.name.clone(),
                table: fk.table.clone(),
                column: fk.column.clone(),
                referenced_table: fk.referenced_table.clone(),
                reason: format!(
                    "{} row(s) reference a missing {}.{}",
                    violations, fk.referenced_table, fk.referenced_column
                ),
            });
        }

        for sql in triggers::create_trigger_sql(fk) {
            self.run(&sql)?;
        }

        let sql = triggers::insert_sql();
        self.conn
            .execute(
                &sql,
                params![
                    fk.name,
                    fk.table,
                    fk.column,
                    fk.referenced_table,
                    fk.referenced_column,
                    fk.on_update.as_sql(),
                    fk.on_delete.as_sql(),
                ],
            )
            .map_err(|e| Error::statement(sql.as_str(), e))?;

        debug!(name = %fk.name, table = %fk.table, "added foreign key");
        Ok(())
    }

    fn drop_foreign_key(&self, fk: &ForeignKeyConstraint) -> Result<()> {
        if !self.supports_foreign_keys() {
            return Ok(());
        }

        for trigger in triggers::trigger_names(&fk.name) {
            self.run(&format!("DROP TRIGGER IF EXISTS {}", trigger))?;
        }

        if !self.catalog_exists()? {
            return Ok(());
        }

        let sql = format!("DELETE FROM {} WHERE name = ?1", CATALOG_TABLE);
        self.conn
            .execute(&sql, [fk.name.as_str()])
            .map_err(|e| Error::statement(sql.as_str(), e))?;

        // Leave no registry behind once the last constraint is gone.
        let remaining = self.query_count(&format!("SELECT COUNT(*) FROM {}", CATALOG_TABLE))?;
        if remaining == 0 {
            self.run(&format!("DROP TABLE {}", CATALOG_TABLE))?;
        }

        debug!(name = %fk.name, table = %fk.table, "dropped foreign key");
        Ok(())
    }
}
