//! In-memory database double for unit tests.
//!
//! Row counts are scripted per `(table, predicate)`; deleting a criterion
//! zeroes its count and applies any scripted cascades. Constraint operations
//! mutate a live constraint list. Every statement and control call is
//! recorded in order.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::constraint::ForeignKeyConstraint;
use crate::error::{Error, Result};
use crate::executor::{ConstraintAdapter, SqlExecutor};

type Key = (String, String);

#[derive(Default)]
struct State {
    statements: Vec<String>,
    matches: HashMap<Key, u64>,
    cascades: HashMap<Key, Vec<(Key, u64)>>,
    fail_on: Vec<String>,
    strings: HashMap<String, Vec<String>>,
    columns: HashMap<String, Vec<String>>,
    constraints: Vec<ForeignKeyConstraint>,
    reject_constraints_on: Vec<String>,
}

pub(crate) struct FakeDatabase {
    state: Mutex<State>,
    supports_foreign_keys: bool,
}

fn key(table: &str, predicate: &str) -> Key {
    (table.to_string(), predicate.to_string())
}

impl FakeDatabase {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            supports_foreign_keys: true,
        }
    }

    pub(crate) fn without_foreign_keys(mut self) -> Self {
        self.supports_foreign_keys = false;
        self
    }

    pub(crate) fn with_matches(self, table: &str, predicate: &str, rows: u64) -> Self {
        self.state.lock().matches.insert(key(table, predicate), rows);
        self
    }

    /// Deleting `from` makes `rows` more rows match `to`.
    pub(crate) fn cascade(
        self,
        from_table: &str,
        from_predicate: &str,
        to_table: &str,
        to_predicate: &str,
        rows: u64,
    ) -> Self {
        self.state
            .lock()
            .cascades
            .entry(key(from_table, from_predicate))
            .or_default()
            .push((key(to_table, to_predicate), rows));
        self
    }

    /// Fail any statement or control call containing `fragment`.
    pub(crate) fn fail_on(self, fragment: &str) -> Self {
        self.state.lock().fail_on.push(fragment.to_string());
        self
    }

    pub(crate) fn with_strings(self, sql: &str, values: &[&str]) -> Self {
        self.state
            .lock()
            .strings
            .insert(sql.to_string(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub(crate) fn with_columns(self, table: &str, columns: &[&str]) -> Self {
        self.state
            .lock()
            .columns
            .insert(table.to_string(), columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub(crate) fn with_constraint(self, constraint: ForeignKeyConstraint) -> Self {
        self.state.lock().constraints.push(constraint);
        self
    }

    /// Refuse constraints added on `table`.
    pub(crate) fn reject_constraints_on(self, table: &str) -> Self {
        self.state.lock().reject_constraints_on.push(table.to_string());
        self
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    pub(crate) fn constraints(&self) -> Vec<ForeignKeyConstraint> {
        self.state.lock().constraints.clone()
    }

    fn record(&self, statement: String) -> Result<()> {
        let mut state = self.state.lock();
        let failed = state.fail_on.iter().any(|f| statement.contains(f.as_str()));
        state.statements.push(statement.clone());
        if failed {
            return Err(Error::statement(statement, "injected failure"));
        }
        Ok(())
    }
}

impl SqlExecutor for FakeDatabase {
    fn execute(&self, sql: &str) -> Result<usize> {
        self.record(sql.to_string())?;

        let Some((table, predicate)) = sql
            .strip_prefix("DELETE FROM ")
            .and_then(|rest| rest.split_once(" WHERE "))
        else {
            return Ok(0);
        };

        let mut state = self.state.lock();
        let deleted_key = key(table, predicate);
        let deleted = state.matches.insert(deleted_key.clone(), 0).unwrap_or(0);
        if deleted > 0 {
            let cascades = state.cascades.get(&deleted_key).cloned().unwrap_or_default();
            for (target, rows) in cascades {
                *state.matches.entry(target).or_default() += rows;
            }
        }
        Ok(deleted as usize)
    }

    fn query_count(&self, sql: &str) -> Result<u64> {
        self.record(sql.to_string())?;

        let count = sql
            .strip_prefix("SELECT COUNT(*) FROM ")
            .and_then(|rest| rest.split_once(" WHERE "))
            .and_then(|(table, predicate)| {
                self.state.lock().matches.get(&key(table, predicate)).copied()
            })
            .unwrap_or(0);
        Ok(count)
    }

    fn query_strings(&self, sql: &str) -> Result<Vec<String>> {
        self.record(sql.to_string())?;
        Ok(self.state.lock().strings.get(sql).cloned().unwrap_or_default())
    }

    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.state.lock().columns.get(table).cloned().unwrap_or_default())
    }

    fn begin(&self) -> Result<()> {
        self.record("BEGIN".to_string())
    }

    fn commit(&self) -> Result<()> {
        self.record("COMMIT".to_string())
    }

    fn rollback(&self) -> Result<()> {
        self.record("ROLLBACK".to_string())
    }
}

impl ConstraintAdapter for FakeDatabase {
    fn supports_foreign_keys(&self) -> bool {
        self.supports_foreign_keys
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyConstraint>> {
        Ok(self
            .state
            .lock()
            .constraints
            .iter()
            .filter(|c| c.table == table)
            .cloned()
            .collect())
    }

    fn add_foreign_key(&self, constraint: &ForeignKeyConstraint) -> Result<()> {
        self.record(format!("ADD CONSTRAINT {}", constraint.name))?;

        let mut state = self.state.lock();
        if state.reject_constraints_on.contains(&constraint.table) {
            return Err(Error::ConstraintRejected {
                constraint: constraint.name.clone(),
                table: constraint.table.clone(),
                column: constraint.column.clone(),
                referenced_table: constraint.referenced_table.clone(),
                reason: "existing rows violate the constraint".to_string(),
            });
        }
        if !state.constraints.iter().any(|c| c.name == constraint.name) {
            state.constraints.push(constraint.clone());
        }
        Ok(())
    }

    fn drop_foreign_key(&self, constraint: &ForeignKeyConstraint) -> Result<()> {
        self.record(format!("DROP CONSTRAINT {}", constraint.name))?;
        self.state
            .lock()
            .constraints
            .retain(|c| c.name != constraint.name);
        Ok(())
    }
}
