//! Trigger-backed named foreign keys.
//!
//! SQLite only accepts foreign keys inside `CREATE TABLE`, so a named
//! constraint is stored as a row of [`CATALOG_TABLE`] plus four triggers:
//!
//! - `<name>_ins` / `<name>_upd` reject child rows pointing at a missing key
//! - `<name>_del` applies the delete rule when a parent row goes away
//! - `<name>_pku` applies the update rule when a parent key changes
//!
//! `SET DEFAULT` is enforced like `RESTRICT`.

use fkprune_core::{ForeignKeyConstraint, ReferentialAction};

/// Registry of trigger-backed constraints.
pub const CATALOG_TABLE: &str = "fkprune_foreign_keys";

const TRIGGER_SUFFIXES: [&str; 4] = ["ins", "upd", "del", "pku"];

pub(crate) fn catalog_ddl() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {CATALOG_TABLE} (\
         name TEXT PRIMARY KEY, \
         table_name TEXT NOT NULL, \
         column_name TEXT NOT NULL, \
         foreign_table_name TEXT NOT NULL, \
         foreign_column_name TEXT NOT NULL, \
         update_rule TEXT NOT NULL, \
         delete_rule TEXT NOT NULL)"
    )
}

pub(crate) fn select_sql() -> String {
    format!(
        "SELECT name, table_name, column_name, foreign_table_name, foreign_column_name, \
         update_rule, delete_rule FROM {CATALOG_TABLE} WHERE table_name = ?1 ORDER BY name"
    )
}

pub(crate) fn insert_sql() -> String {
    format!(
        "INSERT INTO {CATALOG_TABLE} (name, table_name, column_name, foreign_table_name, \
         foreign_column_name, update_rule, delete_rule) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    )
}

pub(crate) fn trigger_names(constraint: &str) -> impl Iterator<Item = String> + '_ {
    TRIGGER_SUFFIXES
        .iter()
        .map(move |suffix| format!("{}_{}", constraint, suffix))
}

/// `CREATE TRIGGER` statements enforcing `fk`.
pub(crate) fn create_trigger_sql(fk: &ForeignKeyConstraint) -> Vec<String> {
    let name = &fk.name;
    let table = &fk.table;
    let column = &fk.column;
    let parent = &fk.referenced_table;
    let key = &fk.referenced_column;

    let missing_parent = |row: &str| {
        format!(
            "{row}.{column} IS NOT NULL AND NOT EXISTS \
             (SELECT 1 FROM {parent} WHERE {key} = {row}.{column})"
        )
    };
    let abort = |what: &str| {
        format!("SELECT RAISE(ABORT, '{what} on {table} violates foreign key constraint {name}');")
    };

    let mut statements = vec![
        format!(
            "CREATE TRIGGER {name}_ins AFTER INSERT ON {table} FOR EACH ROW \
             WHEN {} BEGIN {} END",
            missing_parent("NEW"),
            abort("insert")
        ),
        format!(
            "CREATE TRIGGER {name}_upd AFTER UPDATE OF {column} ON {table} FOR EACH ROW \
             WHEN {} BEGIN {} END",
            missing_parent("NEW"),
            abort("update")
        ),
    ];

    let referenced = format!("EXISTS (SELECT 1 FROM {table} WHERE {column} = OLD.{key})");
    let parent_abort = |what: &str| {
        format!(
            "SELECT RAISE(ABORT, '{what} on {parent} violates foreign key constraint {name}');"
        )
    };

    statements.push(match fk.on_delete {
        ReferentialAction::Cascade => format!(
            "CREATE TRIGGER {name}_del AFTER DELETE ON {parent} FOR EACH ROW \
             BEGIN DELETE FROM {table} WHERE {column} = OLD.{key}; END"
        ),
        ReferentialAction::SetNull => format!(
            "CREATE TRIGGER {name}_del AFTER DELETE ON {parent} FOR EACH ROW \
             BEGIN UPDATE {table} SET {column} = NULL WHERE {column} = OLD.{key}; END"
        ),
        _ => format!(
            "CREATE TRIGGER {name}_del BEFORE DELETE ON {parent} FOR EACH ROW \
             WHEN {referenced} BEGIN {} END",
            parent_abort("delete")
        ),
    });

    let key_changed = format!("OLD.{key} IS NOT NEW.{key}");
    statements.push(match fk.on_update {
        ReferentialAction::Cascade => format!(
            "CREATE TRIGGER {name}_pku AFTER UPDATE OF {key} ON {parent} FOR EACH ROW \
             WHEN {key_changed} \
             BEGIN UPDATE {table} SET {column} = NEW.{key} WHERE {column} = OLD.{key}; END"
        ),
        ReferentialAction::SetNull => format!(
            "CREATE TRIGGER {name}_pku AFTER UPDATE OF {key} ON {parent} FOR EACH ROW \
             WHEN {key_changed} \
             BEGIN UPDATE {table} SET {column} = NULL WHERE {column} = OLD.{key}; END"
        ),
        _ => format!(
            "CREATE TRIGGER {name}_pku BEFORE UPDATE OF {key} ON {parent} FOR EACH ROW \
             WHEN {key_changed} AND {referenced} BEGIN {} END",
            parent_abort("update")
        ),
    });

    statements
}
