//! SQLite backend for fkprune.
//!
//! [`SqliteDatabase`] implements both collaborator traits of the pruning
//! engine over a `rusqlite` connection.

mod database;
mod triggers;

pub use database::{ForeignKeyMode, SqliteDatabase};
pub use triggers::CATALOG_TABLE;
