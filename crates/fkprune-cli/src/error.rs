//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this tool.
    #[error("invalid config {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The database file does not exist.
    #[error("database not found: {}", .0.display())]
    MissingDatabase(PathBuf),

    /// The database could not be opened.
    #[error("failed to open database {}: {source}", path.display())]
    OpenDatabase {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Pruning failed.
    #[error(transparent)]
    Prune(#[from] fkprune_core::Error),
}
