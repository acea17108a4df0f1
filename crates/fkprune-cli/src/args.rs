//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use fkprune_core::PruneConfig;
use fkprune_sqlite::ForeignKeyMode;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "fkprune=info";

/// Command-line arguments for `fkprune`.
#[derive(Parser, Debug)]
#[command(name = "fkprune")]
#[command(version, about = "Prune rows from a SQLite database without leaving orphans", long_about = None)]
pub struct Args {
    /// Path to the SQLite database file.
    #[arg(short, long)]
    pub database: PathBuf,

    /// Path to the JSON config file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Skip the foreign key sanity check.
    #[arg(long)]
    pub no_sanity_check: bool,

    /// Fail if deleting takes more passes than this.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Treat the database as having no foreign key support.
    #[arg(long)]
    pub no_foreign_keys: bool,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Apply command-line overrides to the file's pruning options.
    pub fn apply(&self, mut config: PruneConfig) -> PruneConfig {
        if self.no_sanity_check {
            config.perform_sanity_check = false;
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = Some(max);
        }
        config
    }

    pub fn foreign_key_mode(&self) -> ForeignKeyMode {
        if self.no_foreign_keys {
            ForeignKeyMode::Unsupported
        } else {
            ForeignKeyMode::Triggers
        }
    }

    /// Log filter implied by `-v`.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => DEFAULT_LOG_FILTER,
            1 => "fkprune=debug",
            _ => "fkprune=trace",
        }
    }
}
