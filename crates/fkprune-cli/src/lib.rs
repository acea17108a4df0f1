//! fkprune command-line tool.
//!
//! Loads a JSON config describing the model layer and the pruning options,
//! then runs one pruning pass over a SQLite database.

pub mod args;
pub mod config;
pub mod error;
pub mod report;

pub use args::Args;
pub use config::CliConfig;
pub use error::CliError;
pub use report::format_report;

use fkprune_core::{CatalogReflection, PruneReport, Pruner};
use fkprune_sqlite::SqliteDatabase;
use tracing::info;

/// Run a pruning pass as described by `args`.
pub fn run(args: &Args) -> Result<PruneReport, CliError> {
    let file = CliConfig::load(&args.config)?;
    let catalog = file.catalog()?;
    let config = args.apply(file.prune);

    if !args.database.exists() {
        return Err(CliError::MissingDatabase(args.database.clone()));
    }
    let db = SqliteDatabase::open(&args.database)
        .map_err(|source| CliError::OpenDatabase {
            path: args.database.clone(),
            source,
        })?
        .with_foreign_key_mode(args.foreign_key_mode());

    info!(
        database = %args.database.display(),
        models = catalog.models().len(),
        "database opened"
    );

    let reflection = CatalogReflection::new(&catalog, &db);
    let mut pruner = Pruner::new(&db, &reflection, config)?;
    Ok(pruner.prune()?)
}
