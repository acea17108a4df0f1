//! Config file loading.

use std::fs;
use std::path::Path;

use fkprune_core::{ModelCatalog, PruneConfig};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Contents of the JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Model definitions.
    pub models: ModelCatalog,

    /// Many-to-many pairs whose join models are added to the catalog.
    #[serde(default)]
    pub join_tables: Vec<(String, String)>,

    /// Pruning options.
    #[serde(default)]
    pub prune: PruneConfig,
}

impl CliConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The catalog with join models added.
    pub fn catalog(&self) -> Result<ModelCatalog, CliError> {
        let mut catalog = self.models.clone();
        for (left, right) in &self.join_tables {
            catalog = catalog.with_join_table(left, right)?;
        }
        Ok(catalog)
    }
}
