use std::path::{Path, PathBuf};

use config_file::FromConfigFile;
use log::debug;
use serde::Deserialize;

use crate::error::ConfigError;

/// Hold information read from the TOML configuration file.
///
/// The table file carries no dimensions, so `n_states` and `n_actions` must
/// match the ones used when the table was written.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub n_states: usize,
    pub n_actions: usize,
    /// Where `derive --debug` writes its sanity files.
    #[serde(default = "default_debug_dir")]
    pub debug_dir: PathBuf,
    /// Decimal places in tensor dumps.
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Values per row segment in tensor dumps.
    #[serde(default = "default_columns")]
    pub columns: usize,
}

fn default_debug_dir() -> PathBuf {
    PathBuf::from("debug")
}

fn default_precision() -> usize {
    4
}

fn default_columns() -> usize {
    20
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<ToolConfig, ConfigError> {
        debug!("Reading config file: {}", path.display());
        let config = ToolConfig::from_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_states == 0 {
            return Err(ConfigError::Invalid("n_states must be at least 1".into()));
        }
        if self.n_actions == 0 {
            return Err(ConfigError::Invalid("n_actions must be at least 1".into()));
        }
        if self.columns == 0 {
            return Err(ConfigError::Invalid("columns must be at least 1".into()));
        }
        Ok(())
    }
}
