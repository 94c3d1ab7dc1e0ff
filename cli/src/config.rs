//! Project configuration read from `bwire.toml`.
//!
//! ```toml
//! schema = "schema/shapes.wire"  # schema source, default "schema.wire"
//! output_dir = "generated"       # where `generate` writes, default "."
//! ```
//!
//! Relative paths are resolved against the directory holding the file,
//! which is also the working directory flags are resolved against.
//! Command-line flags take precedence over both keys.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "bwire.toml";
pub const DEFAULT_SCHEMA: &str = "schema.wire";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid {}: {source}", .path.display())]
    Parse {
        path:   PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub schema:     Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `bwire.toml` from `dir`. A missing file gives the defaults.
    pub fn load(dir: &Path) -> Result<Config, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let mut config: Config =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })?;

        config.schema = config.schema.map(|p| dir.join(p));
        config.output_dir = config.output_dir.map(|p| dir.join(p));
        Ok(config)
    }

    /// The schema to read: `flag`, else the configured path, else
    /// `schema.wire` in `dir`.
    pub fn schema_path(&self, dir: &Path, flag: Option<PathBuf>) -> PathBuf {
        flag.map(|p| dir.join(p))
            .or_else(|| self.schema.clone())
            .unwrap_or_else(|| dir.join(DEFAULT_SCHEMA))
    }

    pub fn output_dir(&self, dir: &Path, flag: Option<PathBuf>) -> PathBuf {
        flag.map(|p| dir.join(p))
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| dir.to_path_buf())
    }
}
