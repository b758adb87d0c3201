//! Application configuration, stored as TOML.
//!
//! ```toml
//! [query]
//! page_size = 25
//! request_interval_ms = 1000
//!
//! [output]
//! max_results = 10
//! min_score = 80
//! ```

use std::path::{Path, PathBuf};

use mblookup_query::QueryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Web service, paging and page-cache settings.
    pub query: QueryConfig,
    /// How results are presented.
    pub output: OutputConfig,
}

/// Result presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Maximum number of results printed per lookup.
    pub max_results: usize,
    /// Results scoring below this end the listing.
    pub min_score: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_score: 0,
        }
    }
}

impl LookupConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// `[query]` section fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| LookupError::Config(e.to_string()))?;
        config.query.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) for an existing file.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LookupError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/mblookup/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("mblookup").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("mblookup")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/mblookup-config/config.toml")
        }
    }
}
