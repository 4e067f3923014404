//! Coordinator configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_ARCHIVE_NAME: &str = "duplicates.zip";
const DEFAULT_ARCHIVE_DIR: &str = "/Archives";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration for the batch action coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound for a single executor call in milliseconds (None = wait forever).
    #[builder(default = "Some(DEFAULT_TIMEOUT_MS)")]
    pub executor_timeout_ms: Option<u64>,

    /// Archive name used when the caller does not supply one.
    #[builder(default = "DEFAULT_ARCHIVE_NAME.to_string()")]
    pub default_archive_name: String,

    /// Folder that receives created archives.
    #[builder(default = "DEFAULT_ARCHIVE_DIR.to_string()")]
    pub archive_dir: String,

    /// Put files removed by the last action back into the group view on undo.
    #[builder(default = "true")]
    pub restore_groups_on_undo: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            executor_timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            default_archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            archive_dir: DEFAULT_ARCHIVE_DIR.to_string(),
            restore_groups_on_undo: true,
        }
    }
}

fn check(timeout_ms: Option<u64>, archive_name: Option<&str>) -> Result<(), String> {
    if timeout_ms == Some(0) {
        return Err("executor_timeout_ms must be greater than zero".to_string());
    }
    if archive_name.is_some_and(|n| n.trim().is_empty()) {
        return Err("default_archive_name cannot be empty".to_string());
    }
    Ok(())
}

impl CoordinatorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        check(
            self.executor_timeout_ms.flatten(),
            self.default_archive_name.as_deref(),
        )
    }
}

impl CoordinatorConfig {
    /// Create a new config builder.
    pub fn builder() -> CoordinatorConfigBuilder {
        CoordinatorConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        check(config.executor_timeout_ms, Some(&config.default_archive_name))
            .map_err(|message| ConfigError::Invalid { message })?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// The executor timeout as a duration.
    pub fn executor_timeout(&self) -> Option<Duration> {
        self.executor_timeout_ms.map(Duration::from_millis)
    }
}
