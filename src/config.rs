use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Constructor-time options for the standard middleware set.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// origin = "https://example.com"
/// methods = "GET, POST"
/// min_length = 512
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub origin: String,
    /// Value of `Access-Control-Allow-Methods`, omitted when unset.
    pub methods: Option<String>,
    /// Smallest body, in bytes, worth compressing.
    pub min_length: usize,

    pub cors: bool,
    pub gzip: bool,
    pub clean_path: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
            methods: None,
            min_length: 200,

            cors: true,
            gzip: true,
            clean_path: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl MiddlewareConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<MiddlewareConfig>(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Like [`load`](Self::load), but falls back to the default config when
    /// the file is missing or invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "falling back to default middleware config");
                MiddlewareConfig::default()
            }
        }
    }
}
