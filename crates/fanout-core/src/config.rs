//! TOML configuration for fan-out runs.
//!
//! ```toml
//! tasks = 5
//! max_delay = 10.0
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{FanOutError, MaxDelay};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] FanOutError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FanOutConfig {
    /// Number of delay tasks per run.
    pub tasks: usize,
    /// Upper bound for each task's delay, in seconds.
    pub max_delay: f64,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            tasks: 5,
            max_delay: MaxDelay::DEFAULT_SECS,
        }
    }
}

impl FanOutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<MaxDelay, ConfigError> {
        Ok(MaxDelay::new(self.max_delay)?)
    }
}
