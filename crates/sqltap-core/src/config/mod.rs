//! Configuration types for sqltap.
//!
//! Configuration is usually loaded from a single YAML file (`sqltap.yaml`)
//! and handed, together with the interceptor, to the middleware at setup
//! time. Every section is optional and falls back to its defaults.

pub mod audit;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use audit::{AuditConfig, StorageBackend, StorageConfig};

/// Default bound on the number of transparent rows wrappers that are followed
/// before giving up with a cycle error.
pub const DEFAULT_MAX_UNWRAP_DEPTH: usize = 32;

/// Complete sqltap configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SqltapConfig {
    /// Rows wrapper resolution.
    #[serde(default)]
    pub unwrap: UnwrapConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Audit interceptor.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Bounds for resolving rows wrappers down to the driver's own cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnwrapConfig {
    /// Maximum number of wrapper levels followed.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for UnwrapConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info,sqltap=trace`.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Include the emitting module path in each line.
    #[serde(default)]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            with_target: false,
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_UNWRAP_DEPTH
}

fn default_filter() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SqltapConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unwrap.max_depth == 0 {
            return Err(ConfigError::Config(
                "unwrap.max_depth must be at least 1".to_string(),
            ));
        }
        if self.audit.storage.backend == StorageBackend::File
            && self.audit.storage.file_path.is_none()
        {
            return Err(ConfigError::Config(
                "audit.storage.file_path is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}
