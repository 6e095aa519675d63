//! Audit logging configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the audit interceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether audit events are recorded at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Whether to include SQL text in events.
    #[serde(default = "default_log_queries")]
    pub log_queries: bool,

    /// Whether to include the number of bound arguments.
    #[serde(default)]
    pub log_args: bool,

    /// Whether to record one event per fetched row (very verbose).
    #[serde(default)]
    pub log_rows: bool,

    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Storage backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// File path (for file backend).
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Discard events.
    Null,
    /// Print JSON lines to stdout.
    #[default]
    Console,
    /// Keep events in memory (tests, short-lived tools).
    Memory,
    /// Append JSON lines to a file.
    File,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            log_queries: default_log_queries(),
            log_args: false,
            log_rows: false,
            storage: StorageConfig::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_log_queries() -> bool {
    true
}
