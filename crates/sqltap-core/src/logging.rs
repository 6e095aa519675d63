//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LoggingConfig};

/// Install a global `fmt` subscriber filtered by `config.filter`.
///
/// Returns `Ok(false)` when a global subscriber was already installed, which
/// makes it safe to call from every test.
pub fn init(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| ConfigError::Config(format!("invalid log filter '{}': {}", config.filter, e)))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .is_ok();

    Ok(installed)
}
