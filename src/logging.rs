//! Logging setup
//!
//! The library itself only emits `tracing` events. Applications that want
//! them on stderr can install the formatter here; `RUST_LOG` directives are
//! honored on top of the configured level.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{ConfigError, ConfigResult};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level applied to this crate's events
    pub level: String,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            colored_output: true,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        Level::from_str(&self.level).map_err(|_| ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            value: self.level.clone(),
            reason: "Expected one of trace, debug, info, warn, error".to_string(),
        })?;
        Ok(())
    }
}

/// Install a stderr subscriber at `debug` or `info` level for this crate
///
/// Safe to call more than once; only the first call installs anything.
pub fn init(debug: bool) {
    let config = LoggingConfig {
        level: if debug { "debug" } else { "info" }.to_string(),
        ..Default::default()
    };
    init_with_config(&config);
}

/// Install a stderr subscriber configured from `config`
pub fn init_with_config(config: &LoggingConfig) {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let filter = match format!("azureml_workspace={}", level).parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.colored_output)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logging initialized at {} level", level);
    }
}
