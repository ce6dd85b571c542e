//! Configuration management for the workspace client
//!
//! Configuration is assembled from three sources, lowest precedence first:
//! built-in defaults, a TOML file, and the `AZURE_*` environment variables
//! (after loading a `.env` file if one is present).
//!
//! ```toml
//! [credentials]
//! tenant_id = "..."
//! client_id = "..."
//! subscription_id = "..."
//!
//! [client]
//! request_timeout = "60s"
//! rate_limit_rps = 20
//!
//! [aggregator]
//! worker_count = 5
//! empty_versions = "placeholder"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::aggregator::AggregatorConfig;
use crate::app::client::ClientConfig;
use crate::auth::{load_dotenv, Credentials};
use crate::constants::config as config_constants;
use crate::errors::{ConfigError, ConfigResult};
use crate::logging::LoggingConfig;

/// Complete configuration for a [`Workspace`](crate::app::Workspace)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Service principal and subscription
    pub credentials: Credentials,
    /// HTTP client settings
    pub client: ClientConfig,
    /// Latest-version aggregation settings
    pub aggregator: AggregatorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl WorkspaceConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (`path`, or the user config file if it exists)
    /// 3. Environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicit `path` does not exist, or
    /// any parse or validation error
    pub async fn load(path: Option<PathBuf>) -> ConfigResult<Self> {
        load_dotenv();

        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::default_config_path().filter(|path| path.exists()),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.credentials.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Default config file location for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_constants::APP_DIR)
                .join(config_constants::FILE_NAME)
        })
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.client.validate()?;
        self.aggregator.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
