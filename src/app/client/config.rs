//! HTTP client configuration and building logic
//!
//! Durations are written in humantime form in the config file
//! (`request_timeout = "60s"`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{aml, http, limits};
use crate::errors::{ConfigError, ConfigResult, Result};

/// Configuration for the management API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Management API host
    pub base_url: String,
    /// Value of the `api-version` query parameter
    pub api_version: String,
    /// TCP keep-alive settings
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of connections per host
    pub pool_max_per_host: usize,
    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Retries for throttled, overloaded or failed requests
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: aml::MANAGEMENT_BASE_URL.to_string(),
            api_version: aml::API_VERSION.to_string(),
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            max_retries: limits::MAX_RETRIES,
        }
    }
}

impl ClientConfig {
    /// Validate configuration values and return errors for invalid settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be non-zero".to_string(),
            });
        }

        if self.max_retries > limits::MAX_RETRIES_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "client.max_retries".to_string(),
                value: self.max_retries.to_string(),
                reason: format!(
                    "At most {} retries are allowed",
                    limits::MAX_RETRIES_CEILING
                ),
            });
        }

        if let Err(e) = Url::parse(&self.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "client.base_url".to_string(),
                value: self.base_url.clone(),
                reason: e.to_string(),
            });
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "client.api_version".to_string(),
                value: self.api_version.clone(),
                reason: "API version cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> Result<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        Ok(client_builder.build()?)
    }
}
