//! Aggregator configuration
//!
//! Follows the same shape as the other configuration structs in the crate:
//! a serde-friendly struct with defaults, a `validate()` method and a builder.

use serde::{Deserialize, Serialize};

use crate::constants::aggregator;
use crate::errors::{ConfigError, ConfigResult};

/// What to do when a dataset exists but has no versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyVersionPolicy {
    /// Resolve the dataset to a zero-value placeholder entry
    #[default]
    Placeholder,
    /// Fail the whole aggregation with a `NoVersions` error
    Reject,
}

/// Configuration for latest-version aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Maximum number of version fetches in flight at once
    pub worker_count: usize,
    /// Handling of datasets with an empty version list
    pub empty_versions: EmptyVersionPolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            worker_count: aggregator::DEFAULT_WORKER_COUNT,
            empty_versions: EmptyVersionPolicy::default(),
        }
    }
}

impl AggregatorConfig {
    /// Validate configuration values and return errors for invalid settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "aggregator.worker_count".to_string(),
                value: self.worker_count.to_string(),
                reason: "Worker count cannot be zero".to_string(),
            });
        }

        if self.worker_count > aggregator::MAX_WORKER_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "aggregator.worker_count".to_string(),
                value: self.worker_count.to_string(),
                reason: format!("Worker count exceeds maximum ({})", aggregator::MAX_WORKER_COUNT),
            });
        }

        Ok(())
    }
}

/// Builder for AggregatorConfig
#[derive(Debug, Default)]
pub struct AggregatorConfigBuilder {
    config: AggregatorConfig,
}

impl AggregatorConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker budget
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Set the empty-version policy
    pub fn empty_versions(mut self, policy: EmptyVersionPolicy) -> Self {
        self.config.empty_versions = policy;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<AggregatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
