//! Application constants for the Azure ML workspace client
//!
//! This module centralizes all constants used throughout the crate,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for credentials
pub mod env {
    /// Service principal application (client) id
    pub const CLIENT_ID: &str = "AZURE_CLIENT_ID";

    /// Service principal client secret
    pub const CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

    /// Azure AD tenant id
    pub const TENANT_ID: &str = "AZURE_TENANT_ID";

    /// Subscription holding the workspaces
    pub const SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
}

/// Azure AD authentication constants
pub mod auth {
    use super::Duration;

    /// Authority host; the tenant id is appended as a path segment
    pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

    /// OAuth scope granting access to the management API
    pub const DEFAULT_AML_OAUTH_SCOPE: &str = "https://management.azure.com/.default";

    /// Tokens closer than this to expiry are re-acquired instead of reused
    pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);
}

/// Azure ML management API
pub mod aml {
    /// API version sent as the `api-version` query parameter
    pub const API_VERSION: &str = "2021-10-01";

    /// Management API host
    pub const MANAGEMENT_BASE_URL: &str = "https://management.azure.com";

    /// Provider segment of every workspace-scoped URL
    pub const WORKSPACE_PROVIDER: &str = "Microsoft.MachineLearningServices/workspaces";

    /// Prefix of dataset paths that point into a datastore
    pub const DATASTORE_PATH_PREFIX: &str = "azureml://datastores/";

    /// Separator between datastore name and path inside a datastore path
    pub const DATASTORE_PATH_SEPARATOR: &str = "/paths/";

    /// Storage endpoint written into datastore PUT bodies
    pub const DEFAULT_STORAGE_ENDPOINT: &str = "core.windows.net";

    /// Storage protocol written into datastore PUT bodies
    pub const DEFAULT_STORAGE_PROTOCOL: &str = "https";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("azureml-workspace-rs/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 10;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for management API requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 20;

    /// Maximum retry attempts for throttled or failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;

    /// Upper bound accepted for `client.max_retries`
    pub const MAX_RETRIES_CEILING: u32 = 10;

    /// Longest single backoff delay (milliseconds)
    pub const MAX_RETRY_DELAY_MS: u64 = 60_000;
}

/// Latest-version aggregation
pub mod aggregator {
    /// Default number of dataset version fetches allowed in flight
    pub const DEFAULT_WORKER_COUNT: usize = 5;

    /// Upper bound accepted by configuration validation
    pub const MAX_WORKER_COUNT: usize = 32;
}

/// Configuration file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "azureml-workspace";

    /// Configuration file name
    pub const FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use aggregator::DEFAULT_WORKER_COUNT;
pub use aml::API_VERSION;
pub use http::USER_AGENT;
pub use limits::DEFAULT_RATE_LIMIT_RPS;
