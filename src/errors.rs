//! Error types for the Azure ML workspace client
//!
//! Errors are split by concern the same way the rest of the crate is: credential
//! acquisition, configuration loading, and the workspace operations themselves.
//! Workspace errors returned by the REST layer are surfaced to callers as-is;
//! nothing in the crate re-wraps a transport failure once it has been produced.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Client id, client secret or tenant id is missing
    #[error(
        "Missing Azure credentials. Set AZURE_CLIENT_ID, AZURE_CLIENT_SECRET and AZURE_TENANT_ID or provide them in the config file"
    )]
    MissingCredentials,

    /// HTTP request to the identity endpoint failed
    #[error("HTTP request failed during token acquisition")]
    Http(#[from] reqwest::Error),

    /// Identity endpoint rejected the client credentials
    #[error("Token request rejected by identity provider [status code {status}]: {body}")]
    TokenRejected { status: u16, body: String },

    /// Token response could not be parsed
    #[error("Malformed token response: {reason}")]
    MalformedToken { reason: String },

    /// Rate limiter or client construction failed
    #[error("Invalid client setup: {reason}")]
    InvalidSetup { reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// I/O error while reading the configuration file
    #[error("Failed to read configuration file")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Errors produced by workspace operations
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Transport-level failure talking to the management API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The management API answered with a non-success status
    #[error("HTTP Response is in error [status code {status}]: {body}")]
    HttpResponse { status: StatusCode, body: String },

    /// The requested resource does not exist
    #[error("{resource_type} {name} not found")]
    ResourceNotFound { resource_type: String, name: String },

    /// A caller-supplied argument was rejected before any request was made
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A dataset has no versions and the aggregator was told to reject that
    #[error("Dataset {dataset} has no versions")]
    NoVersions { dataset: String },

    /// A response body could not be decoded
    #[error("Invalid JSON in response body: {0}")]
    Json(#[from] serde_json::Error),

    /// A request URL could not be built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Credential acquisition failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WorkspaceError {
    /// Create an invalid argument error with a message
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a not-found error for a resource of the given kind
    pub fn not_found(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Status code carried by the error, if the server produced one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WorkspaceError::HttpResponse { status, .. } => Some(*status),
            WorkspaceError::ResourceNotFound { .. } => Some(StatusCode::NOT_FOUND),
            WorkspaceError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            WorkspaceError::Http(e) => e.is_timeout() || e.is_connect(),
            WorkspaceError::HttpResponse { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            WorkspaceError::Auth(AuthError::Http(_)) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            WorkspaceError::Http(_) => "transport",
            WorkspaceError::HttpResponse { .. } => "http",
            WorkspaceError::ResourceNotFound { .. } => "not_found",
            WorkspaceError::InvalidArgument { .. } => "invalid_argument",
            WorkspaceError::NoVersions { .. } => "no_versions",
            WorkspaceError::Json(_) => "json",
            WorkspaceError::InvalidUrl { .. } => "url",
            WorkspaceError::Auth(_) => "authentication",
            WorkspaceError::Config(_) => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
