//! HTTP client for the Azure ML management API
//!
//! The workspace layer talks to Azure through two small traits:
//! [`ResourceClientFactory`] scopes a client to one resource group and
//! workspace, and [`ResourceClient`] performs GET, DELETE and PUT requests on
//! paths relative to that workspace. Production code uses
//! [`AmlClientFactory`]; tests substitute in-memory doubles.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with rate limiting and retries

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::auth::TokenProvider;
use crate::constants::aml;
use crate::errors::{Result, WorkspaceError};

pub mod config;
pub mod http;

// Re-export public types
pub use config::ClientConfig;

use http::HttpHandler;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Join segments into a workspace-relative path, percent-encoding each one
///
/// A segment never spills into the next one or into the query string:
/// `["datasets", "a/b?c"]` becomes `datasets/a%2Fb%3Fc`.
pub fn resource_path<I, S>(segments: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = Url::parse("resource:/").map_err(|e| WorkspaceError::InvalidUrl {
        url: "resource:/".to_string(),
        error: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| WorkspaceError::invalid_argument("resource paths need a hierarchical base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Performs requests against one workspace
///
/// Paths are relative to the workspace resource, e.g. `datasets/foo/versions`,
/// with every segment already percent-encoded (see [`resource_path`]).
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<RawResponse>;

    async fn delete(&self, path: &str) -> Result<RawResponse>;

    async fn put(&self, path: &str, body: &serde_json::Value) -> Result<RawResponse>;
}

/// Produces clients scoped to a resource group and workspace
pub trait ResourceClientFactory: Send + Sync {
    fn scoped(&self, resource_group: &str, workspace: &str) -> Result<Arc<dyn ResourceClient>>;
}

/// Builds [`AmlResourceClient`]s sharing one connection pool and rate limiter
pub struct AmlClientFactory {
    handler: Arc<HttpHandler>,
    token_provider: Arc<dyn TokenProvider>,
    subscription_id: String,
    base_url: String,
    api_version: String,
}

impl fmt::Debug for AmlClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmlClientFactory")
            .field("subscription_id", &self.subscription_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl AmlClientFactory {
    /// Create a factory for the given subscription
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError` if the configuration is invalid or the HTTP
    /// client cannot be built
    pub fn new(
        config: &ClientConfig,
        subscription_id: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let subscription_id = subscription_id.into();
        if subscription_id.trim().is_empty() {
            return Err(WorkspaceError::invalid_argument(
                "subscription id cannot be empty",
            ));
        }

        let client = config.build_http_client()?;
        let handler = HttpHandler::new(client, config.rate_limit_rps, config.max_retries)?;

        tracing::debug!(
            "Created management API client factory for subscription {}",
            subscription_id
        );

        Ok(Self {
            handler: Arc::new(handler),
            token_provider,
            subscription_id,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        })
    }

    /// URL of the workspace resource all relative paths hang off
    pub fn workspace_url(&self, resource_group: &str, workspace: &str) -> Result<Url> {
        let path = resource_path(
            [
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                resource_group,
                "providers",
            ]
            .into_iter()
            .chain(aml::WORKSPACE_PROVIDER.split('/'))
            .chain([workspace]),
        )?;
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| WorkspaceError::InvalidUrl {
            url: raw,
            error: e.to_string(),
        })
    }
}

impl ResourceClientFactory for AmlClientFactory {
    fn scoped(&self, resource_group: &str, workspace: &str) -> Result<Arc<dyn ResourceClient>> {
        if resource_group.trim().is_empty() || workspace.trim().is_empty() {
            return Err(WorkspaceError::invalid_argument(
                "resource group and workspace name cannot be empty",
            ));
        }
        let workspace_url = self.workspace_url(resource_group, workspace)?;
        Ok(Arc::new(AmlResourceClient {
            handler: Arc::clone(&self.handler),
            token_provider: Arc::clone(&self.token_provider),
            workspace_url,
            api_version: self.api_version.clone(),
        }))
    }
}

/// Management API client scoped to one workspace
pub struct AmlResourceClient {
    handler: Arc<HttpHandler>,
    token_provider: Arc<dyn TokenProvider>,
    workspace_url: Url,
    api_version: String,
}

impl fmt::Debug for AmlResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmlResourceClient")
            .field("workspace_url", &self.workspace_url.as_str())
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl AmlResourceClient {
    /// Absolute URL for a workspace-relative path, with the API version attached
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.workspace_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| WorkspaceError::InvalidUrl {
            url: raw.clone(),
            error: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse> {
        let url = self.url_for(path)?;
        let token = self.token_provider.token().await?;
        tracing::info!("{} > {}", method, url);
        self.handler.execute(method, &url, &token, body).await
    }
}

#[async_trait]
impl ResourceClient for AmlResourceClient {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.send(Method::GET, path, None).await
    }

    async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.send(Method::DELETE, path, None).await
    }

    async fn put(&self, path: &str, body: &serde_json::Value) -> Result<RawResponse> {
        self.send(Method::PUT, path, Some(body)).await
    }
}
