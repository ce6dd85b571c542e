//! Bearer token acquisition for the management API
//!
//! `ClientSecretCredential` runs the OAuth2 client-credentials flow against
//! Azure AD and caches the resulting token. A cached token is handed out
//! silently until it comes within the refresh margin of its expiry, at which
//! point the next caller re-acquires it.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use super::credentials::Credentials;
use crate::constants::{auth, http};
use crate::errors::{AuthError, AuthResult};

/// Source of bearer tokens for management API requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token valid for at least the refresh margin
    async fn token(&self) -> AuthResult<String>;
}

/// An access token and the instant it stops being valid
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Instant,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            expires_at: Instant::now() + lifetime,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether the token stays valid for longer than `margin`
    pub fn is_fresh(&self, margin: Duration) -> bool {
        self.expires_at
            .checked_duration_since(Instant::now())
            .is_some_and(|remaining| remaining > margin)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Decode the identity endpoint's token response
pub(crate) fn parse_token_response(body: &str) -> AuthResult<AccessToken> {
    let response: TokenResponse =
        serde_json::from_str(body).map_err(|e| AuthError::MalformedToken {
            reason: e.to_string(),
        })?;

    if response.access_token.is_empty() {
        return Err(AuthError::MalformedToken {
            reason: "response carries no access_token".to_string(),
        });
    }

    Ok(AccessToken::new(
        response.access_token,
        Duration::from_secs(response.expires_in),
    ))
}

/// OAuth2 client-credentials flow for a service principal
pub struct ClientSecretCredential {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    refresh_margin: Duration,
    cache: RwLock<Option<AccessToken>>,
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ClientSecretCredential {
    /// Create a credential against the public Azure AD authority
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if any of the three values is blank
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> AuthResult<Self> {
        Self::with_authority(auth::AUTHORITY_HOST, tenant_id, client_id, client_secret)
    }

    /// Create a credential from loaded configuration
    pub fn from_credentials(credentials: &Credentials) -> AuthResult<Self> {
        credentials.require_service_principal()?;
        Self::new(
            credentials.tenant_id.clone(),
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
        )
    }

    /// Create a credential against a specific authority host
    pub fn with_authority(
        authority_host: &str,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> AuthResult<Self> {
        let tenant_id = tenant_id.into();
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if tenant_id.trim().is_empty()
            || client_id.trim().is_empty()
            || client_secret.trim().is_empty()
        {
            return Err(AuthError::MissingCredentials);
        }

        let raw = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        );
        let token_url = Url::parse(&raw).map_err(|e| AuthError::InvalidSetup {
            reason: format!("invalid token endpoint {}: {}", raw, e),
        })?;

        let client = Client::builder()
            .timeout(http::DEFAULT_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .user_agent(http::USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            token_url,
            client_id,
            client_secret,
            scope: auth::DEFAULT_AML_OAUTH_SCOPE.to_string(),
            refresh_margin: auth::TOKEN_REFRESH_MARGIN,
            cache: RwLock::new(None),
        })
    }

    /// Endpoint tokens are requested from
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    async fn acquire(&self) -> AuthResult<AccessToken> {
        tracing::debug!("Requesting token from {}", self.token_url);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];
        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::TokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        let token = parse_token_response(&body)?;
        tracing::info!("Acquired management API token for client {}", self.client_id);
        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for ClientSecretCredential {
    async fn token(&self) -> AuthResult<String> {
        {
            let cached = self.cache.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(self.refresh_margin)) {
                return Ok(token.secret().to_string());
            }
        }

        let mut cached = self.cache.write().await;
        // another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(self.refresh_margin)) {
            return Ok(token.secret().to_string());
        }

        let token = self.acquire().await?;
        let secret = token.secret().to_string();
        *cached = Some(token);
        Ok(secret)
    }
}

/// Hands out a fixed token; for pre-acquired tokens and tests
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticTokenProvider(***)")
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> AuthResult<String> {
        Ok(self.token.clone())
    }
}
