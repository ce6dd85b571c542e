//! Service principal credentials
//!
//! Credentials come from the configuration file and the environment, in that
//! order of precedence (environment wins). A `.env` file in the working
//! directory is loaded into the environment first.

use std::env;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::env as env_constants;
use crate::errors::{AuthError, AuthResult};

/// Azure AD service principal plus the subscription it works in
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub subscription_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask(&self.client_secret))
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "***" }
}

impl Credentials {
    /// Read credentials from the environment only
    pub fn from_env() -> Self {
        let mut credentials = Self::default();
        credentials.apply_env();
        credentials
    }

    /// Overwrite fields with any non-empty environment variable
    pub fn apply_env(&mut self) {
        let overrides = [
            (env_constants::CLIENT_ID, &mut self.client_id),
            (env_constants::CLIENT_SECRET, &mut self.client_secret),
            (env_constants::TENANT_ID, &mut self.tenant_id),
            (env_constants::SUBSCRIPTION_ID, &mut self.subscription_id),
        ];
        for (key, field) in overrides {
            if let Ok(value) = env::var(key) {
                if !value.trim().is_empty() {
                    *field = value;
                }
            }
        }
    }

    /// Whether everything needed to acquire a token is present
    pub fn has_service_principal(&self) -> bool {
        !self.client_id.trim().is_empty()
            && !self.client_secret.trim().is_empty()
            && !self.tenant_id.trim().is_empty()
    }

    /// Fail with `MissingCredentials` unless a service principal is configured
    pub fn require_service_principal(&self) -> AuthResult<()> {
        if self.has_service_principal() {
            Ok(())
        } else {
            Err(AuthError::MissingCredentials)
        }
    }
}

/// Which credential variables are currently visible
#[derive(Debug, Clone)]
pub struct CredentialStatus {
    pub client_id_set: bool,
    pub client_secret_set: bool,
    pub tenant_id_set: bool,
    pub subscription_id_set: bool,
    /// Whether a .env file exists in the current directory
    pub dotenv_file_exists: bool,
}

impl CredentialStatus {
    pub fn has_credentials(&self) -> bool {
        self.client_id_set && self.client_secret_set && self.tenant_id_set
    }

    /// Get descriptive status message for display
    pub fn status_message(&self) -> String {
        let mut missing = Vec::new();
        if !self.client_id_set {
            missing.push(env_constants::CLIENT_ID);
        }
        if !self.client_secret_set {
            missing.push(env_constants::CLIENT_SECRET);
        }
        if !self.tenant_id_set {
            missing.push(env_constants::TENANT_ID);
        }
        if !self.subscription_id_set {
            missing.push(env_constants::SUBSCRIPTION_ID);
        }

        if missing.is_empty() {
            "Credentials configured".to_string()
        } else {
            format!("Missing credentials: {}", missing.join(", "))
        }
    }
}

/// Check which credentials are set in the environment
pub fn get_credential_status() -> CredentialStatus {
    let is_set = |key: &str| env::var(key).map(|v| !v.trim().is_empty()).unwrap_or(false);
    CredentialStatus {
        client_id_set: is_set(env_constants::CLIENT_ID),
        client_secret_set: is_set(env_constants::CLIENT_SECRET),
        tenant_id_set: is_set(env_constants::TENANT_ID),
        subscription_id_set: is_set(env_constants::SUBSCRIPTION_ID),
        dotenv_file_exists: Path::new(".env").exists(),
    }
}

/// Load a `.env` file from the working directory if there is one
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}
