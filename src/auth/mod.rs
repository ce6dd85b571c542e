//! Azure AD authentication for the management API
//!
//! # Examples
//!
//! ```rust,no_run
//! use azureml_workspace::auth::{ClientSecretCredential, Credentials, TokenProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::from_env();
//! let credential = ClientSecretCredential::from_credentials(&credentials)?;
//! let bearer = credential.token().await?;
//! # let _ = bearer;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod token;

// Re-export main public API
pub use credentials::{
    CredentialStatus, Credentials, get_credential_status, load_dotenv,
};
pub use token::{AccessToken, ClientSecretCredential, StaticTokenProvider, TokenProvider};
