//! Prelude module for the Azure ML workspace library
//!
//! Re-exports the items most integrations need, so a single
//! `use azureml_workspace::prelude::*;` is enough for typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use azureml_workspace::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = WorkspaceConfig::load(None).await?;
//!     init_logging(false);
//!
//!     let workspace = Workspace::from_config(&config)?;
//!     let datasets = workspace.get_datasets("my-rg", "my-workspace").await?;
//!     println!("{} datasets", datasets.len());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{Result, WorkspaceError};

// Workspace facade and domain types
pub use crate::app::{
    AggregatorConfig, ClientConfig, Dataset, Datastore, DatastoreAuth, DatastorePath,
    EmptyVersionPolicy, Workspace,
};

// Aggregation building blocks for custom fetchers
pub use crate::app::{LatestVersionAggregator, VersionFetcher, Versioned};

// Authentication
pub use crate::auth::{ClientSecretCredential, Credentials, TokenProvider};

// Configuration and logging
pub use crate::config::WorkspaceConfig;
pub use crate::logging::init as init_logging;

// Commonly used constants
pub use crate::constants::{API_VERSION, DEFAULT_WORKER_COUNT};

pub use std::sync::Arc;
