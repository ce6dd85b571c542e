//! Core application logic for the Azure ML workspace client
//!
//! This module contains the management API client, the domain models and
//! their JSON mapping, the concurrent latest-version aggregator and the
//! workspace facade that ties them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use azureml_workspace::app::{AmlClientFactory, ClientConfig, Workspace};
//! use azureml_workspace::auth::ClientSecretCredential;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = ClientSecretCredential::new("tenant", "client-id", "client-secret")?;
//! let factory = AmlClientFactory::new(&ClientConfig::default(), "subscription", Arc::new(credential))?;
//! let workspace = Workspace::new(Arc::new(factory));
//!
//! let next = workspace
//!     .get_dataset_next_version("my-rg", "my-workspace", "training-data")
//!     .await?;
//! println!("next version: {}", next);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod client;
pub mod models;
pub mod schemas;
pub mod workspace;

// Re-export main public API
pub use aggregator::{
    AggregatorConfig, AggregatorConfigBuilder, DatasetNameLister, EmptyVersionPolicy,
    LatestVersionAggregator, VersionFetcher, Versioned, select_latest,
};
pub use client::{
    AmlClientFactory, AmlResourceClient, ClientConfig, RawResponse, ResourceClient,
    ResourceClientFactory, resource_path,
};
pub use models::{Dataset, Datastore, DatastoreAuth, DatastorePath, SystemData};
pub use workspace::{ScopedDatasets, Workspace, next_version};
