//! Concurrent latest-version resolution for datasets
//!
//! Given the names of every dataset in a workspace, the aggregator resolves
//! each one to its highest version by spawning one tokio task per name. Tasks
//! pass a semaphore sized to the worker budget before fetching, so the number
//! of fetches in flight never exceeds it. The first fetch error cancels every
//! task that has not started its fetch yet. The call only returns once every
//! task has finished.
//!
//! # Module Organization
//!
//! - [`config`] - Worker budget and empty-version policy
//! - [`selection`] - Picking the latest entry out of a version list
//! - [`signal`] - Per-call cancellation signal shared by the tasks
//! - [`core`] - Gated fan-out and fan-in
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use azureml_workspace::app::aggregator::{
//!     AggregatorConfig, LatestVersionAggregator, VersionFetcher, Versioned,
//! };
//!
//! #[derive(Debug, Default)]
//! struct Release(u32);
//!
//! impl Versioned for Release {
//!     fn version(&self) -> u32 {
//!         self.0
//!     }
//! }
//!
//! struct Releases;
//!
//! #[async_trait]
//! impl VersionFetcher for Releases {
//!     type Version = Release;
//!     type Error = std::io::Error;
//!
//!     async fn fetch_versions(&self, _name: &str) -> Result<Vec<Release>, std::io::Error> {
//!         Ok(vec![Release(1), Release(2)])
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = LatestVersionAggregator::new(Arc::new(Releases), AggregatorConfig::default())?;
//! let latest = aggregator.resolve_latest_versions(["a", "b"]).await?;
//! assert_eq!(latest["a"].version(), 2);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

pub mod config;
pub mod core;
pub mod selection;
pub mod signal;


// Re-export main public API
pub use config::{AggregatorConfig, AggregatorConfigBuilder, EmptyVersionPolicy};
pub use core::LatestVersionAggregator;
pub use selection::{select_latest, Versioned};
pub use signal::CancellationSignal;

/// Fetches every version of a dataset by name
///
/// Implementations must be safe to call concurrently; each call is independent.
#[async_trait]
pub trait VersionFetcher: Send + Sync {
    /// One version record
    type Version: Versioned + Default + Send + 'static;
    /// Error surfaced unchanged by the aggregator
    type Error: Send + 'static;

    async fn fetch_versions(&self, dataset_name: &str)
        -> Result<Vec<Self::Version>, Self::Error>;
}

/// Lists the names of every dataset in a scope, in listing order
#[async_trait]
pub trait DatasetNameLister: Send + Sync {
    type Error: Send + 'static;

    async fn list_dataset_names(&self) -> Result<Vec<String>, Self::Error>;
}
