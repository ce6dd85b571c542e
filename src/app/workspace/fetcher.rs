//! Aggregator adapters for a single workspace
//!
//! `ScopedDatasets` lists dataset names and fetches version lists through a
//! resource client already scoped to one resource group and workspace, so the
//! aggregator only ever sees dataset names.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::responses::expect_ok;
use crate::app::aggregator::{DatasetNameLister, EmptyVersionPolicy, VersionFetcher};
use crate::app::client::{resource_path, ResourceClient};
use crate::app::models::Dataset;
use crate::app::schemas;
use crate::errors::{Result, WorkspaceError};

/// Fetch every version of `dataset_name`
pub(crate) async fn list_versions(
    client: &dyn ResourceClient,
    dataset_name: &str,
) -> Result<Vec<Dataset>> {
    let path = resource_path(["datasets", dataset_name, "versions"])?;
    let body = expect_ok(client.get(&path).await?)?;
    schemas::parse_dataset_versions(dataset_name, &body)
}

/// Fetch the names of every dataset, in listing order
pub(crate) async fn list_names(client: &dyn ResourceClient) -> Result<Vec<String>> {
    let body = expect_ok(client.get("datasets").await?)?;
    schemas::parse_dataset_names(&body)
}

/// Dataset listing and version fetching bound to one workspace
pub struct ScopedDatasets {
    client: Arc<dyn ResourceClient>,
    empty_versions: EmptyVersionPolicy,
}

impl ScopedDatasets {
    pub fn new(client: Arc<dyn ResourceClient>, empty_versions: EmptyVersionPolicy) -> Self {
        Self {
            client,
            empty_versions,
        }
    }
}

#[async_trait]
impl VersionFetcher for ScopedDatasets {
    type Version = Dataset;
    type Error = WorkspaceError;

    async fn fetch_versions(&self, dataset_name: &str) -> Result<Vec<Dataset>> {
        debug!("Fetching latest version of dataset {:?}", dataset_name);
        let versions = list_versions(self.client.as_ref(), dataset_name).await?;

        if versions.is_empty() && self.empty_versions == EmptyVersionPolicy::Reject {
            return Err(WorkspaceError::NoVersions {
                dataset: dataset_name.to_string(),
            });
        }

        Ok(versions)
    }
}

#[async_trait]
impl DatasetNameLister for ScopedDatasets {
    type Error = WorkspaceError;

    async fn list_dataset_names(&self) -> Result<Vec<String>> {
        list_names(self.client.as_ref()).await
    }
}
