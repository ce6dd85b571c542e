//! Workspace facade over the Azure ML management API
//!
//! Every operation is scoped by a resource group and a workspace name. The
//! facade owns no connection state of its own; it asks its
//! [`ResourceClientFactory`] for a scoped client per call, so one `Workspace`
//! serves any number of workspaces in the subscription and can be cloned
//! freely across tasks.
//!
//! # Examples
//!
//! ```rust,no_run
//! use azureml_workspace::app::Workspace;
//! use azureml_workspace::config::WorkspaceConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkspaceConfig::load(None).await?;
//! let workspace = Workspace::from_config(&config)?;
//!
//! for dataset in workspace.get_datasets("my-rg", "my-workspace").await? {
//!     println!("{} v{}", dataset.name, dataset.version);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::app::aggregator::{AggregatorConfig, LatestVersionAggregator};
use crate::app::client::{
    resource_path, AmlClientFactory, ResourceClient, ResourceClientFactory,
};
use crate::app::models::{Dataset, Datastore};
use crate::app::schemas;
use crate::auth::ClientSecretCredential;
use crate::config::WorkspaceConfig;
use crate::errors::{Result, WorkspaceError};

pub mod fetcher;
mod responses;

#[cfg(test)]
mod tests;

pub use fetcher::ScopedDatasets;

use responses::{expect_accepted, expect_found, expect_ok};

/// Next version number to use after `versions`
///
/// One past the highest existing version, or 1 for a dataset with none.
pub fn next_version(versions: &[Dataset]) -> u32 {
    versions
        .iter()
        .map(|dataset| dataset.version)
        .max()
        .unwrap_or(0)
        + 1
}

/// Client for datastores and datasets of Azure ML workspaces
#[derive(Clone)]
pub struct Workspace {
    factory: Arc<dyn ResourceClientFactory>,
    aggregator_config: AggregatorConfig,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("aggregator_config", &self.aggregator_config)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Create a workspace over an arbitrary client factory
    pub fn new(factory: Arc<dyn ResourceClientFactory>) -> Self {
        Self {
            factory,
            aggregator_config: AggregatorConfig::default(),
        }
    }

    /// Replace the aggregation settings used by [`Workspace::get_datasets`]
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Config` if the settings do not validate
    pub fn with_aggregator_config(mut self, config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        self.aggregator_config = config;
        Ok(self)
    }

    /// Build a workspace talking to Azure with service principal credentials
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Auth` if the credentials are incomplete and
    /// `WorkspaceError::Config` if the configuration does not validate
    pub fn from_config(config: &WorkspaceConfig) -> Result<Self> {
        config.validate()?;
        let credential = ClientSecretCredential::from_credentials(&config.credentials)?;
        let factory = AmlClientFactory::new(
            &config.client,
            config.credentials.subscription_id.clone(),
            Arc::new(credential),
        )?;

        info!(
            "Created workspace client for subscription {}",
            config.credentials.subscription_id
        );

        Self::new(Arc::new(factory)).with_aggregator_config(config.aggregator.clone())
    }

    pub fn aggregator_config(&self) -> &AggregatorConfig {
        &self.aggregator_config
    }

    fn client(&self, resource_group: &str, workspace: &str) -> Result<Arc<dyn ResourceClient>> {
        self.factory.scoped(resource_group, workspace)
    }

    /// List every datastore of the workspace
    pub async fn get_datastores(
        &self,
        resource_group: &str,
        workspace: &str,
    ) -> Result<Vec<Datastore>> {
        let client = self.client(resource_group, workspace)?;
        let body = expect_ok(client.get("datastores").await?)?;
        schemas::parse_datastore_list(&body)
    }

    /// Get one datastore by name
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::ResourceNotFound` if the datastore does not exist
    pub async fn get_datastore(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
    ) -> Result<Datastore> {
        let client = self.client(resource_group, workspace)?;
        let response = client.get(&resource_path(["datastores", name])?).await?;
        let body = expect_found(response, "datastore", name)?;
        schemas::parse_datastore(&body)
    }

    /// Delete one datastore by name
    pub async fn delete_datastore(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
    ) -> Result<()> {
        let client = self.client(resource_group, workspace)?;
        let response = client
            .delete(&resource_path(["datastores", name])?)
            .await?;
        expect_found(response, "datastore", name)?;
        debug!("Deleted datastore {:?}", name);
        Ok(())
    }

    /// Create a datastore or replace the one with the same name
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::InvalidArgument` without sending anything if
    /// the datastore name is blank
    pub async fn create_or_update_datastore(
        &self,
        resource_group: &str,
        workspace: &str,
        datastore: &Datastore,
    ) -> Result<Datastore> {
        if datastore.name.trim().is_empty() {
            return Err(WorkspaceError::invalid_argument(
                "the datastore name cannot be empty",
            ));
        }

        let schema = serde_json::to_value(schemas::datastore_write_schema(datastore))?;
        let client = self.client(resource_group, workspace)?;
        let path = resource_path(["datastores", datastore.name.as_str()])?;
        let response = client.put(&path, &schema).await?;
        let body = expect_accepted(response)?;
        schemas::parse_datastore(&body)
    }

    /// Latest version of every dataset in the workspace, sorted by name
    ///
    /// Version lists are fetched concurrently within the configured worker
    /// budget. The first failure aborts the whole call and is returned as-is.
    pub async fn get_datasets(&self, resource_group: &str, workspace: &str) -> Result<Vec<Dataset>> {
        let client = self.client(resource_group, workspace)?;
        let datasets = Arc::new(ScopedDatasets::new(
            client,
            self.aggregator_config.empty_versions,
        ));
        let aggregator =
            LatestVersionAggregator::new(Arc::clone(&datasets), self.aggregator_config.clone())?;

        let latest = aggregator.resolve_all(datasets.as_ref()).await?;

        let mut result: Vec<Dataset> = latest
            .into_iter()
            .map(|(name, mut dataset)| {
                // placeholder entries for datasets without versions carry no name
                if dataset.name.is_empty() {
                    dataset.name = name;
                }
                dataset
            })
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    /// Get one version of a dataset
    pub async fn get_dataset(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
        version: u32,
    ) -> Result<Dataset> {
        let client = self.client(resource_group, workspace)?;
        let version_segment = version.to_string();
        let path = resource_path(["datasets", name, "versions", version_segment.as_str()])?;
        let response = client.get(&path).await?;
        let body = expect_ok(response)?;
        schemas::parse_dataset_version(name, &body)
    }

    /// Every version of a dataset, in listing order
    pub async fn get_dataset_versions(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
    ) -> Result<Vec<Dataset>> {
        let client = self.client(resource_group, workspace)?;
        fetcher::list_versions(client.as_ref(), name).await
    }

    /// Version number a new version of the dataset should use
    pub async fn get_dataset_next_version(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
    ) -> Result<u32> {
        let versions = self
            .get_dataset_versions(resource_group, workspace, name)
            .await?;
        Ok(next_version(&versions))
    }

    /// Create or replace the version `dataset.version` of a dataset
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::InvalidArgument` without sending anything if
    /// the name is blank or the dataset has no paths
    pub async fn create_or_update_dataset(
        &self,
        resource_group: &str,
        workspace: &str,
        dataset: &Dataset,
    ) -> Result<Dataset> {
        if dataset.name.trim().is_empty() {
            return Err(WorkspaceError::invalid_argument(
                "the dataset name cannot be empty",
            ));
        }
        if dataset.path_count() == 0 {
            return Err(WorkspaceError::invalid_argument(
                "the dataset must have at least one path",
            ));
        }

        let schema = serde_json::to_value(schemas::dataset_write_schema(dataset))?;
        let client = self.client(resource_group, workspace)?;
        let version_segment = dataset.version.to_string();
        let path = resource_path([
            "datasets",
            dataset.name.as_str(),
            "versions",
            version_segment.as_str(),
        ])?;
        let response = client.put(&path, &schema).await?;
        let body = expect_accepted(response)?;
        schemas::parse_dataset_version(&dataset.name, &body)
    }

    /// Delete a dataset together with all of its versions
    pub async fn delete_dataset(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
    ) -> Result<()> {
        let client = self.client(resource_group, workspace)?;
        expect_ok(client.delete(&resource_path(["datasets", name])?).await?)?;
        debug!("Deleted dataset {:?}", name);
        Ok(())
    }

    /// Delete a single version of a dataset
    pub async fn delete_dataset_version(
        &self,
        resource_group: &str,
        workspace: &str,
        name: &str,
        version: u32,
    ) -> Result<()> {
        let client = self.client(resource_group, workspace)?;
        let version_segment = version.to_string();
        let path = resource_path(["datasets", name, "versions", version_segment.as_str()])?;
        let response = client.delete(&path).await?;
        expect_ok(response)?;
        debug!("Deleted version {} of dataset {:?}", version, name);
        Ok(())
    }
}
