//! Domain types for workspace resources
//!
//! These are the typed views of datastores and datasets handed to callers.
//! JSON wire shapes live in [`crate::app::schemas`]; conversion happens there.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::aggregator::Versioned;
use crate::constants::aml;
use crate::errors::WorkspaceError;

/// Creation and modification metadata attached by the management API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemData {
    pub creation_date: Option<DateTime<Utc>>,
    pub creation_user: String,
    pub creation_user_type: String,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub last_modified_user: String,
    pub last_modified_user_type: String,
}

/// Credentials a datastore uses to reach its storage
///
/// Secrets are only populated when the API returns them, which it does not for
/// list/get calls; they are mostly useful on the write path.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreAuth {
    pub credentials_type: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub account_key: String,
    pub sql_user_name: String,
    pub sql_user_password: String,
}

impl fmt::Debug for DatastoreAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatastoreAuth")
            .field("credentials_type", &self.credentials_type)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("sql_user_name", &self.sql_user_name)
            .finish_non_exhaustive()
    }
}

/// A named reference to an external storage location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datastore {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub description: String,
    /// Contents type, e.g. `AzureBlob` or `AzureFile`
    pub storage_type: String,
    pub storage_account_name: String,
    pub storage_container_name: String,
    pub auth: Option<DatastoreAuth>,
    pub system_data: Option<SystemData>,
}

/// A path inside a datastore, rendered as `azureml://datastores/{name}/paths/{path}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatastorePath {
    pub datastore_name: String,
    pub path: String,
}

impl DatastorePath {
    pub fn new(datastore_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            datastore_name: datastore_name.into(),
            path: path.into(),
        }
    }

    /// Whether a raw path string claims to be a datastore path at all
    pub fn is_datastore_uri(raw: &str) -> bool {
        raw.starts_with(aml::DATASTORE_PATH_PREFIX)
    }
}

impl fmt::Display for DatastorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.strip_prefix('/').unwrap_or(&self.path);
        write!(
            f,
            "{}{}{}{}",
            aml::DATASTORE_PATH_PREFIX,
            self.datastore_name,
            aml::DATASTORE_PATH_SEPARATOR,
            path
        )
    }
}

impl FromStr for DatastorePath {
    type Err = WorkspaceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            WorkspaceError::invalid_argument(format!("malformed datastore path {:?}", raw))
        };

        let rest = raw
            .strip_prefix(aml::DATASTORE_PATH_PREFIX)
            .ok_or_else(malformed)?;
        let (datastore_name, path) = rest
            .split_once(aml::DATASTORE_PATH_SEPARATOR)
            .ok_or_else(malformed)?;

        if datastore_name.is_empty() || datastore_name.contains('/') {
            return Err(malformed());
        }

        Ok(Self::new(datastore_name, path))
    }
}

/// One version of a named, versioned collection of datastore paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub datastore_id: String,
    pub version: u32,
    pub file_paths: Vec<DatastorePath>,
    pub directory_paths: Vec<DatastorePath>,
    pub system_data: Option<SystemData>,
}

impl Dataset {
    /// Total number of file and directory paths
    pub fn path_count(&self) -> usize {
        self.file_paths.len() + self.directory_paths.len()
    }
}

impl Versioned for Dataset {
    fn version(&self) -> u32 {
        self.version
    }
}
