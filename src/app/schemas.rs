//! Wire schemas for the Azure ML management API
//!
//! Read schemas are lenient: every field defaults when missing or `null`, so a
//! sparse response maps to zero values rather than a decode error. Write
//! schemas mirror the PUT bodies the API expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::app::models::{Dataset, Datastore, DatastoreAuth, DatastorePath, SystemData};
use crate::constants::aml;
use crate::errors::Result;

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Version resources carry their number in `name`, usually as a string
fn version_from_name<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let version = match value {
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        _ => 0,
    };
    Ok(version)
}

#[derive(Debug, Deserialize)]
struct ResourceList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemDataSchema {
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    created_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    created_by_type: String,
    #[serde(default)]
    last_modified_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    last_modified_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    last_modified_by_type: String,
}

impl From<SystemDataSchema> for SystemData {
    fn from(schema: SystemDataSchema) -> Self {
        Self {
            creation_date: schema.created_at,
            creation_user: schema.created_by,
            creation_user_type: schema.created_by_type,
            last_modified_date: schema.last_modified_at,
            last_modified_user: schema.last_modified_by,
            last_modified_user_type: schema.last_modified_by_type,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    client_secret: String,
    #[serde(default, deserialize_with = "null_as_default")]
    account_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    credentials_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    tenant_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    client_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    secret: SecretSchema,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatastoreContentsSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    contents_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    account_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    container_name: String,
    #[serde(default)]
    credentials: Option<CredentialsSchema>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatastorePropertiesSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    is_default: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    contents: DatastoreContentsSchema,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatastoreResource {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    properties: DatastorePropertiesSchema,
    #[serde(default)]
    system_data: Option<SystemDataSchema>,
}

impl From<DatastoreResource> for Datastore {
    fn from(resource: DatastoreResource) -> Self {
        let contents = resource.properties.contents;
        let auth = contents.credentials.map(|credentials| DatastoreAuth {
            credentials_type: credentials.credentials_type,
            tenant_id: credentials.tenant_id,
            client_id: credentials.client_id,
            client_secret: credentials.secret.client_secret,
            account_key: credentials.secret.account_key,
            sql_user_name: credentials.secret.user_id,
            sql_user_password: credentials.secret.password,
        });

        Self {
            id: resource.id,
            name: resource.name,
            is_default: resource.properties.is_default,
            description: resource.properties.description,
            storage_type: contents.contents_type,
            storage_account_name: contents.account_name,
            storage_container_name: contents.container_name,
            auth,
            system_data: Some(resource.system_data.unwrap_or_default().into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DatasetPathSchema {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetVersionPropertiesSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    datastore_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    paths: Vec<DatasetPathSchema>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetVersionResource {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "version_from_name")]
    name: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    properties: DatasetVersionPropertiesSchema,
    #[serde(default)]
    system_data: Option<SystemDataSchema>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedResource {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
}

/// Which slot of a dataset path entry to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
    File,
    Folder,
}

fn collect_datastore_paths(entries: &[DatasetPathSchema], kind: PathKind) -> Vec<DatastorePath> {
    entries
        .iter()
        .filter_map(|entry| match kind {
            PathKind::File => entry.file.as_deref(),
            PathKind::Folder => entry.folder.as_deref(),
        })
        .filter(|raw| DatastorePath::is_datastore_uri(raw))
        .filter_map(|raw| match raw.parse::<DatastorePath>() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping dataset path: {}", e);
                None
            }
        })
        .collect()
}

fn dataset_from_resource(dataset_name: &str, resource: DatasetVersionResource) -> Dataset {
    let paths = &resource.properties.paths;
    let file_paths = collect_datastore_paths(paths, PathKind::File);
    let directory_paths = collect_datastore_paths(paths, PathKind::Folder);

    Dataset {
        id: resource.id,
        name: dataset_name.to_string(),
        description: resource.properties.description,
        datastore_id: resource.properties.datastore_id,
        version: resource.name,
        file_paths,
        directory_paths,
        system_data: Some(resource.system_data.unwrap_or_default().into()),
    }
}

/// Parse a single datastore resource
pub fn parse_datastore(body: &str) -> Result<Datastore> {
    let resource: DatastoreResource = serde_json::from_str(body)?;
    Ok(resource.into())
}

/// Parse a `{"value": [...]}` list of datastore resources
pub fn parse_datastore_list(body: &str) -> Result<Vec<Datastore>> {
    let list: ResourceList<DatastoreResource> = serde_json::from_str(body)?;
    Ok(list.value.into_iter().map(Datastore::from).collect())
}

/// Parse a single dataset version resource belonging to `dataset_name`
pub fn parse_dataset_version(dataset_name: &str, body: &str) -> Result<Dataset> {
    let resource: DatasetVersionResource = serde_json::from_str(body)?;
    Ok(dataset_from_resource(dataset_name, resource))
}

/// Parse the list of versions of `dataset_name`
pub fn parse_dataset_versions(dataset_name: &str, body: &str) -> Result<Vec<Dataset>> {
    let list: ResourceList<DatasetVersionResource> = serde_json::from_str(body)?;
    Ok(list
        .value
        .into_iter()
        .map(|resource| dataset_from_resource(dataset_name, resource))
        .collect())
}

/// Parse the dataset container list into dataset names, preserving order
pub fn parse_dataset_names(body: &str) -> Result<Vec<String>> {
    let list: ResourceList<NamedResource> = serde_json::from_str(body)?;
    Ok(list.value.into_iter().map(|resource| resource.name).collect())
}

/// Envelope every PUT body is wrapped in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaWrapper<T> {
    pub properties: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteDatastoreSecretsSchema {
    pub secrets_type: String,
    #[serde(rename = "key", skip_serializing_if = "String::is_empty")]
    pub account_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    #[serde(rename = "password", skip_serializing_if = "String::is_empty")]
    pub sql_user_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteDatastoreCredentialsSchema {
    pub credentials_type: String,
    pub secrets: WriteDatastoreSecretsSchema,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub authority_url: String,
    #[serde(rename = "userId", skip_serializing_if = "String::is_empty")]
    pub sql_user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteDatastoreContentsSchema {
    pub contents_type: String,
    #[serde(rename = "accountName", skip_serializing_if = "String::is_empty")]
    pub storage_account_name: String,
    #[serde(rename = "containerName", skip_serializing_if = "String::is_empty")]
    pub storage_container_name: String,
    pub credentials: Option<WriteDatastoreCredentialsSchema>,
    pub endpoint: String,
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteDatastoreProperties {
    pub contents: WriteDatastoreContentsSchema,
    pub is_default: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteDatasetPathSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteDatasetProperties {
    pub description: String,
    pub paths: Vec<WriteDatasetPathSchema>,
}

/// Build the PUT body for a datastore
pub fn datastore_write_schema(datastore: &Datastore) -> SchemaWrapper<WriteDatastoreProperties> {
    let credentials = datastore
        .auth
        .as_ref()
        .map(|auth| WriteDatastoreCredentialsSchema {
            credentials_type: auth.credentials_type.clone(),
            secrets: WriteDatastoreSecretsSchema {
                secrets_type: auth.credentials_type.clone(),
                account_key: auth.account_key.clone(),
                client_secret: auth.client_secret.clone(),
                sql_user_password: auth.sql_user_password.clone(),
            },
            client_id: auth.client_id.clone(),
            tenant_id: auth.tenant_id.clone(),
            authority_url: String::new(),
            sql_user_name: auth.sql_user_name.clone(),
        });

    SchemaWrapper {
        properties: WriteDatastoreProperties {
            is_default: datastore.is_default,
            description: datastore.description.clone(),
            contents: WriteDatastoreContentsSchema {
                contents_type: datastore.storage_type.clone(),
                storage_account_name: datastore.storage_account_name.clone(),
                storage_container_name: datastore.storage_container_name.clone(),
                credentials,
                endpoint: aml::DEFAULT_STORAGE_ENDPOINT.to_string(),
                protocol: aml::DEFAULT_STORAGE_PROTOCOL.to_string(),
            },
        },
    }
}

/// Build the PUT body for a dataset version
pub fn dataset_write_schema(dataset: &Dataset) -> SchemaWrapper<WriteDatasetProperties> {
    let files = dataset.file_paths.iter().map(|path| WriteDatasetPathSchema {
        file: Some(path.to_string()),
        folder: None,
    });
    let folders = dataset
        .directory_paths
        .iter()
        .map(|path| WriteDatasetPathSchema {
            file: None,
            folder: Some(path.to_string()),
        });

    SchemaWrapper {
        properties: WriteDatasetProperties {
            description: dataset.description.clone(),
            paths: files.chain(folders).collect(),
        },
    }
}
