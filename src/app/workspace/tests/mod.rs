//! Tests for the workspace facade
//!
//! A recording resource client answers requests from a route table keyed by
//! `"<METHOD> <path>"` and remembers every request it saw.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::*;
use crate::app::aggregator::EmptyVersionPolicy;
use crate::app::client::RawResponse;
use crate::app::models::{DatastoreAuth, DatastorePath};

const DATASTORE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_datastore.json"
));
const DATASTORE_LIST: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_datastore_list.json"
));
const DATASET_LIST: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_dataset_list.json"
));
const DATASET_VERSION: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_dataset_version.json"
));
const DATASET_VERSIONS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_dataset_versions.json"
));
const EMPTY_LIST: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_empty_list.json"
));

enum Reply {
    Respond(StatusCode, String),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Request {
    method: &'static str,
    path: String,
    body: Option<Value>,
}

#[derive(Default)]
struct RecordingClient {
    routes: HashMap<String, Reply>,
    requests: Mutex<Vec<Request>>,
}

impl RecordingClient {
    fn respond(mut self, route: &str, status: StatusCode, body: &str) -> Self {
        self.routes
            .insert(route.to_string(), Reply::Respond(status, body.to_string()));
        self
    }

    fn fail(mut self, route: &str, message: &str) -> Self {
        self.routes
            .insert(route.to_string(), Reply::Fail(message.to_string()));
        self
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, method: &'static str, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        match self.routes.get(&format!("{} {}", method, path)) {
            Some(Reply::Respond(status, body)) => Ok(RawResponse::new(*status, body.clone())),
            Some(Reply::Fail(message)) => Err(WorkspaceError::InvalidUrl {
                url: path.to_string(),
                error: message.clone(),
            }),
            None => Ok(RawResponse::new(StatusCode::NOT_FOUND, "no route")),
        }
    }
}

#[async_trait]
impl ResourceClient for RecordingClient {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.answer("GET", path, None)
    }

    async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.answer("DELETE", path, None)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse> {
        self.answer("PUT", path, Some(body))
    }
}

struct SingleClientFactory {
    client: Arc<RecordingClient>,
    scopes: Mutex<Vec<(String, String)>>,
}

impl ResourceClientFactory for SingleClientFactory {
    fn scoped(&self, resource_group: &str, workspace: &str) -> Result<Arc<dyn ResourceClient>> {
        self.scopes
            .lock()
            .unwrap()
            .push((resource_group.to_string(), workspace.to_string()));
        Ok(self.client.clone())
    }
}

fn workspace(client: RecordingClient) -> (Workspace, Arc<RecordingClient>, Arc<SingleClientFactory>) {
    let client = Arc::new(client);
    let factory = Arc::new(SingleClientFactory {
        client: Arc::clone(&client),
        scopes: Mutex::new(Vec::new()),
    });
    (Workspace::new(factory.clone()), client, factory)
}

fn dataset(name: &str, version: u32) -> Dataset {
    Dataset {
        name: name.to_string(),
        version,
        ..Default::default()
    }
}

/// Test datastore listing and request scoping
#[tokio::test]
async fn test_get_datastores() {
    let (ws, client, factory) =
        workspace(RecordingClient::default().respond("GET datastores", StatusCode::OK, DATASTORE_LIST));

    let datastores = ws.get_datastores("rg", "ws").await.unwrap();

    assert_eq!(datastores.len(), 2);
    assert_eq!(datastores[0].name, "datastore-1");
    assert_eq!(datastores[1].storage_type, "AzureBlob");
    assert!(datastores[1].is_default);
    assert_eq!(
        factory.scopes.lock().unwrap().clone(),
        vec![("rg".to_string(), "ws".to_string())]
    );
    assert_eq!(client.requests()[0].method, "GET");
}

#[tokio::test]
async fn test_get_datastores_error_status() {
    let (ws, _, _) = workspace(RecordingClient::default().respond(
        "GET datastores",
        StatusCode::INTERNAL_SERVER_ERROR,
        "boom",
    ));

    let err = ws.get_datastores("rg", "ws").await.unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::HttpResponse { status, ref body }
            if status == StatusCode::INTERNAL_SERVER_ERROR && body == "boom"
    ));
}

/// Test single datastore retrieval and not-found mapping
#[tokio::test]
async fn test_get_datastore() {
    let (ws, _, _) = workspace(
        RecordingClient::default()
            .respond("GET datastores/datastore-1", StatusCode::OK, DATASTORE)
            .respond("GET datastores/missing", StatusCode::NOT_FOUND, "")
            .respond("GET datastores/forbidden", StatusCode::FORBIDDEN, "denied"),
    );

    let datastore = ws.get_datastore("rg", "ws", "datastore-1").await.unwrap();
    assert_eq!(datastore.storage_account_name, "account-1");

    let err = ws.get_datastore("rg", "ws", "missing").await.unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::ResourceNotFound { ref resource_type, ref name }
            if resource_type == "datastore" && name == "missing"
    ));

    let err = ws.get_datastore("rg", "ws", "forbidden").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn test_delete_datastore() {
    let (ws, client, _) = workspace(
        RecordingClient::default()
            .respond("DELETE datastores/old", StatusCode::OK, "")
            .respond("DELETE datastores/busy", StatusCode::CONFLICT, "in use"),
    );

    ws.delete_datastore("rg", "ws", "old").await.unwrap();
    assert!(matches!(
        ws.delete_datastore("rg", "ws", "gone").await,
        Err(WorkspaceError::ResourceNotFound { .. })
    ));
    assert_eq!(
        ws.delete_datastore("rg", "ws", "busy")
            .await
            .unwrap_err()
            .status(),
        Some(StatusCode::CONFLICT)
    );
    assert_eq!(client.requests().len(), 3);
}

/// Test that a blank datastore name is rejected before any request
#[tokio::test]
async fn test_create_datastore_blank_name() {
    let (ws, client, _) = workspace(RecordingClient::default());
    let datastore = Datastore {
        name: "   ".to_string(),
        ..Default::default()
    };

    let err = ws
        .create_or_update_datastore("rg", "ws", &datastore)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkspaceError::InvalidArgument { .. }));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_create_datastore_sends_write_schema() {
    let (ws, client, _) = workspace(RecordingClient::default().respond(
        "PUT datastores/datastore-1",
        StatusCode::CREATED,
        DATASTORE,
    ));
    let datastore = Datastore {
        name: "datastore-1".to_string(),
        description: "test".to_string(),
        storage_type: "AzureBlob".to_string(),
        storage_account_name: "account-1".to_string(),
        storage_container_name: "container-1".to_string(),
        auth: Some(DatastoreAuth {
            credentials_type: "AccountKey".to_string(),
            account_key: "key".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };

    let created = ws
        .create_or_update_datastore("rg", "ws", &datastore)
        .await
        .unwrap();
    assert_eq!(created.id, "id-1");

    let requests = client.requests();
    let body = requests[0].body.as_ref().unwrap();
    let contents = &body["properties"]["contents"];
    assert_eq!(contents["contentsType"], "AzureBlob");
    assert_eq!(contents["accountName"], "account-1");
    assert_eq!(contents["endpoint"], "core.windows.net");
    assert_eq!(contents["protocol"], "https");
    assert_eq!(contents["credentials"]["secrets"]["key"], "key");
}

#[tokio::test]
async fn test_create_datastore_rejected() {
    let (ws, _, _) = workspace(RecordingClient::default().respond(
        "PUT datastores/bad",
        StatusCode::BAD_REQUEST,
        "invalid",
    ));
    let datastore = Datastore {
        name: "bad".to_string(),
        ..Default::default()
    };

    let err = ws
        .create_or_update_datastore("rg", "ws", &datastore)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP Response is in error [status code 400 Bad Request]: invalid");
}

/// Test latest-version aggregation through the facade
///
/// Every dataset in the listing shares the versions fixture (1, 3, 2), so each
/// resolves to version 3; results come back sorted by name.
#[tokio::test]
async fn test_get_datasets() {
    let (ws, client, _) = workspace(
        RecordingClient::default()
            .respond("GET datasets", StatusCode::OK, DATASET_LIST)
            .respond("GET datasets/dataset-3/versions", StatusCode::OK, DATASET_VERSIONS)
            .respond("GET datasets/dataset-1/versions", StatusCode::OK, DATASET_VERSIONS)
            .respond("GET datasets/dataset-2/versions", StatusCode::OK, DATASET_VERSIONS),
    );

    let datasets = ws.get_datasets("rg", "ws").await.unwrap();

    let names: Vec<_> = datasets.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["dataset-1", "dataset-2", "dataset-3"]);
    for dataset in &datasets {
        assert_eq!(dataset.version, 3);
        assert_eq!(dataset.description, "third");
        assert_eq!(dataset.directory_paths.len(), 1);
    }
    assert_eq!(client.requests().len(), 4);
}

#[tokio::test]
async fn test_get_datasets_empty_workspace() {
    let (ws, client, _) =
        workspace(RecordingClient::default().respond("GET datasets", StatusCode::OK, EMPTY_LIST));

    assert!(ws.get_datasets("rg", "ws").await.unwrap().is_empty());
    assert_eq!(client.requests().len(), 1);
}

/// Test that one failing version list fails the whole listing
#[tokio::test]
async fn test_get_datasets_version_failure() {
    let (ws, _, _) = workspace(
        RecordingClient::default()
            .respond("GET datasets", StatusCode::OK, DATASET_LIST)
            .respond("GET datasets/dataset-1/versions", StatusCode::OK, DATASET_VERSIONS)
            .respond("GET datasets/dataset-2/versions", StatusCode::BAD_GATEWAY, "upstream")
            .respond("GET datasets/dataset-3/versions", StatusCode::OK, DATASET_VERSIONS),
    );

    let err = ws.get_datasets("rg", "ws").await.unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::HttpResponse { status, ref body }
            if status == StatusCode::BAD_GATEWAY && body == "upstream"
    ));
}

#[tokio::test]
async fn test_get_datasets_transport_failure_is_unchanged() {
    let (ws, _, _) = workspace(
        RecordingClient::default()
            .respond("GET datasets", StatusCode::OK, DATASET_LIST)
            .respond("GET datasets/dataset-1/versions", StatusCode::OK, DATASET_VERSIONS)
            .fail("GET datasets/dataset-2/versions", "connection reset")
            .respond("GET datasets/dataset-3/versions", StatusCode::OK, DATASET_VERSIONS),
    );

    let err = ws.get_datasets("rg", "ws").await.unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::InvalidUrl { ref url, ref error }
            if url == "datasets/dataset-2/versions" && error == "connection reset"
    ));
}

#[tokio::test]
async fn test_get_datasets_listing_failure() {
    let (ws, client, _) = workspace(RecordingClient::default().respond(
        "GET datasets",
        StatusCode::UNAUTHORIZED,
        "no token",
    ));

    let err = ws.get_datasets("rg", "ws").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(client.requests().len(), 1);
}

/// Test datasets without versions under both policies
#[tokio::test]
async fn test_get_datasets_without_versions() {
    let routes = || {
        RecordingClient::default()
            .respond("GET datasets", StatusCode::OK, DATASET_LIST)
            .respond("GET datasets/dataset-1/versions", StatusCode::OK, DATASET_VERSIONS)
            .respond("GET datasets/dataset-2/versions", StatusCode::OK, EMPTY_LIST)
            .respond("GET datasets/dataset-3/versions", StatusCode::OK, DATASET_VERSIONS)
    };

    let (ws, _, _) = workspace(routes());
    let datasets = ws.get_datasets("rg", "ws").await.unwrap();
    assert_eq!(datasets.len(), 3);
    assert_eq!(datasets[1].name, "dataset-2");
    assert_eq!(datasets[1].version, 0);
    assert!(datasets[1].id.is_empty());

    let (ws, _, _) = workspace(routes());
    let ws = ws
        .with_aggregator_config(AggregatorConfig {
            empty_versions: EmptyVersionPolicy::Reject,
            ..Default::default()
        })
        .unwrap();
    let err = ws.get_datasets("rg", "ws").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::NoVersions { ref dataset } if dataset == "dataset-2"));
}

#[tokio::test]
async fn test_get_dataset() {
    let (ws, client, _) = workspace(RecordingClient::default().respond(
        "GET datasets/train/versions/1",
        StatusCode::OK,
        DATASET_VERSION,
    ));

    let dataset = ws.get_dataset("rg", "ws", "train", 1).await.unwrap();

    assert_eq!(dataset.name, "train");
    assert_eq!(dataset.version, 1);
    assert_eq!(
        dataset.file_paths,
        vec![DatastorePath::new("workspaceblobstore", "data/train.csv")]
    );
    assert_eq!(client.requests()[0].path, "datasets/train/versions/1");

    let err = ws.get_dataset("rg", "ws", "train", 9).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_get_dataset_versions_and_next_version() {
    let (ws, _, _) = workspace(
        RecordingClient::default()
            .respond("GET datasets/train/versions", StatusCode::OK, DATASET_VERSIONS)
            .respond("GET datasets/fresh/versions", StatusCode::OK, EMPTY_LIST)
            .respond("GET datasets/locked/versions", StatusCode::FORBIDDEN, ""),
    );

    let versions = ws.get_dataset_versions("rg", "ws", "train").await.unwrap();
    let numbers: Vec<u32> = versions.iter().map(|d| d.version).collect();
    assert_eq!(numbers, [1, 3, 2]);
    assert!(versions.iter().all(|d| d.name == "train"));

    assert_eq!(ws.get_dataset_next_version("rg", "ws", "train").await.unwrap(), 4);
    assert_eq!(ws.get_dataset_next_version("rg", "ws", "fresh").await.unwrap(), 1);
    assert!(ws.get_dataset_next_version("rg", "ws", "locked").await.is_err());
}

/// Test names with reserved URL characters
///
/// Each name is encoded into a single path segment for every operation.
#[tokio::test]
async fn test_names_are_encoded_as_single_segments() {
    let (ws, client, _) = workspace(
        RecordingClient::default()
            .respond("GET datasets/a%2Fb%3Fc/versions", StatusCode::OK, DATASET_VERSIONS)
            .respond("DELETE datasets/a%2Fb%3Fc/versions/2", StatusCode::OK, "")
            .respond("DELETE datastores/store%23one", StatusCode::OK, ""),
    );

    let versions = ws.get_dataset_versions("rg", "ws", "a/b?c").await.unwrap();
    assert_eq!(versions.len(), 3);
    assert!(versions.iter().all(|d| d.name == "a/b?c"));

    ws.delete_dataset_version("rg", "ws", "a/b?c", 2).await.unwrap();
    ws.delete_datastore("rg", "ws", "store#one").await.unwrap();

    let paths: Vec<String> = client.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        [
            "datasets/a%2Fb%3Fc/versions",
            "datasets/a%2Fb%3Fc/versions/2",
            "datastores/store%23one",
        ]
    );
}

#[test]
fn test_next_version() {
    assert_eq!(next_version(&[]), 1);
    assert_eq!(next_version(&[dataset("a", 2), dataset("a", 7), dataset("a", 5)]), 8);
}

/// Test dataset validation before any request
#[tokio::test]
async fn test_create_dataset_validation() {
    let (ws, client, _) = workspace(RecordingClient::default());

    let mut unnamed = dataset(" ", 1);
    unnamed.file_paths.push(DatastorePath::new("store", "file.csv"));
    let err = ws
        .create_or_update_dataset("rg", "ws", &unnamed)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidArgument { .. }));

    let pathless = dataset("train", 1);
    let err = ws
        .create_or_update_dataset("rg", "ws", &pathless)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidArgument { ref reason } if reason.contains("path")));

    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_create_dataset_sends_every_path() {
    let (ws, client, _) = workspace(RecordingClient::default().respond(
        "PUT datasets/train/versions/2",
        StatusCode::OK,
        DATASET_VERSION,
    ));
    let mut train = dataset("train", 2);
    train.description = "training data".to_string();
    train.file_paths = vec![
        DatastorePath::new("store", "a.csv"),
        DatastorePath::new("store", "/b.csv"),
    ];
    train.directory_paths = vec![DatastorePath::new("store", "raw/")];

    let created = ws.create_or_update_dataset("rg", "ws", &train).await.unwrap();
    assert_eq!(created.name, "train");

    let requests = client.requests();
    assert_eq!(requests[0].method, "PUT");
    let body = requests[0].body.as_ref().unwrap();
    assert_eq!(body["properties"]["description"], "training data");
    let paths = body["properties"]["paths"].as_array().unwrap();
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0]["file"], "azureml://datastores/store/paths/a.csv");
    assert_eq!(paths[1]["file"], "azureml://datastores/store/paths/b.csv");
    assert_eq!(paths[2]["folder"], "azureml://datastores/store/paths/raw/");
}

#[tokio::test]
async fn test_delete_dataset_and_version() {
    let (ws, client, _) = workspace(
        RecordingClient::default()
            .respond("DELETE datasets/train", StatusCode::OK, "")
            .respond("DELETE datasets/train/versions/2", StatusCode::OK, "")
            .respond("DELETE datasets/train/versions/3", StatusCode::NO_CONTENT, ""),
    );

    ws.delete_dataset("rg", "ws", "train").await.unwrap();
    ws.delete_dataset_version("rg", "ws", "train", 2).await.unwrap();

    let err = ws
        .delete_dataset_version("rg", "ws", "train", 3)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));

    let err = ws.delete_dataset("rg", "ws", "other").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::HttpResponse { .. }));

    let methods: Vec<_> = client.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, ["DELETE"; 4]);
}

#[test]
fn test_invalid_aggregator_config_rejected() {
    let (ws, _, _) = workspace(RecordingClient::default());
    let result = ws.with_aggregator_config(AggregatorConfig {
        worker_count: 0,
        ..Default::default()
    });
    assert!(matches!(result, Err(WorkspaceError::Config(_))));
}
