//! Status handling shared by the workspace operations

use reqwest::StatusCode;

use crate::app::client::RawResponse;
use crate::errors::{Result, WorkspaceError};

fn into_error(response: RawResponse) -> WorkspaceError {
    WorkspaceError::HttpResponse {
        status: response.status,
        body: response.body,
    }
}

/// Accept only 200 OK
pub(crate) fn expect_ok(response: RawResponse) -> Result<String> {
    if response.status == StatusCode::OK {
        Ok(response.body)
    } else {
        Err(into_error(response))
    }
}

/// Accept 200 OK, turning 404 into a not-found error for the named resource
pub(crate) fn expect_found(response: RawResponse, resource_type: &str, name: &str) -> Result<String> {
    if response.status == StatusCode::NOT_FOUND {
        return Err(WorkspaceError::not_found(resource_type, name));
    }
    expect_ok(response)
}

/// Accept anything below 400
pub(crate) fn expect_accepted(response: RawResponse) -> Result<String> {
    if response.status.as_u16() >= 400 {
        Err(into_error(response))
    } else {
        Ok(response.body)
    }
}
