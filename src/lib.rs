//! Azure ML Workspace Library
//!
//! A Rust client for the datastores and datasets of Azure Machine Learning
//! workspaces. Listing the datasets of a workspace resolves the latest version
//! of each one concurrently, with a bounded number of requests in flight and
//! fail-fast cancellation.

pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{Result, WorkspaceError};
