//! Resource-management service client
//!
//! Ties the transport, poller, and uploader together into the call shapes
//! the management API actually uses.

pub mod models;
pub mod service;

pub use models::{PackageMetadata, ResourceSummary};
pub use service::ServiceClient;
