//! Long-running operation tracking
//!
//! Azure Service Management accepts mutating requests quickly and reports
//! actual completion through a separate operation-status resource. This
//! module holds the tracking handle, the status model, and the poller that
//! drives a handle to a terminal status.

pub mod models;
pub mod poller;

pub use models::{
    OperationHandle, OperationResult, OperationStatus, CANCELLED_ERROR_CODE, TIMEOUT_ERROR_CODE,
};
pub use poller::{OperationPoller, PollOptions};
