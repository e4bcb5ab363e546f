//! Data models for long-running operation tracking

use serde::Deserialize;
use url::Url;

use crate::error::{OpwatchError, Result};
use crate::transport::TransportResponse;

/// Header carrying the service-assigned operation id on accepted responses
pub const REQUEST_ID_HEADER: &str = "x-ms-request-id";

/// Tracking record for a long-running operation
///
/// Created once from the headers of the initiating response and never
/// modified afterwards.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    pub operation_id: String,
    pub status_url: Url,
}

impl OperationHandle {
    pub fn new<S: Into<String>>(operation_id: S, status_url: Url) -> Self {
        Self {
            operation_id: operation_id.into(),
            status_url,
        }
    }

    /// Build a handle from an "operation accepted" response
    ///
    /// The status URL comes from the `Location` header, resolved against
    /// `base_url` when the service returns a relative path. The operation id
    /// comes from `x-ms-request-id`, falling back to the last path segment
    /// of the status URL when the header is absent.
    pub fn from_accepted_response(response: &TransportResponse, base_url: &Url) -> Result<Self> {
        let location = response.header("location").ok_or_else(|| {
            OpwatchError::missing_tracking_header(
                "Response did not include a Location header to poll".to_string(),
            )
        })?;

        let status_url = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => base_url.join(location)?,
            Err(e) => return Err(e.into()),
        };

        let operation_id = match response.header(REQUEST_ID_HEADER) {
            Some(id) => id.to_string(),
            None => status_url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_string())
                .ok_or_else(|| {
                    OpwatchError::missing_tracking_header(format!(
                        "No {REQUEST_ID_HEADER} header and no usable id in '{location}'"
                    ))
                })?,
        };

        Ok(Self {
            operation_id,
            status_url,
        })
    }
}

/// Terminal and non-terminal results reported by the status resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OperationResult {
    InProgress,
    Succeeded,
    Failed,
}

/// Latest observed state of a long-running operation
///
/// The poller holds only the most recent instance; timeout and cancellation
/// are folded into `Failed` with a distinguishing error code so callers
/// never need a fourth outcome.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub result: OperationResult,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Error code carried by the synthetic status when the attempt budget runs out
pub const TIMEOUT_ERROR_CODE: &str = "OperationTimedOut";

/// Error code carried by the synthetic status after external cancellation
pub const CANCELLED_ERROR_CODE: &str = "OperationCancelled";

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.result,
            OperationResult::Succeeded | OperationResult::Failed
        )
    }

    pub fn succeeded(&self) -> bool {
        self.result == OperationResult::Succeeded
    }

    /// Synthetic terminal status for an exhausted attempt budget
    pub fn timed_out(operation_id: &str, attempts: u32) -> Self {
        Self {
            result: OperationResult::Failed,
            error_code: Some(TIMEOUT_ERROR_CODE.to_string()),
            error_message: Some(format!(
                "Operation '{operation_id}' was still in progress after {attempts} attempts"
            )),
        }
    }

    /// Synthetic terminal status for an externally cancelled poll
    pub fn cancelled(operation_id: &str) -> Self {
        Self {
            result: OperationResult::Failed,
            error_code: Some(CANCELLED_ERROR_CODE.to_string()),
            error_message: Some(format!(
                "Polling of operation '{operation_id}' was cancelled"
            )),
        }
    }
}
