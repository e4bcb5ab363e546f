//! Long-running operation poller
//!
//! Repeatedly queries an operation-status resource until the operation
//! reaches a terminal state, the attempt budget is exhausted, or a fatal
//! error is returned. Timeout and cancellation are reported as terminal
//! `Failed` statuses rather than errors, so callers only ever branch on
//! succeeded/failed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::models::{OperationHandle, OperationStatus};
use crate::error::{OpwatchError, Result};
use crate::transport::Transport;

/// Tuning knobs for a single poll call
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between consecutive status requests
    pub interval: Duration,
    /// Maximum number of status requests before giving up
    pub max_attempts: u32,
    /// Optional wall-clock cutoff, checked between attempts
    pub deadline: Option<Instant>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 30,
            deadline: None,
        }
    }
}

impl PollOptions {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Polls operation-status resources over a shared transport
///
/// Stateless across calls: each poll owns its own handle and attempt
/// counter, so concurrent polls need no coordination.
pub struct OperationPoller {
    transport: Arc<dyn Transport>,
}

impl OperationPoller {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Poll until a terminal status is observed or the budget runs out
    ///
    /// Transport failures and malformed status payloads abort the poll and
    /// surface as errors; they are never silently retried. Exhausting the
    /// attempt budget while still `InProgress` yields a synthetic `Failed`
    /// status with a timeout error code. Cancellation raised during the
    /// inter-poll sleep yields a synthetic `Failed` status with a cancelled
    /// error code.
    pub async fn poll(
        &self,
        handle: &OperationHandle,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> Result<OperationStatus> {
        if options.max_attempts == 0 {
            return Err(OpwatchError::invalid_argument(
                "max_attempts must be at least 1",
            ));
        }

        for attempt in 1..=options.max_attempts {
            let response = self.transport.get(&handle.status_url).await?;
            if !response.is_success() {
                return Err(response.api_error());
            }

            let status: OperationStatus = response.json()?;
            debug!(
                operation_id = %handle.operation_id,
                attempt,
                result = ?status.result,
                "polled operation status"
            );

            if status.is_terminal() {
                return Ok(status);
            }

            if attempt == options.max_attempts {
                break;
            }

            if let Some(deadline) = options.deadline {
                if Instant::now() + options.interval >= deadline {
                    debug!(
                        operation_id = %handle.operation_id,
                        "deadline reached before next attempt"
                    );
                    break;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(operation_id = %handle.operation_id, "poll cancelled");
                    return Ok(OperationStatus::cancelled(&handle.operation_id));
                }
                _ = sleep(options.interval) => {}
            }
        }

        Ok(OperationStatus::timed_out(
            &handle.operation_id,
            options.max_attempts,
        ))
    }
}
