//! Typed client over the poller and uploader
//!
//! Wraps the resource-management API's common call shapes: mutate-then-poll
//! for PUT/DELETE, retried GETs for reads, and the two-phase package upload.
//! URL templates come in as paths joined onto the configured base URL, not
//! hard-coded per call site.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::models::PackageMetadata;
use crate::error::Result;
use crate::operation::{OperationHandle, OperationPoller, OperationStatus, PollOptions};
use crate::transport::{RequestBody, Transport};
use crate::upload::{CompensatingUploader, UploadPayload, UploadReceipt, UploadTarget, UploaderOptions};
use crate::utils::retry::{retry_with_backoff, RetryOptions};

/// Client for a single resource-management service
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    poller: OperationPoller,
    poll_options: PollOptions,
}

impl ServiceClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: Url, poll_options: PollOptions) -> Self {
        let poller = OperationPoller::new(transport.clone());
        Self {
            transport,
            base_url,
            poller,
            poll_options,
        }
    }

    fn resource_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Read a resource as JSON, retrying transient transport failures
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.resource_url(path)?;
        let operation = || async {
            let response = self.transport.get(&url).await?;
            if response.status.as_u16() == 404 {
                return Err(crate::error::OpwatchError::entity_not_found(path));
            }
            if !response.is_success() {
                return Err(response.api_error());
            }
            response.json()
        };
        retry_with_backoff(operation, RetryOptions::default()).await
    }

    /// PUT a resource and drive the resulting operation to completion
    ///
    /// Returns `true` only when the operation reports `Succeeded`; an
    /// exhausted poll budget counts as failure. A 2xx response with no
    /// tracking headers means the service completed synchronously.
    pub async fn put_resource<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let url = self.resource_url(path)?;
        let response = self
            .transport
            .put(&url, RequestBody::json(body)?)
            .await?;
        if !response.is_success() {
            return Err(response.api_error());
        }

        if response.header("location").is_none() {
            debug!(path, "resource update completed synchronously");
            return Ok(true);
        }

        let status = self.poll_accepted(&response, cancel).await?;
        Ok(status.succeeded())
    }

    /// DELETE a resource and drive the resulting operation to completion
    ///
    /// A 404 on the initial DELETE means the resource is already gone and
    /// counts as success.
    pub async fn delete_resource(&self, path: &str, cancel: &CancellationToken) -> Result<bool> {
        let url = self.resource_url(path)?;
        let response = self.transport.delete(&url).await?;

        if response.status.as_u16() == 404 {
            debug!(path, "resource already removed");
            return Ok(true);
        }
        if !response.is_success() {
            return Err(response.api_error());
        }

        if response.header("location").is_none() {
            return Ok(true);
        }

        let status = self.poll_accepted(&response, cancel).await?;
        Ok(status.succeeded())
    }

    /// Register and upload a package with rollback on transfer failure
    pub async fn create_package(
        &self,
        path: &str,
        metadata: &PackageMetadata,
        payload: UploadPayload,
        finalize: bool,
    ) -> Result<UploadReceipt> {
        let create_url = self.resource_url(path)?;
        let target = UploadTarget::new(create_url.clone(), create_url);
        let uploader =
            CompensatingUploader::new(self.transport.clone(), UploaderOptions { finalize });

        let receipt = uploader.create_and_upload(&target, metadata, payload).await?;
        info!(
            entity_id = %receipt.entity_id,
            size = receipt.size,
            finalized = receipt.finalized,
            "package upload complete"
        );
        Ok(receipt)
    }

    /// Poll an accepted mutating response until it terminates
    async fn poll_accepted(
        &self,
        response: &crate::transport::TransportResponse,
        cancel: &CancellationToken,
    ) -> Result<OperationStatus> {
        let handle = OperationHandle::from_accepted_response(response, &self.base_url)?;
        info!(
            operation_id = %handle.operation_id,
            "waiting for operation to complete"
        );
        self.poller.poll(&handle, &self.poll_options, cancel).await
    }
}
