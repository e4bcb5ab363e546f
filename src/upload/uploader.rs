//! Two-phase create with compensating cleanup
//!
//! Phase 1 registers metadata and yields an entity id plus a pre-authorized
//! upload location; phase 2 transfers the payload there. If the transfer
//! fails, the entity registered in phase 1 is deleted before the original
//! failure is surfaced, so the service never keeps a metadata record whose
//! payload is missing.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::models::{UploadPayload, UploadReceipt, UploadResult, UploadTarget};
use crate::error::{OpwatchError, Result};
use crate::transport::{RequestBody, Transport};

/// Behavior switches for [`CompensatingUploader`]
#[derive(Debug, Clone)]
pub struct UploaderOptions {
    /// Re-PUT the metadata to the entity's canonical URL after a successful
    /// transfer. Some entity kinds require this activation call.
    pub finalize: bool,
}

impl Default for UploaderOptions {
    fn default() -> Self {
        Self { finalize: true }
    }
}

/// Performs two-phase creates with rollback on transfer failure
pub struct CompensatingUploader {
    transport: Arc<dyn Transport>,
    options: UploaderOptions,
}

impl CompensatingUploader {
    pub fn new(transport: Arc<dyn Transport>, options: UploaderOptions) -> Self {
        Self { transport, options }
    }

    /// Register metadata, transfer the payload, and optionally finalize
    ///
    /// An empty payload is rejected before any network call. Phase-1
    /// failures propagate as-is since no entity exists yet. A phase-2
    /// transfer failure triggers exactly one best-effort DELETE of the
    /// registered entity; if that cleanup also fails, its error is attached
    /// to the primary failure, never substituted for it. After a rollback
    /// the entity id must not be used again.
    pub async fn create_and_upload<M: serde::Serialize + Sync>(
        &self,
        target: &UploadTarget,
        metadata: &M,
        payload: UploadPayload,
    ) -> Result<UploadReceipt> {
        if payload.content.is_empty() {
            return Err(OpwatchError::invalid_argument(
                "Upload payload must not be empty",
            ));
        }

        let result = self.register_metadata(target, metadata).await?;
        debug!(
            entity_id = %result.entity_id,
            upload_host = ?result.pre_auth_upload_uri.host_str(),
            "registered upload entity"
        );

        let size = payload.content.len() as u64;
        let file_name = payload.file_name.clone();

        if let Err(primary) = self.transfer_payload(&result, payload).await {
            let cleanup_error = self.rollback(target, &result.entity_id).await;
            return Err(OpwatchError::upload_failed(
                result.entity_id.clone(),
                file_name,
                primary.to_string(),
                cleanup_error,
            ));
        }

        if self.options.finalize {
            self.finalize_entity(target, &result, metadata).await?;
        }

        Ok(UploadReceipt {
            entity_id: result.entity_id,
            size,
            uploaded_at: Utc::now(),
            finalized: self.options.finalize,
        })
    }

    /// Phase 1: POST metadata to obtain the entity id and upload location
    async fn register_metadata<M: serde::Serialize + Sync>(
        &self,
        target: &UploadTarget,
        metadata: &M,
    ) -> Result<UploadResult> {
        let body = RequestBody::json(metadata)?;
        let response = self.transport.post(&target.create_url, body).await?;
        if !response.is_success() {
            return Err(response.api_error());
        }
        response.json()
    }

    /// Phase 2: stream the payload to the pre-authorized location
    async fn transfer_payload(&self, result: &UploadResult, payload: UploadPayload) -> Result<()> {
        let body = RequestBody::bytes(payload.resolved_content_type(), payload.content);
        let response = self
            .transport
            .put(&result.pre_auth_upload_uri, body)
            .await?;
        if !response.is_success() {
            return Err(response.api_error());
        }
        Ok(())
    }

    /// Activate the entity by re-PUTting its metadata to the canonical URL
    ///
    /// A 409 here means the entity clashes with an existing one and is
    /// surfaced as a conflict so callers can give a precise diagnostic. The
    /// payload has already been transferred at this point, so no
    /// compensating delete is issued.
    async fn finalize_entity<M: serde::Serialize + Sync>(
        &self,
        target: &UploadTarget,
        result: &UploadResult,
        metadata: &M,
    ) -> Result<()> {
        let url = target.entity_url(&result.entity_id)?;
        let body = RequestBody::json(metadata)?;
        let response = self.transport.put(&url, body).await?;
        if !response.is_success() {
            return Err(response.api_error());
        }
        debug!(entity_id = %result.entity_id, "finalized upload entity");
        Ok(())
    }

    /// Best-effort compensating delete; returns the cleanup failure, if any
    async fn rollback(&self, target: &UploadTarget, entity_id: &str) -> Option<String> {
        let url = match target.entity_url(entity_id) {
            Ok(url) => url,
            Err(e) => return Some(e.to_string()),
        };

        let outcome = match self.transport.delete(&url).await {
            // 404 means the record is already gone, which is what we wanted
            Ok(response) if response.is_success() || response.status.as_u16() == 404 => None,
            Ok(response) => Some(response.api_error().to_string()),
            Err(e) => Some(e.to_string()),
        };

        if let Some(ref cleanup_error) = outcome {
            warn!(entity_id, %cleanup_error, "compensating delete failed");
        } else {
            debug!(entity_id, "rolled back upload entity");
        }
        outcome
    }
}
