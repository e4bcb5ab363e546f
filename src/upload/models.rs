//! Data models for two-phase uploads

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::Result;

/// Endpoints for a two-phase create
///
/// `create_url` receives the phase-1 metadata POST; the entity's canonical
/// URL (finalize PUT, compensating DELETE) is `entity_base_url` plus the id
/// the service assigned.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub create_url: Url,
    pub entity_base_url: Url,
}

impl UploadTarget {
    pub fn new(create_url: Url, entity_base_url: Url) -> Self {
        Self {
            create_url,
            entity_base_url,
        }
    }

    /// Canonical URL of the entity created in phase 1
    pub fn entity_url(&self, entity_id: &str) -> Result<Url> {
        let mut url = self.entity_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                crate::error::OpwatchError::invalid_url(format!(
                    "'{}' cannot carry an entity id",
                    self.entity_base_url
                ))
            })?
            .pop_if_empty()
            .push(entity_id);
        Ok(url)
    }
}

/// Phase-1 response: the registered entity id and its pre-authorized
/// upload location
///
/// Owned by the upload call; after a rollback the `entity_id` is invalid
/// and must not be referenced again.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub entity_id: String,
    pub pre_auth_upload_uri: Url,
}

/// Payload handed to phase 2
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

impl UploadPayload {
    pub fn new<S: Into<String>>(file_name: S, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            content_type: None,
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Explicit content type, or a guess from the file name
    pub fn resolved_content_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string()
        })
    }
}

/// Success record for a completed upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub entity_id: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub finalized: bool,
}
