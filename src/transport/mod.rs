//! HTTP transport seam for service management requests
//!
//! The poller and uploader never talk to reqwest directly; they go through
//! the [`Transport`] trait so that callers can substitute their own
//! request/response plumbing (and tests can substitute a mock).

pub mod http;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{OpwatchError, Result};

// Re-exported so downstream code and tests can build responses without
// naming reqwest themselves.
pub use reqwest::header::HeaderMap;
pub use reqwest::StatusCode;

pub use http::HttpTransport;

/// Request body with an explicit content type
#[derive(Debug, Clone)]
pub struct RequestBody {
    pub content_type: String,
    pub content: Vec<u8>,
}

impl RequestBody {
    /// Serialize a value as a JSON body
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        let content = serde_json::to_vec(value)
            .map_err(|e| OpwatchError::serialization(format!("Failed to encode request body: {e}")))?;
        Ok(Self {
            content_type: "application/json".to_string(),
            content,
        })
    }

    /// Raw bytes, sent as an opaque stream
    pub fn octet_stream(content: Vec<u8>) -> Self {
        Self {
            content_type: "application/octet-stream".to_string(),
            content,
        }
    }

    /// Raw bytes with a caller-supplied content type
    pub fn bytes<S: Into<String>>(content_type: S, content: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            content,
        }
    }
}

/// Materialized response from a transport call
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Look up a header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| OpwatchError::serialization(format!("Failed to parse response body: {e}")))
    }

    /// Map a non-success response into the error taxonomy
    ///
    /// 409 becomes a distinct conflict error so callers can give a specific
    /// diagnostic; everything else is a generic service API error carrying
    /// the message from the standard `{"error": {"message": ...}}` body
    /// shape when the service provides one.
    pub fn api_error(&self) -> OpwatchError {
        let status = self.status.as_u16();
        let message = self.error_message();
        if self.status == StatusCode::CONFLICT {
            return OpwatchError::conflict(message);
        }
        OpwatchError::service_api(format!("HTTP {status}: {message}"))
    }

    fn error_message(&self) -> String {
        if let Ok(error_json) = serde_json::from_slice::<Value>(&self.body) {
            if let Some(message) = error_json
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                return message.to_string();
            }
        }
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// A request/response transport capable of GET/POST/PUT/DELETE with body
/// support and header inspection for tracking identifiers.
///
/// Implementations must treat transport-level failures (connect, timeout,
/// TLS) as errors; non-2xx responses are returned as values so callers can
/// inspect status codes and headers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse>;

    async fn post(&self, url: &Url, body: RequestBody) -> Result<TransportResponse>;

    async fn put(&self, url: &Url, body: RequestBody) -> Result<TransportResponse>;

    async fn delete(&self, url: &Url) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_body(status: StatusCode, body: &[u8]) -> TransportResponse {
        TransportResponse::new(status, HeaderMap::new(), body.to_vec())
    }

    #[test]
    fn test_api_error_parses_service_message() {
        let response = response_with_body(
            StatusCode::BAD_REQUEST,
            br#"{"error": {"code": "BadThing", "message": "the thing was bad"}}"#,
        );
        let error = response.api_error();
        assert!(matches!(error, OpwatchError::ServiceApiError(_)));
        assert!(error.to_string().contains("the thing was bad"));
    }

    #[test]
    fn test_api_error_conflict_is_distinct() {
        let response = response_with_body(StatusCode::CONFLICT, b"entity in use");
        assert!(matches!(response.api_error(), OpwatchError::Conflict(_)));
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let response = response_with_body(StatusCode::INTERNAL_SERVER_ERROR, b"boom");
        assert!(response.api_error().to_string().contains("boom"));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let body = RequestBody::json(&serde_json::json!({"name": "pkg"})).unwrap();
        assert_eq!(body.content_type, "application/json");
    }
}
