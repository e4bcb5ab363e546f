//! Shared test plumbing: a mock transport and response builders
#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use opwatch::error::Result;
use opwatch::transport::{HeaderMap, RequestBody, StatusCode, Transport, TransportResponse};
use url::Url;

mock! {
    pub Transport {}

    #[async_trait]
    impl Transport for Transport {
        async fn get(&self, url: &Url) -> Result<TransportResponse>;
        async fn post(&self, url: &Url, body: RequestBody) -> Result<TransportResponse>;
        async fn put(&self, url: &Url, body: RequestBody) -> Result<TransportResponse>;
        async fn delete(&self, url: &Url) -> Result<TransportResponse>;
    }
}

pub fn response(status: u16, body: &[u8]) -> TransportResponse {
    TransportResponse::new(
        StatusCode::from_u16(status).unwrap(),
        HeaderMap::new(),
        body.to_vec(),
    )
}

pub fn status_response(result: &str) -> TransportResponse {
    response(200, format!(r#"{{"result": "{result}"}}"#).as_bytes())
}

pub fn in_progress() -> TransportResponse {
    status_response("InProgress")
}

pub fn succeeded() -> TransportResponse {
    status_response("Succeeded")
}

/// An "operation accepted" response with tracking headers
pub fn accepted(location: &str, request_id: &str) -> TransportResponse {
    let mut headers = HeaderMap::new();
    headers.insert("location", location.parse().unwrap());
    headers.insert("x-ms-request-id", request_id.parse().unwrap());
    TransportResponse::new(StatusCode::ACCEPTED, headers, Vec::new())
}
