//! reqwest-backed transport implementation

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use url::Url;
use uuid::Uuid;

use super::{RequestBody, Transport, TransportResponse};
use crate::error::{OpwatchError, Result};
use crate::utils::network::{classify_network_error, create_http_client, NetworkConfig};

/// HTTP transport over a shared reqwest client
///
/// Attaches a bearer token when configured and a fresh
/// `x-ms-client-request-id` to every request for server-side correlation.
pub struct HttpTransport {
    client: Client,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(network_config: &NetworkConfig) -> Result<Self> {
        let client = create_http_client(network_config)?;
        Ok(Self {
            client,
            bearer_token: None,
        })
    }

    pub fn with_bearer_token(mut self, token: String) -> Self {
        self.bearer_token = Some(token);
        self
    }

    fn request_headers(&self, content_type: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer_token {
            let value = format!("Bearer {token}").parse().map_err(|_| {
                OpwatchError::config("Access token contains characters invalid in a header")
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(content_type) = content_type {
            headers.insert(
                CONTENT_TYPE,
                content_type.parse().map_err(|_| {
                    OpwatchError::invalid_argument(format!("Invalid content type: {content_type}"))
                })?,
            );
        }
        headers.insert(
            "x-ms-client-request-id",
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .expect("UUID is always a valid header value"),
        );
        Ok(headers)
    }

    async fn execute(
        &self,
        method: Method,
        url: &Url,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse> {
        let headers = self.request_headers(body.as_ref().map(|b| b.content_type.as_str()))?;

        let mut request = self.client.request(method, url.clone()).headers(headers);
        if let Some(body) = body {
            request = request.body(body.content);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_network_error(&e, url))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_network_error(&e, url))?
            .to_vec();

        Ok(TransportResponse::new(status, headers, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse> {
        self.execute(Method::GET, url, None).await
    }

    async fn post(&self, url: &Url, body: RequestBody) -> Result<TransportResponse> {
        self.execute(Method::POST, url, Some(body)).await
    }

    async fn put(&self, url: &Url, body: RequestBody) -> Result<TransportResponse> {
        self.execute(Method::PUT, url, Some(body)).await
    }

    async fn delete(&self, url: &Url) -> Result<TransportResponse> {
        self.execute(Method::DELETE, url, None).await
    }
}
