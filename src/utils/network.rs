use crate::error::{OpwatchError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Configuration for the HTTP client with proper timeouts
pub struct NetworkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            user_agent: format!("opwatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a properly configured HTTP client with timeouts
pub fn create_http_client(config: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| OpwatchError::network(format!("Failed to create HTTP client: {e}")))
}

/// Classify a transport-level reqwest failure into the error taxonomy
///
/// These are always fatal to the poller and uploader; classification exists
/// so callers get an actionable message and so [`is_retryable_error`] can
/// decide whether an outer read-path retry makes sense.
pub fn classify_network_error(error: &reqwest::Error, url: &Url) -> OpwatchError {
    let host = url.host_str().unwrap_or("unknown-host").to_string();

    if error.is_timeout() {
        return OpwatchError::connection_timeout(format!(
            "Request to '{host}' timed out. The service may be slow or unreachable."
        ));
    }

    if error.is_connect() {
        if is_dns_resolution_error(error) {
            return OpwatchError::dns_resolution(
                host.clone(),
                format!("Unable to resolve '{host}'. Check the service URL in your configuration."),
            );
        }

        if error
            .to_string()
            .to_lowercase()
            .contains("connection refused")
        {
            return OpwatchError::connection_refused(format!(
                "Connection to '{host}' was refused. The service may be down."
            ));
        }

        return OpwatchError::network(format!(
            "Failed to connect to '{host}'. Check your network connection and the service URL."
        ));
    }

    let error_text = error.to_string().to_lowercase();
    if error_text.contains("ssl") || error_text.contains("tls") || error_text.contains("certificate")
    {
        return OpwatchError::ssl_error(format!(
            "SSL/TLS error when connecting to '{host}'. This may be a certificate issue."
        ));
    }

    if error.is_request() {
        return OpwatchError::invalid_url(format!("Invalid request to '{host}': {error}"));
    }

    OpwatchError::network(format!("Network error when contacting '{host}': {error}"))
}

/// DNS failure detection from the error message, since reqwest does not
/// expose the underlying resolver error directly
fn is_dns_resolution_error(error: &reqwest::Error) -> bool {
    let error_msg = error.to_string().to_lowercase();
    let dns_indicators = [
        "dns",
        "name resolution",
        "resolve",
        "lookup",
        "name or service not known",
        "nodename nor servname provided",
        "temporary failure in name resolution",
        "no such host",
        "host not found",
        "getaddrinfo failed",
        "could not resolve host",
    ];

    dns_indicators
        .iter()
        .any(|&indicator| error_msg.contains(indicator))
}

/// Check if an error is worth retrying on an idempotent read path
///
/// The poller and uploader never retry transport errors themselves; this is
/// only consulted by the outer backoff wrapper around plain GETs.
pub fn is_retryable_error(error: &OpwatchError) -> bool {
    match error {
        OpwatchError::ConnectionTimeout(_) => true,
        OpwatchError::NetworkError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("timeout")
                || msg_lower.contains("temporary")
                || msg_lower.contains("503")
                || msg_lower.contains("502")
                || msg_lower.contains("504")
        }
        OpwatchError::ServiceApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("503")
                || msg_lower.contains("502")
                || msg_lower.contains("504")
                || msg_lower.contains("throttled")
        }
        OpwatchError::DnsResolutionError { .. } => false,
        OpwatchError::ConnectionRefused(_) => false,
        OpwatchError::SslError(_) => false,
        OpwatchError::InvalidUrl(_) => false,
        _ => false,
    }
}
