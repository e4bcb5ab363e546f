use thiserror::Error;

/// Main error type for opwatch operations
#[derive(Debug, Error)]
pub enum OpwatchError {
    #[error("Service API error: {0}")]
    ServiceApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection timed out: {0}")]
    ConnectionTimeout(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("DNS resolution failed for host '{host}': {details}")]
    DnsResolutionError { host: String, details: String },

    #[error("SSL/TLS error: {0}")]
    SslError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Entity not found: {name}")]
    EntityNotFound { name: String },

    #[error("Missing tracking header: {0}")]
    MissingTrackingHeader(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upload of {operation} failed for entity '{entity_id}': {details}")]
    UploadFailed {
        entity_id: String,
        operation: String,
        details: String,
        /// Secondary failure from the compensating delete, when the cleanup
        /// itself did not succeed. Never replaces the primary failure.
        cleanup_error: Option<String>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl OpwatchError {
    pub fn service_api<S: Into<String>>(msg: S) -> Self {
        Self::ServiceApiError(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn connection_timeout<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionTimeout(msg.into())
    }

    pub fn connection_refused<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionRefused(msg.into())
    }

    pub fn dns_resolution<S: Into<String>>(host: S, details: S) -> Self {
        Self::DnsResolutionError {
            host: host.into(),
            details: details.into(),
        }
    }

    pub fn ssl_error<S: Into<String>>(msg: S) -> Self {
        Self::SslError(msg.into())
    }

    pub fn invalid_url<S: Into<String>>(msg: S) -> Self {
        Self::InvalidUrl(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn entity_not_found<S: Into<String>>(name: S) -> Self {
        Self::EntityNotFound { name: name.into() }
    }

    pub fn missing_tracking_header<S: Into<String>>(msg: S) -> Self {
        Self::MissingTrackingHeader(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn upload_failed<S: Into<String>>(
        entity_id: S,
        operation: S,
        details: S,
        cleanup_error: Option<String>,
    ) -> Self {
        Self::UploadFailed {
            entity_id: entity_id.into(),
            operation: operation.into(),
            details: details.into(),
            cleanup_error,
        }
    }

    pub fn unknown<S: Into<String>>(msg: S) -> Self {
        Self::Unknown(msg.into())
    }
}

/// Result type alias for opwatch operations
pub type Result<T> = std::result::Result<T, OpwatchError>;
