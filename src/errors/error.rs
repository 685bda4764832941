//! Error types for the Playforge API client.

use crate::transport::TransportError;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias for Playforge operations.
///
/// Success carries the parsed response payload (an empty object when the
/// response had no body); failure carries an [`ApiError`]. Exactly one of
/// the two is ever populated, which is the crate's rendition of the
/// ok/data/error envelope.
pub type ApiResult = Result<Value, ApiError>;

/// Classified failure kind for an API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport-level failure (connection, DNS, TLS, local I/O)
    NetworkError,
    /// The per-attempt timeout fired before the transport completed
    Timeout,
    /// The response body could not be parsed as JSON
    InvalidResponse,
    /// HTTP 401
    Unauthorized,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 409
    Conflict,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// Any other HTTP 4xx
    HttpError,
    /// Client-side parameter validation failed; no request was sent
    ValidationError,
    /// HTTP 403 carrying a `banned` error code
    Banned,
    /// Anything that fits no other kind
    Unknown,
}

impl ErrorKind {
    /// Classifies an HTTP status code.
    ///
    /// Total over all inputs; statuses below 400 that reach this map
    /// classify as [`ErrorKind::Unknown`].
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimited,
            s if s >= 500 => ErrorKind::ServerError,
            s if (400..500).contains(&s) => ErrorKind::HttpError,
            _ => ErrorKind::Unknown,
        }
    }

    /// Stable snake_case name, used in logs and error details.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "network_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ServerError => "server_error",
            ErrorKind::HttpError => "http_error",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::Banned => "banned",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure outcome of an API operation.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message} (status {status})")]
pub struct ApiError {
    /// Classified failure kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// HTTP status, 0 if the failure never reached the HTTP layer
    pub status: u16,
    /// Opaque diagnostic payload (usually the raw response body)
    pub details: Option<Value>,
}

impl ApiError {
    /// Creates an error with no HTTP status and no details.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: 0,
            details: None,
        }
    }

    /// Attaches an HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Attaches a diagnostic payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Builds an error from an HTTP error response.
    ///
    /// The kind comes from the status map; the message from the body's
    /// `error.message`, `error` (string), or `message` field, in that
    /// priority order, defaulting to `"HTTP <status>"`. The full body, if
    /// any, is carried as details.
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let message = extract_message(status, body);
        Self {
            kind: ErrorKind::from_status(status),
            message,
            status,
            details: body.cloned(),
        }
    }

    /// Returns true if this error may resolve on a later attempt.
    ///
    /// Retryable kinds are SERVER_ERROR and TIMEOUT; retryable transport
    /// failures are decided by their category before they are converted
    /// into an [`ApiError`].
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::ServerError | ErrorKind::Timeout)
    }

    /// Renders this error as a diagnostic JSON value.
    pub fn to_details(&self) -> Value {
        serde_json::json!({
            "kind": self.kind.as_str(),
            "message": self.message,
            "status": self.status,
        })
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::new(
            ErrorKind::NetworkError,
            format!("{}: {}", err.category.as_str(), err.message),
        )
    }
}

fn extract_message(status: u16, body: Option<&Value>) -> String {
    if let Some(body) = body {
        if let Some(m) = body.pointer("/error/message").and_then(Value::as_str) {
            return m.to_string();
        }
        if let Some(m) = body.get("error").and_then(Value::as_str) {
            return m.to_string();
        }
        if let Some(m) = body.get("message").and_then(Value::as_str) {
            return m.to_string();
        }
    }
    format!("HTTP {status}")
}

/// Configuration error raised at client construction time.
///
/// This is the programmer-error channel: expected runtime failures always
/// travel through [`ApiResult`], never through panics or this type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration field was not provided
    #[error("missing required configuration field: {name}")]
    MissingField {
        /// Name of the missing field
        name: &'static str,
    },

    /// The base URL could not be parsed
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The offending URL string
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {message}")]
    HttpClient {
        /// Build failure description
        message: String,
    },
}
