//! HTTP Transport
//!
//! Transport trait and request/response types. The core never talks to
//! reqwest directly; everything goes through [`HttpTransport`] so tests can
//! substitute a scripted implementation.

mod http_transport;

pub use http_transport::ReqwestTransport;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Wire representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A fully resolved HTTP request, ready to send.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Serialized request body.
    pub body: Option<String>,
}

/// An HTTP response as seen by the core: status plus raw body.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Category of a transport-level failure.
///
/// Connection-class categories are worth retrying; the rest indicate a
/// request or environment problem that a replay cannot fix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorCategory {
    /// TCP connection could not be established
    CantConnect,
    /// Host name did not resolve
    CantResolve,
    /// Connection dropped or reset mid-exchange
    ConnectionError,
    /// TLS handshake failed
    TlsHandshakeError,
    /// The server never produced a response
    NoResponse,
    /// Response body exceeded the configured size limit
    BodyTooLarge,
    /// The request could not be produced or sent
    RequestFailed,
    /// Too many redirects
    RedirectLimit,
    /// Local I/O failure while reading or writing
    LocalIoError,
}

impl TransportErrorCategory {
    /// Returns true for connection-class failures that may succeed on a
    /// later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CantConnect | Self::CantResolve | Self::ConnectionError | Self::TlsHandshakeError
        )
    }

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CantConnect => "cant_connect",
            Self::CantResolve => "cant_resolve",
            Self::ConnectionError => "connection_error",
            Self::TlsHandshakeError => "tls_handshake_error",
            Self::NoResponse => "no_response",
            Self::BodyTooLarge => "body_too_large",
            Self::RequestFailed => "request_failed",
            Self::RedirectLimit => "redirect_limit",
            Self::LocalIoError => "local_io_error",
        }
    }
}

impl fmt::Display for TransportErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure: the request never yielded an HTTP response.
#[derive(Clone, Debug, Error)]
#[error("{category}: {message}")]
pub struct TransportError {
    /// Failure category
    pub category: TransportErrorCategory,
    /// Failure description
    pub message: String,
}

impl TransportError {
    /// Creates a transport error.
    pub fn new(category: TransportErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// HTTP transport interface (for dependency injection).
///
/// Implementations must be cancel-safe: dropping the returned future must
/// abandon the in-flight exchange. The executor relies on this to cancel
/// an attempt when its timeout fires.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and await its response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
