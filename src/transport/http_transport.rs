//! Reqwest-based transport implementation.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::transport::{
    HttpMethod, HttpTransport, TransportError, TransportErrorCategory, TransportRequest,
    TransportResponse,
};

const DEFAULT_MAX_RESPONSE_SIZE: usize = 1_048_576; // 1MB
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default reqwest-based HTTP transport.
///
/// The client carries no overall request timeout; the executor owns the
/// per-attempt deadline and cancels by dropping the `send` future.
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_response_size: usize,
}

impl ReqwestTransport {
    /// Create a new transport with default settings.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_options(DEFAULT_MAX_RESPONSE_SIZE)
    }

    /// Create a transport with a custom response size cap.
    pub fn with_options(max_response_size: usize) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            max_response_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();

        if let Some(length) = response.content_length() {
            if length as usize > self.max_response_size {
                return Err(TransportError::new(
                    TransportErrorCategory::BodyTooLarge,
                    format!("response body of {length} bytes exceeds limit"),
                ));
            }
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        if body.len() > self.max_response_size {
            return Err(TransportError::new(
                TransportErrorCategory::BodyTooLarge,
                format!("response body of {} bytes exceeds limit", body.len()),
            ));
        }

        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let category = if err.is_timeout() {
        // Only the connect timeout can fire here; the attempt deadline
        // lives in the executor.
        TransportErrorCategory::NoResponse
    } else if err.is_redirect() {
        TransportErrorCategory::RedirectLimit
    } else if err.is_connect() {
        classify_connect_error(&err)
    } else if err.is_body() || err.is_decode() {
        TransportErrorCategory::ConnectionError
    } else if err.is_builder() {
        TransportErrorCategory::RequestFailed
    } else if err.is_request() {
        TransportErrorCategory::RequestFailed
    } else {
        TransportErrorCategory::LocalIoError
    };

    TransportError::new(category, err.to_string())
}

// reqwest folds DNS and TLS failures into its connect error; the error
// chain text is the only place they can be told apart.
fn classify_connect_error(err: &reqwest::Error) -> TransportErrorCategory {
    let description = format!("{err:?}").to_ascii_lowercase();
    if description.contains("dns") || description.contains("resolve") {
        TransportErrorCategory::CantResolve
    } else if description.contains("tls") || description.contains("certificate") {
        TransportErrorCategory::TlsHandshakeError
    } else {
        TransportErrorCategory::CantConnect
    }
}
