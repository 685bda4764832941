//! Request executor.
//!
//! Owns the life of one logical request: attempt, await the transport with
//! a deadline armed in parallel, classify the outcome, retry or terminate.
//! Exactly one result is delivered per request; total attempts never exceed
//! `max_retries + 1`.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::errors::{ApiError, ErrorKind};
use crate::observability::EventSink;
use crate::resilience::BackoffPolicy;
use crate::transport::{HttpMethod, HttpTransport, TransportRequest, TransportResponse};

/// A logical request resolved against configuration: absolute URL, merged
/// headers, serialized body. Immutable for the lifetime of its execution;
/// the auth coordinator clones it to replay with renewed credentials.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Logical path, kept for logs and events
    pub path: String,
    /// Absolute URL
    pub url: String,
    /// Merged headers
    pub headers: HashMap<String, String>,
    /// Serialized JSON body
    pub body: Option<String>,
}

impl PreparedRequest {
    fn to_transport(&self) -> TransportRequest {
        TransportRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// Drives a prepared request to a terminal outcome.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    backoff: BackoffPolicy,
    request_timeout: Duration,
    max_retries: u32,
    events: Arc<dyn EventSink>,
}

impl RequestExecutor {
    /// Creates an executor over the given transport.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        backoff: BackoffPolicy,
        request_timeout: Duration,
        max_retries: u32,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transport,
            backoff,
            request_timeout,
            max_retries,
            events,
        }
    }

    /// Executes the request, retrying transient failures.
    ///
    /// Returns the HTTP status together with the parsed payload so the
    /// caller can report the outcome without re-reading the response.
    pub async fn execute(&self, request: &PreparedRequest) -> Result<(u16, Value), ApiError> {
        let mut attempt: u32 = 0;
        let mut last_error: Option<ApiError> = None;

        while attempt <= self.max_retries {
            if attempt > 0 {
                let delay = self.backoff.delay(attempt - 1);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    path = %request.path,
                    "retrying request"
                );
                sleep(delay).await;
            }

            let outcome = timeout(
                self.request_timeout,
                self.transport.send(request.to_transport()),
            )
            .await;

            let error = match outcome {
                Ok(Ok(response)) => {
                    let status = response.status;
                    match self.interpret(response) {
                        Ok(data) => return Ok((status, data)),
                        Err(error) => error,
                    }
                }
                Ok(Err(transport_error)) => {
                    let retryable = transport_error.category.is_retryable();
                    let error = ApiError::from(transport_error);
                    if !retryable {
                        return Err(error);
                    }
                    error
                }
                // Elapsing drops the transport future, cancelling the
                // in-flight attempt.
                Err(_elapsed) => ApiError::new(
                    ErrorKind::Timeout,
                    format!("no response within {:?}", self.request_timeout),
                ),
            };

            let retryable = error.is_retryable() || error.kind == ErrorKind::NetworkError;
            if !retryable {
                return Err(error);
            }

            last_error = Some(error);
            attempt += 1;
        }

        // The loop cannot exit without an error in hand, but a lost result
        // must surface as UNKNOWN rather than hang the caller.
        let error = last_error
            .unwrap_or_else(|| ApiError::new(ErrorKind::Unknown, "request ended without an outcome"));
        tracing::warn!(
            path = %request.path,
            attempts = attempt,
            error = %error,
            "request failed after exhausting retries"
        );
        Err(error)
    }

    fn interpret(&self, response: TransportResponse) -> Result<Value, ApiError> {
        let body = parse_body(&response)?;

        if response.status < 400 {
            return Ok(body.unwrap_or_else(|| Value::Object(serde_json::Map::new())));
        }

        let mut error = ApiError::from_response(response.status, body.as_ref());

        if response.status == 403 {
            let code = body
                .as_ref()
                .and_then(|b| b.pointer("/error/code"))
                .and_then(Value::as_str);
            if code == Some("banned") {
                error.kind = ErrorKind::Banned;
                if let Some(body) = body.as_ref() {
                    self.events.banned_detected(body);
                }
            }
        }

        Err(error)
    }
}

fn parse_body(response: &TransportResponse) -> Result<Option<Value>, ApiError> {
    if response.body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(Some(value)),
        Err(e) if response.status < 400 => Err(ApiError::new(
            ErrorKind::InvalidResponse,
            format!("malformed response body: {e}"),
        )
        .with_status(response.status)),
        // Error responses are not required to carry JSON.
        Err(_) => Ok(None),
    }
}
