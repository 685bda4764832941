//! Client event sink.
//!
//! The core reports lifecycle events to an [`EventSink`] and never consumes
//! a return value from it; sinks must not block.

use serde_json::Value;
use std::sync::Mutex;

/// Receiver for client lifecycle events.
pub trait EventSink: Send + Sync {
    /// A logical request was accepted for execution.
    fn request_started(&self, method: &str, path: &str);

    /// A logical request reached a terminal outcome.
    fn request_finished(&self, method: &str, path: &str, ok: bool, status: u16);

    /// A token refresh cycle completed.
    fn token_refreshed(&self, ok: bool);

    /// A 403 response carried a `banned` error code.
    fn banned_detected(&self, details: &Value);

    /// The authenticated session appeared or went away.
    fn auth_state_changed(&self, authenticated: bool);
}

/// Sink that discards every event.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn request_started(&self, _method: &str, _path: &str) {}
    fn request_finished(&self, _method: &str, _path: &str, _ok: bool, _status: u16) {}
    fn token_refreshed(&self, _ok: bool) {}
    fn banned_detected(&self, _details: &Value) {}
    fn auth_state_changed(&self, _authenticated: bool) {}
}

/// Sink that forwards events to `tracing`.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn request_started(&self, method: &str, path: &str) {
        tracing::debug!(method, path, "request started");
    }

    fn request_finished(&self, method: &str, path: &str, ok: bool, status: u16) {
        tracing::debug!(method, path, ok, status, "request finished");
    }

    fn token_refreshed(&self, ok: bool) {
        tracing::info!(ok, "token refresh completed");
    }

    fn banned_detected(&self, details: &Value) {
        tracing::warn!(%details, "banned account detected");
    }

    fn auth_state_changed(&self, authenticated: bool) {
        tracing::info!(authenticated, "auth state changed");
    }
}

/// A recorded client event.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// request-started
    RequestStarted {
        /// HTTP method
        method: String,
        /// Logical request path
        path: String,
    },
    /// request-finished
    RequestFinished {
        /// HTTP method
        method: String,
        /// Logical request path
        path: String,
        /// Terminal outcome
        ok: bool,
        /// HTTP status, 0 if none
        status: u16,
    },
    /// token-refreshed
    TokenRefreshed {
        /// Refresh outcome
        ok: bool,
    },
    /// banned-detected
    BannedDetected {
        /// Full response body
        details: Value,
    },
    /// auth-state-changed
    AuthStateChanged {
        /// Whether a session is present
        authenticated: bool,
    },
}

/// In-memory recording sink for tests and diagnostics.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<ClientEvent>>,
}

impl InMemoryEventSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: ClientEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl EventSink for InMemoryEventSink {
    fn request_started(&self, method: &str, path: &str) {
        self.push(ClientEvent::RequestStarted {
            method: method.to_string(),
            path: path.to_string(),
        });
    }

    fn request_finished(&self, method: &str, path: &str, ok: bool, status: u16) {
        self.push(ClientEvent::RequestFinished {
            method: method.to_string(),
            path: path.to_string(),
            ok,
            status,
        });
    }

    fn token_refreshed(&self, ok: bool) {
        self.push(ClientEvent::TokenRefreshed { ok });
    }

    fn banned_detected(&self, details: &Value) {
        self.push(ClientEvent::BannedDetected {
            details: details.clone(),
        });
    }

    fn auth_state_changed(&self, authenticated: bool) {
        self.push(ClientEvent::AuthStateChanged { authenticated });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_sink_records_in_order() {
        let sink = InMemoryEventSink::new();
        sink.request_started("GET", "/v1/config");
        sink.token_refreshed(true);
        sink.request_finished("GET", "/v1/config", true, 200);

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ClientEvent::RequestStarted {
                method: "GET".to_string(),
                path: "/v1/config".to_string(),
            }
        );
        assert_eq!(events[1], ClientEvent::TokenRefreshed { ok: true });
    }

    #[test]
    fn test_banned_event_carries_details() {
        let sink = InMemoryEventSink::new();
        let body = json!({"error": {"code": "banned"}});
        sink.banned_detected(&body);

        assert_eq!(
            sink.events(),
            vec![ClientEvent::BannedDetected { details: body }]
        );
    }
}
