//! Mock implementations for testing.
//!
//! Scripted transport with recorded requests and in-flight tracking, used
//! by the unit suites across the crate.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::transport::{
    HttpTransport, TransportError, TransportErrorCategory, TransportRequest, TransportResponse,
};

type Handler = dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Scripted HTTP transport.
///
/// Responses are served from a FIFO queue, or from a handler closure when
/// one is set (useful when concurrent ordering is nondeterministic). Every
/// request is recorded; the peak number of concurrent `send` calls is
/// tracked for dispatch-mode assertions.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    handler: Mutex<Option<Box<Handler>>>,
    requests: Mutex<Vec<TransportRequest>>,
    latency: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn enqueue(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse {
                status,
                body: body.to_string(),
            }));
    }

    /// Queues a transport failure.
    pub fn enqueue_error(&self, category: TransportErrorCategory) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(category, "mock transport failure")));
    }

    /// Routes every request through a closure instead of the queue.
    pub fn set_handler(
        &self,
        handler: impl Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) {
        *self.handler.lock().unwrap() = Some(Box::new(handler));
    }

    /// Adds an artificial delay to every send, as a cancellable suspension.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Snapshot of every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Peak number of concurrent in-flight sends.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct FlightGuard<'a>(&'a AtomicUsize);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        // Decrements even when the executor's timeout cancels the send.
        let _guard = FlightGuard(&self.in_flight);

        let latency = *self.latency.lock().unwrap();
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }

        if let Some(handler) = self.handler.lock().unwrap().as_ref() {
            return handler(&request);
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(TransportResponse {
                    status: 200,
                    body: "{}".to_string(),
                })
            })
    }
}
