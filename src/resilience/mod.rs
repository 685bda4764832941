//! Resilience primitives: backoff policy, request executor, dispatcher.

mod backoff;
mod dispatch;
mod executor;

pub use backoff::BackoffPolicy;
pub use dispatch::{DispatchMode, RequestDispatcher};
pub use executor::{PreparedRequest, RequestExecutor};
