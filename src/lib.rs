//! # Playforge API Client
//!
//! Production-ready Rust client for the Playforge game backend API.
//!
//! The crate turns a logical request (method + path + body) into a reliable,
//! observable operation: bounded retries with capped exponential backoff,
//! per-attempt timeouts, optional request serialization, and transparent
//! credential refresh when an access token expires mid-session.
//!
//! ## Features
//!
//! - Retry/timeout state machine per request with jittered backoff
//! - Single-flight token refresh: concurrent 401s trigger one refresh call
//! - Serialized (default) or parallel request dispatch
//! - Domain services: session, key-value storage, leaderboards, game config
//! - Pluggable transport, token store, and event sink for testing
//! - Structured logging via `tracing`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_playforge::{PlayforgeClient, ClientConfig};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .project_key(SecretString::new("pf-proj-...".to_string()))
//!         .build()?;
//!
//!     let client = PlayforgeClient::new(config)?;
//!
//!     client.session().login("player-1", "hunter2").await?;
//!     let value = client.storage().get_value("save-slot-0").await?;
//!     println!("{value}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Main client facade and logical request type
//! - `config` - Configuration types and builder
//! - `auth` - Credential bundle, token store, refresh coordinator
//! - `transport` - HTTP transport trait and reqwest implementation
//! - `resilience` - Backoff policy, request executor, dispatcher
//! - `errors` - Error taxonomy and result envelope
//! - `services` - Thin domain endpoint wrappers
//! - `observability` - Fire-and-forget event sinks

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod transport;

// Development/testing modules
#[cfg(test)]
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthRefreshCoordinator, CredentialBundle, InMemoryTokenStore, TokenStore};
pub use client::{ApiRequest, PlayforgeClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use errors::{ApiError, ApiResult, ConfigError, ErrorKind};
pub use observability::{ClientEvent, EventSink, InMemoryEventSink, NoopEventSink, TracingEventSink};
pub use resilience::{BackoffPolicy, DispatchMode, RequestDispatcher, RequestExecutor};
pub use transport::{
    HttpMethod, HttpTransport, ReqwestTransport, TransportError, TransportErrorCategory,
    TransportRequest, TransportResponse,
};

/// The default Playforge API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.playforge.dev";

/// The header carrying the per-project identifier
pub const PROJECT_KEY_HEADER: &str = "x-playforge-project";

/// The default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The default maximum number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;
