//! Client facade for the Playforge API.
//!
//! An explicit instance, constructed once by the embedding application: it
//! holds configuration and collaborator references and exposes the single
//! operation the domain services build on, [`PlayforgeClient::execute`].

use secrecy::ExposeSecret;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::auth::{AuthRefreshCoordinator, InMemoryTokenStore, TokenStore};
use crate::config::ClientConfig;
use crate::errors::{ApiError, ApiResult, ConfigError, ErrorKind};
use crate::observability::{EventSink, TracingEventSink};
use crate::resilience::{PreparedRequest, RequestDispatcher, RequestExecutor};
use crate::services::{
    session, GameConfigService, LeaderboardService, SessionService, StorageService,
};
use crate::transport::{HttpMethod, HttpTransport, ReqwestTransport};
use crate::PROJECT_KEY_HEADER;

const AUTHORIZATION_HEADER: &str = "authorization";

/// One caller-initiated operation: method, path, optional body, header
/// overrides. Immutable once submitted.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL, already rendered
    pub path: String,
    /// Structured request body
    pub body: Option<Value>,
    /// Header overrides, applied after the client defaults
    pub headers: HashMap<String, String>,
}

impl ApiRequest {
    /// Creates a request.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HashMap::new(),
        }
    }

    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides a header for this request only.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Playforge API client.
pub struct PlayforgeClient {
    config: Arc<ClientConfig>,
    executor: Arc<RequestExecutor>,
    dispatcher: RequestDispatcher,
    coordinator: AuthRefreshCoordinator,
    store: Arc<dyn TokenStore>,
    events: Arc<dyn EventSink>,
    closed: AtomicBool,
}

impl PlayforgeClient {
    /// Creates a client with the default transport, an in-memory token
    /// store, and tracing-backed events.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Self::with_dependencies(
            config,
            transport,
            Arc::new(InMemoryTokenStore::new()),
            Arc::new(TracingEventSink),
        )
    }

    /// Creates a client with explicit collaborators (custom persistence,
    /// scripted transport in tests, application event hooks).
    pub fn with_dependencies(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        let config = Arc::new(config);

        let executor = Arc::new(RequestExecutor::new(
            transport,
            config.backoff.clone(),
            config.request_timeout,
            config.max_retries,
            events.clone(),
        ));

        let refresh_path = config
            .path_template("session.refresh", session::REFRESH_PATH)
            .to_string();
        let mut refresh_headers = base_headers(&config);
        refresh_headers.insert("content-type".to_string(), "application/json".to_string());
        let coordinator = AuthRefreshCoordinator::new(
            executor.clone(),
            store.clone(),
            events.clone(),
            config.endpoint_url(&refresh_path),
            refresh_headers,
        );

        Ok(Self {
            dispatcher: RequestDispatcher::new(config.dispatch_mode),
            config,
            executor,
            coordinator,
            store,
            events,
            closed: AtomicBool::new(false),
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token store collaborator.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        self.store.clone()
    }

    pub(crate) fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Session operations (login, register, logout).
    pub fn session(&self) -> SessionService<'_> {
        SessionService::new(self)
    }

    /// Key-value storage operations.
    pub fn storage(&self) -> StorageService<'_> {
        StorageService::new(self)
    }

    /// Leaderboard operations.
    pub fn leaderboard(&self) -> LeaderboardService<'_> {
        LeaderboardService::new(self)
    }

    /// Remote game configuration.
    pub fn game_config(&self) -> GameConfigService<'_> {
        GameConfigService::new(self)
    }

    /// Refuses all further submissions.
    ///
    /// Requests already waiting in the serialized lane resolve with
    /// VALIDATION_ERROR as soon as they are launched; nothing hangs.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// True once [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Executes a logical request to a terminal outcome.
    ///
    /// Honors the dispatch mode, attaches default headers, the project
    /// key, and the stored access token, retries transient failures, and
    /// transparently refreshes credentials on a 401 when a refresh token
    /// is held.
    pub async fn execute(&self, request: ApiRequest) -> ApiResult {
        let _lane = self.dispatcher.acquire().await;

        if self.is_closed() {
            return Err(ApiError::new(
                ErrorKind::ValidationError,
                "client is shut down",
            ));
        }

        self.events
            .request_started(request.method.as_str(), &request.path);

        let (prepared, presented_token) = self.prepare(&request);

        let outcome = match self.executor.execute(&prepared).await {
            Err(error) if error.kind == ErrorKind::Unauthorized && !presented_token.is_empty() => {
                self.coordinator
                    .recover(&prepared, &presented_token, error)
                    .await
            }
            other => other,
        };

        let (ok, status) = match &outcome {
            Ok((status, _)) => (true, *status),
            Err(error) => (false, error.status),
        };
        self.events
            .request_finished(request.method.as_str(), &request.path, ok, status);

        outcome.map(|(_, data)| data)
    }

    fn prepare(&self, request: &ApiRequest) -> (PreparedRequest, String) {
        let mut headers = base_headers(&self.config);
        if request.body.is_some() {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        // A caller-supplied Authorization header is passed through
        // untouched and is not eligible for refresh recovery.
        let mut presented_token = String::new();
        if !headers.contains_key(AUTHORIZATION_HEADER) {
            let bundle = self.store.load();
            if !bundle.access_token.is_empty() {
                headers.insert(
                    AUTHORIZATION_HEADER.to_string(),
                    format!("Bearer {}", bundle.access_token),
                );
                presented_token = bundle.access_token;
            }
        }

        let prepared = PreparedRequest {
            method: request.method,
            path: request.path.clone(),
            url: self.config.endpoint_url(&request.path),
            headers,
            body: request.body.as_ref().map(Value::to_string),
        };

        (prepared, presented_token)
    }
}

fn base_headers(config: &ClientConfig) -> HashMap<String, String> {
    let mut headers = config.default_headers.clone();
    headers.insert("accept".to_string(), "application/json".to_string());
    headers.insert(
        PROJECT_KEY_HEADER.to_string(),
        config.project_key.expose_secret().to_string(),
    );
    headers
}
