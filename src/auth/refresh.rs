//! Auth refresh coordinator.
//!
//! Recovers from an expired access token without surfacing it to the
//! caller: a single refresh call renews the credentials, then the failed
//! request is replayed once with the new Authorization header. Concurrent
//! 401s share one refresh cycle.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::{CredentialBundle, TokenStore};
use crate::errors::{ApiError, ErrorKind};
use crate::observability::EventSink;
use crate::resilience::{PreparedRequest, RequestExecutor};
use crate::transport::HttpMethod;

const AUTHORIZATION_HEADER: &str = "authorization";

/// Coordinates token refresh and the replay of the triggering request.
pub struct AuthRefreshCoordinator {
    executor: Arc<RequestExecutor>,
    store: Arc<dyn TokenStore>,
    events: Arc<dyn EventSink>,
    /// Absolute URL of the refresh endpoint.
    refresh_url: String,
    /// Headers for the refresh call itself; never includes Authorization,
    /// so a failing refresh cannot recurse into another recovery.
    refresh_headers: HashMap<String, String>,
    flight: Mutex<()>,
}

impl AuthRefreshCoordinator {
    /// Creates a coordinator issuing refresh calls against `refresh_url`.
    pub fn new(
        executor: Arc<RequestExecutor>,
        store: Arc<dyn TokenStore>,
        events: Arc<dyn EventSink>,
        refresh_url: String,
        refresh_headers: HashMap<String, String>,
    ) -> Self {
        Self {
            executor,
            store,
            events,
            refresh_url,
            refresh_headers,
            flight: Mutex::new(()),
        }
    }

    /// Attempts to recover from an UNAUTHORIZED outcome.
    ///
    /// `presented_token` is the access token the original request carried.
    /// At most one refresh call is in flight at any time: the first caller
    /// performs it, later callers wait on the lock and then observe either
    /// renewed credentials (replay) or a cleared session (fail). The
    /// replay happens exactly once per recovered request, and a second
    /// 401 from the replay is returned as-is.
    pub async fn recover(
        &self,
        original: &PreparedRequest,
        presented_token: &str,
        failed: ApiError,
    ) -> Result<(u16, Value), ApiError> {
        if self.store.load().refresh_token.is_empty() {
            // Nothing to refresh with.
            return Err(failed);
        }

        let flight = self.flight.lock().await;

        let current = self.store.load();
        if !current.has_tokens() {
            // The cycle we waited on failed and tore the session down.
            return Err(failed);
        }
        if current.access_token != presented_token {
            // The cycle we waited on already renewed the credentials.
            drop(flight);
            return self.replay(original, &current.access_token).await;
        }

        match self.refresh(&current).await {
            Ok(renewed) => {
                self.store.save(renewed.clone());
                self.events.token_refreshed(true);
                tracing::info!(user_id = %renewed.user_id, "access token refreshed");
                drop(flight);
                self.replay(original, &renewed.access_token).await
            }
            Err(refresh_error) => {
                self.store.clear();
                self.events.token_refreshed(false);
                self.events.auth_state_changed(false);
                tracing::warn!(error = %refresh_error, "token refresh failed, session cleared");
                Err(ApiError::new(ErrorKind::Unauthorized, "session expired")
                    .with_status(failed.status)
                    .with_details(refresh_error.to_details()))
            }
        }
    }

    async fn refresh(&self, current: &CredentialBundle) -> Result<CredentialBundle, ApiError> {
        let body = serde_json::json!({
            "user_id": current.user_id,
            "refresh_token": current.refresh_token,
        });

        let request = PreparedRequest {
            method: HttpMethod::Post,
            path: "auth/refresh".to_string(),
            url: self.refresh_url.clone(),
            headers: self.refresh_headers.clone(),
            body: Some(body.to_string()),
        };

        let (_, payload) = self.executor.execute(&request).await?;

        let access_token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::new(
                    ErrorKind::InvalidResponse,
                    "refresh response missing access_token",
                )
            })?;

        // Providers may rotate the refresh token; keep the old one when
        // the response omits it.
        let refresh_token = payload
            .get("refresh_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(&current.refresh_token);

        let user_id = payload
            .get("user_id")
            .and_then(Value::as_str)
            .unwrap_or(&current.user_id);

        Ok(CredentialBundle::new(user_id, access_token, refresh_token))
    }

    async fn replay(
        &self,
        original: &PreparedRequest,
        access_token: &str,
    ) -> Result<(u16, Value), ApiError> {
        let mut request = original.clone();
        request.headers.insert(
            AUTHORIZATION_HEADER.to_string(),
            format!("Bearer {access_token}"),
        );
        self.executor.execute(&request).await
    }
}
