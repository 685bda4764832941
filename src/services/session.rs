//! Session operations: login, register, logout.

use serde_json::{json, Value};

use crate::auth::CredentialBundle;
use crate::client::{ApiRequest, PlayforgeClient};
use crate::errors::{ApiError, ApiResult, ErrorKind};

pub(crate) const LOGIN_PATH: &str = "/v1/auth/login";
pub(crate) const REGISTER_PATH: &str = "/v1/auth/register";
/// Default refresh endpoint, also used by the refresh coordinator.
pub(crate) const REFRESH_PATH: &str = "/v1/auth/refresh";
pub(crate) const LOGOUT_PATH: &str = "/v1/auth/logout";

/// Session endpoints.
pub struct SessionService<'a> {
    client: &'a PlayforgeClient,
}

impl<'a> SessionService<'a> {
    pub(crate) fn new(client: &'a PlayforgeClient) -> Self {
        Self { client }
    }

    /// Authenticates and stores the returned credential bundle.
    pub async fn login(&self, user_id: &str, password: &str) -> ApiResult {
        if user_id.is_empty() {
            return Err(ApiError::new(
                ErrorKind::ValidationError,
                "user_id must not be empty",
            ));
        }

        let path = self
            .client
            .config()
            .path_template("session.login", LOGIN_PATH)
            .to_string();
        let data = self
            .client
            .execute(
                ApiRequest::post(path)
                    .with_body(json!({"user_id": user_id, "password": password})),
            )
            .await?;

        self.store_session(user_id, &data)?;
        Ok(data)
    }

    /// Creates an account and stores the returned credential bundle.
    pub async fn register(&self, user_id: &str, password: &str) -> ApiResult {
        if user_id.is_empty() {
            return Err(ApiError::new(
                ErrorKind::ValidationError,
                "user_id must not be empty",
            ));
        }

        let path = self
            .client
            .config()
            .path_template("session.register", REGISTER_PATH)
            .to_string();
        let data = self
            .client
            .execute(
                ApiRequest::post(path)
                    .with_body(json!({"user_id": user_id, "password": password})),
            )
            .await?;

        self.store_session(user_id, &data)?;
        Ok(data)
    }

    /// Ends the session.
    ///
    /// Best-effort: the server-side revoke may fail, but local credentials
    /// are cleared either way and the operation reports success.
    pub async fn logout(&self) -> ApiResult {
        let path = self
            .client
            .config()
            .path_template("session.logout", LOGOUT_PATH)
            .to_string();

        if let Err(error) = self.client.execute(ApiRequest::post(path)).await {
            tracing::warn!(error = %error, "server-side logout failed, clearing local session");
        }

        self.client.token_store().clear();
        self.client.events().auth_state_changed(false);
        Ok(Value::Object(serde_json::Map::new()))
    }

    fn store_session(&self, fallback_user_id: &str, data: &Value) -> Result<(), ApiError> {
        let access_token = data
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::new(
                    ErrorKind::InvalidResponse,
                    "auth response missing access_token",
                )
            })?;
        let refresh_token = data
            .get("refresh_token")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let user_id = data
            .get("user_id")
            .and_then(Value::as_str)
            .unwrap_or(fallback_user_id);

        self.client
            .token_store()
            .save(CredentialBundle::new(user_id, access_token, refresh_token));
        self.client.events().auth_state_changed(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{InMemoryTokenStore, TokenStore};
    use crate::config::ClientConfig;
    use crate::mocks::MockTransport;
    use crate::observability::{ClientEvent, InMemoryEventSink};
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use std::sync::Arc;

    struct Harness {
        client: PlayforgeClient,
        transport: Arc<MockTransport>,
        store: Arc<InMemoryTokenStore>,
        events: Arc<InMemoryEventSink>,
    }

    fn harness() -> Harness {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(InMemoryTokenStore::new());
        let events = Arc::new(InMemoryEventSink::new());
        let config = ClientConfig::builder()
            .project_key(SecretString::new("pf-proj-test".to_string()))
            .base_url("https://api.test")
            .max_retries(0)
            .build()
            .unwrap();
        let client = PlayforgeClient::with_dependencies(
            config,
            transport.clone(),
            store.clone(),
            events.clone(),
        )
        .unwrap();
        Harness {
            client,
            transport,
            store,
            events,
        }
    }

    #[tokio::test]
    async fn test_login_stores_bundle() {
        let h = harness();
        h.transport.enqueue(
            200,
            r#"{"user_id": "player-1", "access_token": "a", "refresh_token": "r"}"#,
        );

        h.client.session().login("player-1", "pw").await.unwrap();

        assert_eq!(
            h.store.load(),
            CredentialBundle::new("player-1", "a", "r")
        );
        assert!(h.events.events().contains(&ClientEvent::AuthStateChanged {
            authenticated: true
        }));

        let requests = h.transport.requests();
        assert_eq!(requests[0].url, "https://api.test/v1/auth/login");
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"password":"pw","user_id":"player-1"}"#)
        );
    }

    #[tokio::test]
    async fn test_login_rejects_empty_user_id() {
        let h = harness();

        let err = h.client.session().login("", "pw").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_login_without_tokens_is_invalid_response() {
        let h = harness();
        h.transport.enqueue(200, r#"{"user_id": "player-1"}"#);

        let err = h.client.session().login("player-1", "pw").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert!(!h.store.load().has_tokens());
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_revoke_fails() {
        let h = harness();
        h.store.save(CredentialBundle::new("u", "a", "r"));
        h.transport.enqueue(500, "");

        let result = h.client.session().logout().await;

        assert!(result.is_ok());
        assert!(!h.store.load().has_tokens());
        assert!(h.events.events().contains(&ClientEvent::AuthStateChanged {
            authenticated: false
        }));
    }
}
