//! End-to-end credential refresh behavior against a real HTTP server.

use integrations_playforge::{
    ApiRequest, BackoffPolicy, ClientConfig, ClientEvent, CredentialBundle, DispatchMode,
    ErrorKind, InMemoryEventSink, InMemoryTokenStore, PlayforgeClient, ReqwestTransport,
    TokenStore,
};
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestClient {
    client: Arc<PlayforgeClient>,
    store: Arc<InMemoryTokenStore>,
    events: Arc<InMemoryEventSink>,
}

fn build_client(server: &MockServer, mode: DispatchMode) -> TestClient {
    let config = ClientConfig::builder()
        .project_key(SecretString::new("pf-proj-test".to_string()))
        .base_url(server.uri())
        .request_timeout(Duration::from_secs(2))
        .max_retries(0)
        .backoff(BackoffPolicy {
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            multiplier: 2.0,
            jitter_fraction: 0.0,
        })
        .dispatch_mode(mode)
        .build()
        .unwrap();

    let store = Arc::new(InMemoryTokenStore::with_bundle(CredentialBundle::new(
        "player-1", "stale", "refresh-1",
    )));
    let events = Arc::new(InMemoryEventSink::new());
    let client = Arc::new(
        PlayforgeClient::with_dependencies(
            config,
            Arc::new(ReqwestTransport::new().unwrap()),
            store.clone(),
            events.clone(),
        )
        .unwrap(),
    );

    TestClient {
        client,
        store,
        events,
    }
}

async fn mount_refresh_success(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "player-1",
            "access_token": "fresh",
            "refresh_token": "refresh-2",
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_storage_by_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/storage/slot"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/slot"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_expired_token_is_refreshed_transparently() {
    let server = MockServer::start().await;
    mount_refresh_success(&server, 1).await;
    mount_storage_by_token(&server).await;

    let t = build_client(&server, DispatchMode::Serialized);
    let data = t
        .client
        .execute(ApiRequest::get("/v1/storage/slot"))
        .await
        .unwrap();

    assert_eq!(data, json!({"value": 42}));
    assert_eq!(
        t.store.load(),
        CredentialBundle::new("player-1", "fresh", "refresh-2")
    );
    assert!(t
        .events
        .events()
        .contains(&ClientEvent::TokenRefreshed { ok: true }));

    // Refresh calls never carry an Authorization header.
    let refresh_calls: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/v1/auth/refresh")
        .collect();
    assert_eq!(refresh_calls.len(), 1);
    assert!(!refresh_calls[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_concurrent_unauthorized_single_flights_the_refresh() {
    let server = MockServer::start().await;
    mount_refresh_success(&server, 1).await;
    mount_storage_by_token(&server).await;

    let t = build_client(&server, DispatchMode::Parallel);

    let requests = (0..4).map(|_| t.client.execute(ApiRequest::get("/v1/storage/slot")));
    for result in futures::future::join_all(requests).await {
        assert_eq!(result.unwrap(), json!({"value": 42}));
    }

    // The expect(1) on the refresh mount verifies single-flight on drop;
    // assert it explicitly as well.
    let refresh_calls = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/v1/auth/refresh")
        .count();
    assert_eq!(refresh_calls, 1);
}

#[tokio::test]
async fn test_refresh_failure_clears_session_and_escalates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "refresh token revoked"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/slot"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(&server)
        .await;

    let t = build_client(&server, DispatchMode::Serialized);
    let err = t
        .client
        .execute(ApiRequest::get("/v1/storage/slot"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unauthorized);
    let details = err.details.expect("refresh failure details");
    assert_eq!(details["message"], "refresh token revoked");

    assert!(!t.store.load().has_tokens());
    let events = t.events.events();
    assert!(events.contains(&ClientEvent::TokenRefreshed { ok: false }));
    assert!(events.contains(&ClientEvent::AuthStateChanged {
        authenticated: false
    }));
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_refresh_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/slot"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(&server)
        .await;

    let t = build_client(&server, DispatchMode::Serialized);
    t.store
        .save(CredentialBundle::new("player-1", "stale", ""));

    let err = t
        .client
        .execute(ApiRequest::get("/v1/storage/slot"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.status, 401);
}

#[tokio::test]
async fn test_replay_unauthorized_does_not_loop() {
    let server = MockServer::start().await;

    // Refresh succeeds, but the backend still rejects the new token.
    mount_refresh_success(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/storage/slot"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(&server)
        .await;

    let t = build_client(&server, DispatchMode::Serialized);
    let err = t
        .client
        .execute(ApiRequest::get("/v1/storage/slot"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unauthorized);
    // Original + replay, and exactly one refresh in between.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}
