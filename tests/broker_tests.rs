//! Session broker tests against a wiremock Azure session endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use realtime_relay::core::{AzureCredential, BrokerError, SessionBroker, StaticTokenProvider};
use realtime_relay::{ServerConfig, routes, state::AppState};

const SESSION_PATH: &str = "/openai/realtimeapi/sessions";

fn broker(server: &MockServer, credential: AzureCredential) -> SessionBroker {
    SessionBroker::new(
        format!("{}{SESSION_PATH}", server.uri()),
        credential,
        Duration::from_secs(5),
    )
    .unwrap()
}

fn session_body() -> Value {
    json!({
        "id": "sess_abc123",
        "object": "realtime.session",
        "model": "gpt-realtime",
        "client_secret": {"value": "ek_ephemeral", "expires_at": 1_760_000_000}
    })
}

#[tokio::test]
async fn test_create_session_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(header_matcher("api-key", "secret-key"))
        .and(body_json(json!({"model": "gpt-realtime", "voice": "verse"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let grant = broker(&server, AzureCredential::api_key("secret-key"))
        .create_session("gpt-realtime", "verse")
        .await
        .unwrap();

    assert_eq!(grant.session_id, "sess_abc123");
    assert_eq!(grant.ephemeral_key, "ek_ephemeral");
    assert_eq!(grant.expires_at, Some(1_760_000_000));
}

#[tokio::test]
async fn test_create_session_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(header_matcher("authorization", "Bearer aad-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let credential = AzureCredential::bearer(Arc::new(StaticTokenProvider::new("aad-token")));
    let grant = broker(&server, credential)
        .create_session("gpt-realtime", "alloy")
        .await
        .unwrap();

    assert_eq!(grant.session_id, "sess_abc123");
}

#[tokio::test]
async fn test_upstream_rejection_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid subscription key"))
        .mount(&server)
        .await;

    let err = broker(&server, AzureCredential::api_key("wrong"))
        .create_session("gpt-realtime", "alloy")
        .await
        .unwrap_err();

    match err {
        BrokerError::Upstream { status, body } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "invalid subscription key");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_client_secret_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "sess_1"})))
        .mount(&server)
        .await;

    let err = broker(&server, AzureCredential::api_key("key"))
        .create_session("gpt-realtime", "alloy")
        .await
        .unwrap_err();

    assert!(matches!(err, BrokerError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = broker(&server, AzureCredential::api_key("key"))
        .create_session("gpt-realtime", "alloy")
        .await
        .unwrap_err();

    assert!(matches!(err, BrokerError::MalformedResponse(_)));
}

async fn session_app(server: &MockServer) -> axum::Router {
    let mut config = ServerConfig::default();
    config.realtime_session_url = Some(format!("{}{SESSION_PATH}", server.uri()));
    config.realtime_api_key = Some("secret-key".into());
    config.webrtc_url = Some("https://swedencentral.realtimeapi-preview.ai.azure.com/v1/realtimertc".into());
    routes::create_app_router(AppState::new(config).await)
}

fn session_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_session_route_uses_configured_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(body_json(json!({"model": "gpt-realtime", "voice": "alloy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = session_app(&server)
        .await
        .oneshot(session_request(json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await,
        json!({
            "session_id": "sess_abc123",
            "ephemeral_key": "ek_ephemeral",
            "webrtc_url": "https://swedencentral.realtimeapi-preview.ai.azure.com/v1/realtimertc",
            "deployment": "gpt-realtime",
            "voice": "alloy",
            "expires_at": 1_760_000_000
        })
    );
}

#[tokio::test]
async fn test_session_route_honours_request_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(body_json(json!({"model": "gpt-4o-realtime", "voice": "shimmer"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = session_app(&server)
        .await
        .oneshot(session_request(
            json!({"deployment": "gpt-4o-realtime", "voice": "shimmer"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["deployment"], "gpt-4o-realtime");
    assert_eq!(body["voice"], "shimmer");
}

#[tokio::test]
async fn test_session_route_passes_upstream_status_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let response = session_app(&server)
        .await
        .oneshot(session_request(json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response_json(response).await,
        json!({"detail": "rate limited"})
    );
}

#[tokio::test]
async fn test_session_route_malformed_response_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let response = session_app(&server)
        .await
        .oneshot(session_request(json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response_json(response).await,
        json!({"detail": "Malformed session response from Azure"})
    );
}
