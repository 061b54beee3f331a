#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use jobroom_api::auth::jwt::{issue, JwtConfig};
use jobroom_api::config::ServerConfig;
use jobroom_api::router::build_app_router;
use jobroom_api::state::AppState;
use jobroom_core::roles::{Identity, Role};
use jobroom_core::types::{new_id, Id};

/// Build a test `ServerConfig` with safe defaults.
///
/// The rate limit budget is large enough that ordinary tests never hit it.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        rate_limit_max_requests: 10_000,
        rate_limit_window_secs: 60,
        ws_max_frame_bytes: 64 * 1024,
        ws_outbound_buffer: 64,
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config())
}

/// The production router over `state`, middleware stack included.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state)
}

/// Serve the app on an ephemeral local port. Needed for realtime upgrades,
/// which `oneshot` cannot drive.
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let app = build_test_app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

// ---------------------------------------------------------------------------
// Callers
// ---------------------------------------------------------------------------

/// A signed-in user for tests: id plus a valid bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Id,
    pub token: String,
}

pub fn user(state: &AppState, role: Role) -> TestUser {
    let identity = Identity::new(new_id(), role);
    let token = issue(&identity, &state.config.jwt).unwrap();
    TestUser {
        id: identity.user_id,
        token,
    }
}

pub fn client(state: &AppState) -> TestUser {
    user(state, Role::Client)
}

pub fn freelancer(state: &AppState) -> TestUser {
    user(state, Role::Freelancer)
}

pub fn admin(state: &AppState) -> TestUser {
    user(state, Role::Admin)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send a GET request, optionally authenticated.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None, &[]).await
}

pub async fn get_as(app: Router, uri: &str, who: &TestUser) -> Response<Body> {
    send(app, Method::GET, uri, Some(who), None, &[]).await
}

/// POST a JSON body as `who`.
pub async fn post_json(app: Router, uri: &str, who: &TestUser, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(who), Some(body), &[]).await
}

/// Build and send one request through the router.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    who: Option<&TestUser>,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(who) = who {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", who.token));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Create a job as `owner` through the API and return its id.
pub async fn create_job(app: Router, owner: &TestUser, budget: f64) -> String {
    let response = post_json(
        app,
        "/api/v1/jobs",
        owner,
        serde_json::json!({
            "title": "Logo design",
            "description": "A clean wordmark",
            "category": "design",
            "budget": budget,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}
