#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use gigboard_api::auth::jwt::JwtConfig;
use gigboard_api::config::ServerConfig;
use gigboard_api::oauth::yandex::YandexConfig;
use gigboard_api::router::build_app_router;
use gigboard_api::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "secret123";

/// Build a test `ServerConfig` with safe defaults.
///
/// Yandex OAuth runs in demo mode with no client id, so only `demo_` codes
/// succeed and nothing leaves the process.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 30,
        },
        yandex: YandexConfig {
            demo_mode: true,
            ..Default::default()
        },
    }
}

/// Build the full application router using the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

/// POST JSON as a particular client: `User-Agent` and `X-Forwarded-For`.
pub async fn post_json_from(
    app: Router,
    uri: &str,
    body: Value,
    user_agent: &str,
    forwarded_for: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, user_agent)
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A registered account and its access token.
pub struct TestUser {
    pub id: i64,
    pub token: String,
    pub refresh_token: String,
}

/// Register through the API and return the new account's tokens.
pub async fn register(app: &Router, email: &str, full_name: &str, role: &str) -> TestUser {
    let body = serde_json::json!({
        "email": email,
        "password": TEST_PASSWORD,
        "full_name": full_name,
        "role": role,
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration of {email} failed");
    let json = body_json(response).await;
    TestUser {
        id: json["user"]["id"].as_i64().unwrap(),
        token: json["access_token"].as_str().unwrap().to_string(),
        refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub async fn register_client(app: &Router, name: &str) -> TestUser {
    register(app, &format!("{name}@example.com"), &format!("Client {name}"), "client").await
}

pub async fn register_freelancer(app: &Router, name: &str) -> TestUser {
    register(
        app,
        &format!("{name}@example.com"),
        &format!("Freelancer {name}"),
        "freelancer",
    )
    .await
}

/// Create a project as `client` and return its id.
pub async fn create_project(app: &Router, client: &TestUser, title: &str, budget: i64) -> i64 {
    let body = serde_json::json!({
        "title": title,
        "description": "A project description that is long enough",
        "category": "development",
        "budget": budget,
        "skills": ["Rust", "PostgreSQL"],
    });
    let response = post_json_auth(app.clone(), "/api/v1/projects", body, &client.token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["project"]["id"].as_i64().unwrap()
}
