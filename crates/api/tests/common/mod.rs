//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use gigboard_api::auth::jwt::{issue_token, JwtConfig};
use gigboard_api::config::ServerConfig;
use gigboard_api::router::build_app_router;
use gigboard_api::state::AppState;
use gigboard_core::roles::{Actor, ROLE_ADMIN, ROLE_CLIENT, ROLE_FREELANCER};
use gigboard_core::types::DbId;
use gigboard_db::models::user::CreateUser;
use gigboard_db::repositories::UserRepo;
use gigboard_events::{BusNotifier, EventBus};

pub const TEST_SECRET: &str = "integration-test-secret-long-enough";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub fn test_state(pool: PgPool, event_bus: Arc<EventBus>) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        notifier: Arc::new(BusNotifier::new(Arc::clone(&event_bus))),
        event_bus,
    }
}

/// The full application router, with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(
        test_state(pool, Arc::new(EventBus::default())),
        &test_config(),
    )
}

/// A provisioned user and a bearer token for them.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: DbId,
    pub token: String,
}

pub async fn provision(pool: &PgPool, role: &str, name: &str) -> TestUser {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{name}@example.com"),
            display_name: name.to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();
    TestUser {
        id: user.id,
        token: token_for(user.id, role),
    }
}

pub async fn client(pool: &PgPool, name: &str) -> TestUser {
    provision(pool, ROLE_CLIENT, name).await
}

pub async fn freelancer(pool: &PgPool, name: &str) -> TestUser {
    provision(pool, ROLE_FREELANCER, name).await
}

pub async fn admin(pool: &PgPool, name: &str) -> TestUser {
    provision(pool, ROLE_ADMIN, name).await
}

pub fn token_for(user_id: DbId, role: &str) -> String {
    issue_token(&Actor::new(user_id, role), &test_config().jwt).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, user: &TestUser) -> Response<Body> {
    send(app, Method::GET, uri, Some(&user.token), None).await
}

pub async fn get_anonymous(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_with_token(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: Router, uri: &str, user: &TestUser) -> Response<Body> {
    send(app, Method::POST, uri, Some(&user.token), None).await
}

pub async fn post_json(app: Router, uri: &str, user: &TestUser, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(&user.token), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, user: &TestUser, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(&user.token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, user: &TestUser) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(&user.token), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Post a project as `owner` and return its id.
pub async fn post_project(app: Router, owner: &TestUser) -> DbId {
    let response = post_json(
        app,
        "/api/v1/projects",
        owner,
        serde_json::json!({
            "title": "Landing page",
            "description": "Marketing site for a launch",
            "skills": ["rust", "html"],
            "budget_min": 10_000,
            "budget_max": 50_000
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Bid on a project and return the proposal id.
pub async fn bid(app: Router, project_id: DbId, bidder: &TestUser, amount: i64) -> DbId {
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/proposals"),
        bidder,
        serde_json::json!({
            "cover_letter": "I have shipped many of these",
            "bid_amount": amount,
            "estimated_duration": "one_to_two_weeks"
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
