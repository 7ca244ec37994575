/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory test database setup
/// - Application router construction
/// - Registration and login helpers
/// - Request/response helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use taskhive_api::app::{build_router, AppState};
use taskhive_api::config::{ApiConfig, Config, DatabaseConfig, TokenConfig};
use taskhive_shared::db::migrations::run_migrations;
use taskhive_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context backed by a fresh in-memory database
    pub async fn new() -> anyhow::Result<Self> {
        let db = create_pool(PoolConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            token: TokenConfig { ttl_seconds: None },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Sends a request and returns the status plus the parsed JSON body
    ///
    /// A bearer header is added when `token` is given. An empty or non-JSON
    /// response body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("failed to build request"),
            None => builder
                .body(Body::empty())
                .expect("failed to build request"),
        };

        let response = self
            .app
            .clone()
            .call(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }
}

/// Registers a user and returns the session token issued with the account
pub async fn register_user(ctx: &TestContext, email: &str, password: &str) -> String {
    let (status, body) = ctx
        .send(
            "POST",
            "/api/register",
            None,
            Some(json!({
                "name": "Test",
                "last_name": "User",
                "email": email,
                "password": password,
                "password_confirmation": password,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body["token"].as_str().expect("token missing").to_string()
}

/// Logs a user in and returns the fresh session token
pub async fn login_user(ctx: &TestContext, email: &str, password: &str) -> String {
    let (status, body) = ctx
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("token missing").to_string()
}

/// Generates an email address unique to one test run
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
