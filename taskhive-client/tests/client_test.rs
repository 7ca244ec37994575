/// End-to-end tests for the client
///
/// Each test boots the real API server on an ephemeral port with a fresh
/// in-memory database, then drives it through `TaskhiveClient` over actual
/// HTTP. Covers session persistence, token lifecycle, and task CRUD as a
/// caller of the published crate would use them.
use std::path::PathBuf;

use taskhive_api::app::{build_router, AppState};
use taskhive_api::config::{ApiConfig, Config, DatabaseConfig, TokenConfig};
use taskhive_client::{
    ClientError, FileTokenCache, MemoryTokenCache, NewTask, Registration, TaskPatch,
    TaskhiveClient,
};
use taskhive_shared::db::migrations::run_migrations;
use taskhive_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use uuid::Uuid;

/// Boots an API server on an ephemeral port and returns its base URL
async fn spawn_server() -> anyhow::Result<String> {
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

    let app = build_router(AppState::new(db, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    Ok(format!("http://{}", addr))
}

/// Builds a client with an in-memory token cache
fn memory_client(base_url: &str) -> TaskhiveClient {
    TaskhiveClient::new(base_url, Box::new(MemoryTokenCache::new()))
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

fn registration(email: &str, password: &str) -> Registration {
    Registration {
        name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: password.to_string(),
    }
}

fn temp_token_path() -> PathBuf {
    std::env::temp_dir().join(format!("taskhive-client-e2e-{}.token", Uuid::new_v4()))
}

/// Test that the health endpoint answers without a session
#[tokio::test]
async fn test_health_endpoint() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let client = memory_client(&base_url);

    let health = client.health().await.expect("health check failed");

    assert_eq!(health.status, "healthy");
    assert_eq!(health.database, "connected");
    assert!(!health.version.is_empty());
}

/// Test registration, identity lookup, and logout as one session lifecycle
#[tokio::test]
async fn test_register_me_logout_flow() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let mut client = memory_client(&base_url);
    let email = unique_email("lifecycle");

    assert!(!client.session().is_authenticated());

    let user = client
        .register(&registration(&email, "password123"))
        .await
        .expect("registration failed");

    assert!(client.session().is_authenticated());
    assert_eq!(user.email, email);
    assert_eq!(user.name, "Test");

    let me = client.me().await.expect("me failed");
    assert_eq!(me.id, user.id);

    client.logout().await.expect("logout failed");
    assert!(!client.session().is_authenticated());

    // Without a token the client refuses before touching the network
    let err = client.me().await.expect_err("me should fail after logout");
    assert!(matches!(err, ClientError::NotAuthenticated));
}

/// Test login with good and bad credentials
#[tokio::test]
async fn test_login() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let email = unique_email("login");

    let mut client = memory_client(&base_url);
    client
        .register(&registration(&email, "password123"))
        .await
        .expect("registration failed");
    client.logout().await.expect("logout failed");

    let err = client
        .login(&email, "wrong-password")
        .await
        .expect_err("login should fail");
    assert!(err.is_unauthenticated());
    assert!(!client.session().is_authenticated());

    let user = client
        .login(&email, "password123")
        .await
        .expect("login failed");
    assert_eq!(user.email, email);
    assert!(client.session().is_authenticated());
}

/// Test the full task CRUD cycle over HTTP
#[tokio::test]
async fn test_task_round_trip() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let mut client = memory_client(&base_url);
    client
        .register(&registration(&unique_email("tasks"), "password123"))
        .await
        .expect("registration failed");

    assert!(client.list_tasks().await.expect("list failed").is_empty());

    let created = client
        .create_task(&NewTask {
            title: "Write the report".to_string(),
            description: Some("Quarterly numbers".to_string()),
            due_date: Some(chrono::NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
        })
        .await
        .expect("create failed");

    assert_eq!(created.title, "Write the report");
    assert!(!created.completed);

    let fetched = client.get_task(created.id).await.expect("get failed");
    assert_eq!(fetched.description.as_deref(), Some("Quarterly numbers"));

    // Partial update leaves untouched fields alone
    let updated = client
        .update_task(
            created.id,
            &TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");
    assert!(updated.completed);
    assert_eq!(updated.description.as_deref(), Some("Quarterly numbers"));

    // An explicit null clears the nullable fields
    let cleared = client
        .update_task(
            created.id,
            &TaskPatch {
                description: Some(None),
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("clearing update failed");
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.due_date, None);

    client.delete_task(created.id).await.expect("delete failed");

    let err = client
        .get_task(created.id)
        .await
        .expect_err("task should be gone");
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 404),
        other => panic!("unexpected error: {}", other),
    }
}

/// Test that refresh swaps the stored token without dropping the session
#[tokio::test]
async fn test_refresh_rotates_token() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let mut client = memory_client(&base_url);
    client
        .register(&registration(&unique_email("refresh"), "password123"))
        .await
        .expect("registration failed");

    let before = client.session().token().map(str::to_string);
    client.refresh().await.expect("refresh failed");
    let after = client.session().token().map(str::to_string);

    assert!(before.is_some() && after.is_some());
    assert_ne!(before, after);

    // The rotated token replaces the old one instead of piling up
    let tokens = client.list_tokens().await.expect("list tokens failed");
    assert_eq!(tokens.len(), 1);

    client.me().await.expect("session should survive refresh");
}

/// Test listing and revoking tokens across two live sessions
#[tokio::test]
async fn test_token_management() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let email = unique_email("tokens");

    let mut first = memory_client(&base_url);
    first
        .register(&registration(&email, "password123"))
        .await
        .expect("registration failed");

    let mut second = memory_client(&base_url);
    second
        .login(&email, "password123")
        .await
        .expect("login failed");

    // Newest first, so the second session's token leads the list
    let tokens = first.list_tokens().await.expect("list tokens failed");
    assert_eq!(tokens.len(), 2);
    assert!(tokens[0].id > tokens[1].id);

    first
        .revoke_token(tokens[0].id)
        .await
        .expect("revoke failed");

    let err = second.me().await.expect_err("revoked session should fail");
    assert!(err.is_unauthenticated());
    assert!(!second.session().is_authenticated());

    assert_eq!(first.list_tokens().await.expect("list failed").len(), 1);

    let err = first
        .revoke_token(999_999)
        .await
        .expect_err("unknown token should 404");
    match err {
        ClientError::Api { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Token not found");
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Test that a file cache restores the session for a brand-new client
#[tokio::test]
async fn test_file_cache_restores_session() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let path = temp_token_path();
    let email = unique_email("cache");

    let mut client = TaskhiveClient::new(&base_url, Box::new(FileTokenCache::new(&path)));
    let user = client
        .register(&registration(&email, "password123"))
        .await
        .expect("registration failed");
    drop(client);

    let mut restored =
        TaskhiveClient::with_cached_session(&base_url, Box::new(FileTokenCache::new(&path)))
            .expect("failed to restore session");

    assert!(restored.session().is_authenticated());
    let me = restored.me().await.expect("restored session rejected");
    assert_eq!(me.id, user.id);

    restored.logout().await.expect("logout failed");

    // Logout wiped the cache, so the next restore starts signed out
    let signed_out =
        TaskhiveClient::with_cached_session(&base_url, Box::new(FileTokenCache::new(&path)))
            .expect("failed to build client");
    assert!(!signed_out.session().is_authenticated());

    let _ = std::fs::remove_file(&path);
}

/// Test that a server-side revocation clears the local session on first use
#[tokio::test]
async fn test_rejected_token_clears_session() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let email = unique_email("rejected");

    let mut first = memory_client(&base_url);
    first
        .register(&registration(&email, "password123"))
        .await
        .expect("registration failed");

    let mut second = memory_client(&base_url);
    second
        .login(&email, "password123")
        .await
        .expect("login failed");

    first.logout_all().await.expect("logout-all failed");
    assert!(!first.session().is_authenticated());

    let err = second.me().await.expect_err("revoked session should fail");
    assert!(err.is_unauthenticated());
    assert!(!second.session().is_authenticated());
}

/// Test that validation failures surface per-field errors
#[tokio::test]
async fn test_validation_errors_surface() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let mut client = memory_client(&base_url);

    let err = client
        .register(&registration(&unique_email("weak"), "short"))
        .await
        .expect_err("weak password should be rejected");

    match &err {
        ClientError::Api { status, .. } => assert_eq!(*status, 422),
        other => panic!("unexpected error: {}", other),
    }

    let errors = err.field_errors().expect("expected field errors");
    assert!(errors.contains_key("password"));
    assert!(!client.session().is_authenticated());
}

/// Test password change keeping the changing session alive
#[tokio::test]
async fn test_change_password() {
    let base_url = spawn_server().await.expect("failed to spawn server");
    let email = unique_email("password");

    let mut first = memory_client(&base_url);
    first
        .register(&registration(&email, "password123"))
        .await
        .expect("registration failed");

    let mut second = memory_client(&base_url);
    second
        .login(&email, "password123")
        .await
        .expect("login failed");

    first
        .change_password("password123", "newpassword456", "newpassword456")
        .await
        .expect("password change failed");

    // The session that changed the password keeps working
    first.me().await.expect("changing session was revoked");

    // Every other session is gone
    let err = second.me().await.expect_err("old session should be dead");
    assert!(err.is_unauthenticated());

    let mut fresh = memory_client(&base_url);
    fresh
        .login(&email, "newpassword456")
        .await
        .expect("login with new password failed");
}
