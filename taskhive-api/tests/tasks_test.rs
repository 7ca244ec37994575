/// Integration tests for the task endpoints
///
/// These tests cover the task CRUD surface:
/// - Creation, listing, detail, update, and deletion
/// - Validation of request bodies
/// - Ownership enforcement between users
/// - Authentication requirements on every route

mod common;

use axum::http::StatusCode;
use common::{login_user, register_user, unique_email, TestContext};
use serde_json::{json, Value};

/// Creates a task via the API and returns its ID
async fn create_task(ctx: &TestContext, token: &str, body: Value) -> i64 {
    let (status, task) = ctx.send("POST", "/api/tasks", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "task creation failed: {}", task);
    task["id"].as_i64().expect("task id missing")
}

/// Test that task creation returns the bare task object
#[tokio::test]
async fn test_create_task() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_user(&ctx, &unique_email("create-task"), "secret1").await;

    let (status, task) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({
                "title": "Write report",
                "description": "Quarterly numbers",
                "due_date": "2025-07-01",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", task);
    assert!(task["id"].is_i64());
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["description"], "Quarterly numbers");
    assert_eq!(task["due_date"], "2025-07-01");
    assert_eq!(task["completed"], false);

    // Task responses are plain objects, not success envelopes
    assert!(task.get("success").is_none());
}

/// Test that optional fields default sensibly
#[tokio::test]
async fn test_create_task_minimal() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_user(&ctx, &unique_email("minimal-task"), "secret1").await;

    let (status, task) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "Just a title" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["title"], "Just a title");
    assert_eq!(task["description"], Value::Null);
    assert_eq!(task["due_date"], Value::Null);
    assert_eq!(task["completed"], false);
}

/// Test that invalid task input is rejected with per-field errors
#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_user(&ctx, &unique_email("task-validation"), "secret1").await;

    let (status, body) = ctx
        .send("POST", "/api/tasks", Some(&token), Some(json!({ "title": "" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["title"].is_array());

    let (status, body) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "x".repeat(256) })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["title"].is_array());

    // A date that does not parse fails at deserialization
    let (status, body) = ctx
        .send(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "Dated", "due_date": "not-a-date" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_array());
}

/// Test listing returns only the caller's tasks in creation order
#[tokio::test]
async fn test_list_tasks_scoped_to_owner() {
    let ctx = TestContext::new().await.unwrap();
    let alice = register_user(&ctx, &unique_email("alice"), "secret1").await;
    let bob = register_user(&ctx, &unique_email("bob"), "secret1").await;

    // Interleaved creation order
    let alice_first = create_task(&ctx, &alice, json!({ "title": "Alice one" })).await;
    let bob_only = create_task(&ctx, &bob, json!({ "title": "Bob one" })).await;
    let alice_second = create_task(&ctx, &alice, json!({ "title": "Alice two" })).await;

    let (status, body) = ctx.send("GET", "/api/tasks", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let tasks = body.as_array().expect("expected a bare array");
    let ids: Vec<i64> = tasks.iter().map(|t| t["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![alice_first, alice_second]);

    let (status, body) = ctx.send("GET", "/api/tasks", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body.as_array().expect("expected a bare array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], bob_only);
}

/// Test the full create, read, update, delete cycle of one task
#[tokio::test]
async fn test_task_crud_cycle() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_user(&ctx, &unique_email("crud"), "secret1").await;

    let id = create_task(
        &ctx,
        &token,
        json!({
            "title": "Original",
            "description": "To be cleared",
            "due_date": "2025-06-15",
        }),
    )
    .await;

    let (status, task) = ctx
        .send("GET", &format!("/api/tasks/detail/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Original");

    // Partial update: only the named fields change
    let (status, task) = ctx
        .send(
            "POST",
            &format!("/api/tasks/update/{}", id),
            Some(&token),
            Some(json!({ "completed": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["completed"], true);
    assert_eq!(task["title"], "Original");
    assert_eq!(task["description"], "To be cleared");

    // Explicit null clears the optional fields
    let (status, task) = ctx
        .send(
            "POST",
            &format!("/api/tasks/update/{}", id),
            Some(&token),
            Some(json!({ "description": null, "due_date": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["description"], Value::Null);
    assert_eq!(task["due_date"], Value::Null);
    assert_eq!(task["completed"], true);

    // Delete responds with no content
    let (status, body) = ctx
        .send("DELETE", &format!("/api/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = ctx
        .send("GET", &format!("/api/tasks/detail/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test that another user's task is forbidden while a missing one is not found
#[tokio::test]
async fn test_task_ownership_enforced() {
    let ctx = TestContext::new().await.unwrap();
    let alice = register_user(&ctx, &unique_email("owner"), "secret1").await;
    let bob = register_user(&ctx, &unique_email("intruder"), "secret1").await;

    let id = create_task(&ctx, &alice, json!({ "title": "Private" })).await;

    // Bob can see the task exists but gets no access to it
    let (status, body) = ctx
        .send("GET", &format!("/api/tasks/detail/{}", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "You do not have permission to access this resource"
    );

    let (status, _) = ctx
        .send(
            "POST",
            &format!("/api/tasks/update/{}", id),
            Some(&bob),
            Some(json!({ "completed": true })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send("DELETE", &format!("/api/tasks/{}", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The task is untouched by any of that
    let (status, task) = ctx
        .send("GET", &format!("/api/tasks/detail/{}", id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["completed"], false);

    // An ID that exists for nobody is a plain not-found
    let (status, _) = ctx
        .send("GET", "/api/tasks/detail/999999", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test that updating a task that does not exist is a not-found
#[tokio::test]
async fn test_update_missing_task() {
    let ctx = TestContext::new().await.unwrap();
    let token = register_user(&ctx, &unique_email("update-missing"), "secret1").await;

    let (status, body) = ctx
        .send(
            "POST",
            "/api/tasks/update/424242",
            Some(&token),
            Some(json!({ "completed": true })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

/// Test that every task route requires authentication
#[tokio::test]
async fn test_task_routes_require_auth() {
    let ctx = TestContext::new().await.unwrap();

    let attempts = [
        ("GET", "/api/tasks".to_string(), None),
        ("POST", "/api/tasks".to_string(), Some(json!({ "title": "x" }))),
        ("GET", "/api/tasks/detail/1".to_string(), None),
        (
            "POST",
            "/api/tasks/update/1".to_string(),
            Some(json!({ "completed": true })),
        ),
        ("DELETE", "/api/tasks/1".to_string(), None),
    ];

    for (method, uri, body) in attempts {
        let (status, _) = ctx.send(method, &uri, None, body).await;
        assert_eq!(
            status,
            StatusCode::UNAUTHORIZED,
            "{} {} let an unauthenticated request through",
            method,
            uri
        );
    }
}

/// Test a realistic multi-session scenario across two devices
#[tokio::test]
async fn test_two_device_scenario() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("two-devices");

    // Device one registers and creates a task
    let device_one = register_user(&ctx, &email, "secret1").await;
    let id = create_task(&ctx, &device_one, json!({ "title": "Shared task" })).await;

    // Device two logs in and sees the same task
    let device_two = login_user(&ctx, &email, "secret1").await;
    let (status, task) = ctx
        .send(
            "GET",
            &format!("/api/tasks/detail/{}", id),
            Some(&device_two),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Shared task");

    // Device two deletes it; device one observes the deletion
    let (status, _) = ctx
        .send("DELETE", &format!("/api/tasks/{}", id), Some(&device_two), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx
        .send(
            "GET",
            &format!("/api/tasks/detail/{}", id),
            Some(&device_one),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Device one signs out everywhere, which also kills device two
    let (status, _) = ctx
        .send("POST", "/api/logout-all", Some(&device_one), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.send("GET", "/api/tasks", Some(&device_two), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
