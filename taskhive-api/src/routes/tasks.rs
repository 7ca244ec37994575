/// Task endpoints
///
/// Every route requires a bearer token, and every task belongs to exactly
/// one user. Reads and writes are checked against the caller's identity and
/// the presenting token's abilities.
///
/// # Endpoints
///
/// - `GET /api/tasks` - List the caller's tasks
/// - `POST /api/tasks` - Create a task
/// - `GET /api/tasks/detail/:id` - Fetch one task
/// - `POST /api/tasks/update/:id` - Update fields of a task
/// - `DELETE /api/tasks/:id` - Delete a task
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use taskhive_shared::{
    auth::guard::{require_ability, require_owner, AuthSession},
    models::task::{CreateTask, Task, UpdateTask},
};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional due date as `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// Fields that are absent from the body stay unchanged; `description` and
/// `due_date` sent as explicit `null` are cleared. The two meanings are told
/// apart by the nested `Option`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    /// New description; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New due date; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    /// Completion flag
    pub completed: Option<bool>,
}

/// Deserializes a present field into `Some(value)`, so that an absent field
/// (`None` via the serde default) stays distinguishable from an explicit
/// `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Loads a task and verifies the caller owns it
///
/// A missing task is a 404; an existing task owned by someone else is a 403.
/// The lookup is by bare ID, so the two cases are genuinely distinct.
async fn fetch_owned(state: &AppState, auth: &AuthSession, id: i64) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_owner(auth, task.user_id)?;

    Ok(task)
}

/// List tasks
///
/// Returns the caller's tasks in creation order. Other users' tasks never
/// appear, whatever their IDs.
///
/// # Endpoint
///
/// ```text
/// GET /api/tasks
/// Authorization: Bearer <token>
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<Vec<Task>>> {
    require_ability(&auth, "tasks:read")?;

    let tasks = Task::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "title": "Write report",
///   "description": "Quarterly numbers",
///   "due_date": "2025-07-01"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    AppJson(req): AppJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    require_ability(&auth, "tasks:write")?;
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::debug!(user_id = auth.user_id, task_id = task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch one task
///
/// # Endpoint
///
/// ```text
/// GET /api/tasks/detail/:id
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The task belongs to another user
/// - `404 Not Found`: No task with this ID
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    require_ability(&auth, "tasks:read")?;

    let task = fetch_owned(&state, &auth, id).await?;

    Ok(Json(task))
}

/// Update a task
///
/// Partial update: only the fields present in the body change.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks/update/:id
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "completed": true,
///   "due_date": null
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The task belongs to another user
/// - `404 Not Found`: No task with this ID
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    require_ability(&auth, "tasks:write")?;
    req.validate()?;

    // Ownership is settled before anything is written
    fetch_owned(&state, &auth, id).await?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            completed: req.completed,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::debug!(user_id = auth.user_id, task_id = id, "Task updated");

    Ok(Json(task))
}

/// Delete a task
///
/// # Endpoint
///
/// ```text
/// DELETE /api/tasks/:id
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The task belongs to another user
/// - `404 Not Found`: No task with this ID
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_ability(&auth, "tasks:delete")?;

    fetch_owned(&state, &auth, id).await?;

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        // Lost a race with a concurrent delete
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::debug!(user_id = auth.user_id, task_id = id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
