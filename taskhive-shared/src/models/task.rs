/// Task model and database operations
///
/// This module provides the Task model for the per-user to-do items the API
/// serves. Every task has exactly one owner; list queries are scoped to that
/// owner in SQL so other users' rows are never materialized.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     description TEXT,
///     due_date TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::task::{Task, CreateTask};
/// use taskhive_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: 1,
///     title: "Buy groceries".to_string(),
///     description: None,
///     due_date: None,
/// }).await?;
///
/// let mine = Task::list_for_user(&pool, 1).await?;
/// assert_eq!(mine.len(), 1);
/// # Ok(())
/// # }
/// ```
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

/// Task model representing a to-do item
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title (required, at most 255 characters)
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Optional due date (calendar date, no time component)
    pub due_date: Option<NaiveDate>,

    /// Whether the task is done
    pub completed: bool,

    /// Owning user
    pub user_id: i64,
}

/// Input for creating a new task
///
/// `completed` is not accepted at creation; new tasks always start open.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub user_id: i64,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Input for updating an existing task
///
/// All fields are optional; only provided fields are written. The nullable
/// columns use a double Option: the outer level is "was the field sent",
/// the inner level is the new value, so `Some(None)` clears a column while
/// `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,

    /// New completion state
    pub completed: Option<bool>,
}

impl UpdateTask {
    /// True when no field was provided
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }
}

impl Task {
    /// Creates a new task
    ///
    /// # Returns
    ///
    /// The newly created task with generated ID
    ///
    /// # Errors
    ///
    /// Returns an error if the owning user does not exist (foreign key) or
    /// the database operation fails
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, title, description, due_date, completed, user_id
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    ///
    /// The lookup is not owner-scoped: handlers need the row to decide
    /// between "not found" and "found but not yours".
    ///
    /// # Returns
    ///
    /// The task if found, None otherwise
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, completed, user_id
            FROM tasks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks belonging to a user
    ///
    /// Ownership is enforced in the WHERE clause, never by filtering rows
    /// after the fact.
    pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, completed, user_id
            FROM tasks
            WHERE user_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates an existing task
    ///
    /// Only fields present in `data` are written; everything else keeps its
    /// stored value. An empty update returns the task unchanged.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        // Build dynamic update query based on which fields are present
        let mut assignments: Vec<String> = Vec::new();
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            assignments.push(format!("title = ?{}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ?{}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            assignments.push(format!("due_date = ?{}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            assignments.push(format!("completed = ?{}", bind_count));
        }

        let query = format!(
            "UPDATE tasks SET {} WHERE id = ?1 \
             RETURNING id, title, description, due_date, completed, user_id",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks belonging to a user
    pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
