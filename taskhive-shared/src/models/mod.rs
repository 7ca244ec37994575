/// Database models for Taskhive
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Registered accounts and credentials
/// - `api_token`: Bearer tokens backing authenticated sessions
/// - `task`: Per-user to-do items
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::user::{User, CreateUser};
/// use taskhive_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// let new_user = CreateUser {
///     name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```
pub mod api_token;
pub mod task;
pub mod user;
