//! # Taskhive Client Library
//!
//! Typed client for the Taskhive REST API. Wraps the wire contract in
//! methods on [`TaskhiveClient`], keeps the bearer token in a single
//! [`Session`], and persists it through a [`TokenCache`] so a login
//! survives process restarts.
//!
//! ## Module Organization
//!
//! - `client`: The API client and its request/response types
//! - `session`: Client-side session state over a token cache
//! - `cache`: Token persistence (file-backed and in-memory)
//! - `error`: The client error type
//!
//! ## Usage
//!
//! ```no_run
//! use taskhive_client::{FileTokenCache, TaskhiveClient};
//!
//! # async fn run() -> Result<(), taskhive_client::ClientError> {
//! let cache = Box::new(FileTokenCache::new("/tmp/taskhive-token"));
//! let mut client = TaskhiveClient::with_cached_session("http://localhost:8080", cache)?;
//!
//! if !client.session().is_authenticated() {
//!     client.login("user@example.com", "secret").await?;
//! }
//!
//! for task in client.list_tasks().await? {
//!     println!("{} {}", task.id, task.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod session;

pub use cache::{FileTokenCache, MemoryTokenCache, TokenCache};
pub use client::{
    HealthReport, NewTask, Registration, Task, TaskPatch, TaskhiveClient, TokenSummary, UserProfile,
};
pub use error::ClientError;
pub use session::Session;
