/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, and session management
/// - `tokens`: Token listing and revocation by id
/// - `tasks`: Task CRUD
pub mod auth;
pub mod health;
pub mod tasks;
pub mod tokens;
