//! # Taskhive Shared Library
//!
//! This crate contains the types, storage operations, and auth primitives
//! behind the Taskhive API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and store operations
//! - `auth`: Password hashing, token primitives, and ownership checks
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskhive shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
