//! # Taskhive API Server Library
//!
//! This library provides the core functionality for the Taskhive API server:
//! a token-authenticated REST API for personal task management.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, and the bearer-auth layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
