//! Client-side session state
//!
//! One object owns the current token and keeps the cache in step with it.
//! Everything else reads the token through the accessors here; nothing
//! touches the cache directly.

use crate::cache::TokenCache;
use crate::error::ClientError;

/// The client's view of its authentication state
///
/// Holds the token as an `Option`; presence of a value is the only
/// authenticated/unauthenticated distinction. Mutations write through to
/// the cache first, so memory never claims a state the cache has lost.
pub struct Session {
    token: Option<String>,
    cache: Box<dyn TokenCache>,
}

impl Session {
    /// Creates an empty session over a cache without reading it
    pub fn new(cache: Box<dyn TokenCache>) -> Self {
        Self { token: None, cache }
    }

    /// Creates a session and restores any token the cache holds
    pub fn load(cache: Box<dyn TokenCache>) -> Result<Self, ClientError> {
        let token = cache.load()?;
        Ok(Self { token, cache })
    }

    /// The current token, if authenticated
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a token is currently held
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replaces the session token and persists it
    pub fn store(&mut self, token: String) -> Result<(), ClientError> {
        self.cache.store(&token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Drops the token from memory and cache
    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.cache.clear()?;
        self.token = None;
        Ok(())
    }
}
