//! Client error type
//!
//! One enum covers the three ways a call can go wrong: the request never
//! reached the server, the server answered with a failure body, or the
//! local token cache failed.

use std::collections::BTreeMap;

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request produced no HTTP response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// An authenticated call was made with no token in the session
    #[error("Not authenticated; log in first")]
    NotAuthenticated,

    /// The server answered with a failure body
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable message from the failure body
        message: String,
        /// Field messages on validation failures
        errors: Option<BTreeMap<String, Vec<String>>>,
    },

    /// The token cache could not be read or written
    #[error("Token cache error: {0}")]
    Cache(#[from] std::io::Error),
}

impl ClientError {
    /// True when the call failed for lack of a valid session
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::Api { status: 401, .. }
        )
    }

    /// Field messages from a validation failure, when present
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ClientError::Api { errors, .. } => errors.as_ref(),
            _ => None,
        }
    }
}
