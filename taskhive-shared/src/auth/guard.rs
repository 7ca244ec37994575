/// Ownership and ability checks
///
/// This module provides the authorization primitives used by every protected
/// handler. The permission model is flat: a resource has exactly one owning
/// user, and a request may touch a resource only when the authenticated user
/// is that owner. Abilities narrow what a single token may do on top of
/// ownership.
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::guard::{require_owner, AuthSession};
///
/// let auth = AuthSession::new(7, 42, vec!["*".to_string()]);
///
/// // Own resource
/// assert!(require_owner(&auth, 7).is_ok());
///
/// // Someone else's resource
/// assert!(require_owner(&auth, 8).is_err());
/// ```
use serde::{Deserialize, Serialize};

use super::token::has_ability;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Authenticated user does not own the resource
    #[error("You do not have permission to access this resource")]
    NotOwner,

    /// Presented token lacks a required ability
    #[error("Token is missing the '{0}' ability")]
    MissingAbility(String),
}

/// Authentication context added to request extensions
///
/// Built by the bearer-auth layer after a successful token lookup and
/// extracted by handlers with Axum's `Extension` extractor. Carries the row
/// id of the presenting token so logout, refresh, and password change can
/// target exactly the credential that made the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Authenticated user ID
    pub user_id: i64,

    /// Row ID of the token that authenticated this request
    pub token_id: i64,

    /// Abilities granted to the presenting token
    pub abilities: Vec<String>,
}

impl AuthSession {
    /// Creates an auth session for a validated token
    pub fn new(user_id: i64, token_id: i64, abilities: Vec<String>) -> Self {
        Self {
            user_id,
            token_id,
            abilities,
        }
    }

    /// Checks whether the presenting token grants an ability
    pub fn can(&self, required: &str) -> bool {
        has_ability(&self.abilities, required)
    }
}

/// Checks that the authenticated user owns a resource
///
/// Strict id equality. There are no roles, no delegation, and no admin
/// override; a mismatch is always a denial.
///
/// # Errors
///
/// Returns `GuardError::NotOwner` if the ids differ.
pub fn require_owner(auth: &AuthSession, resource_owner_id: i64) -> Result<(), GuardError> {
    if auth.user_id != resource_owner_id {
        return Err(GuardError::NotOwner);
    }

    Ok(())
}

/// Checks that the presenting token grants an ability
///
/// Session tokens issued at login carry the global wildcard, so this passes
/// for them. Narrow tokens fail on anything outside their grant.
///
/// # Errors
///
/// Returns `GuardError::MissingAbility` naming the ability that was denied.
pub fn require_ability(auth: &AuthSession, required: &str) -> Result<(), GuardError> {
    if !auth.can(required) {
        return Err(GuardError::MissingAbility(required.to_string()));
    }

    Ok(())
}
