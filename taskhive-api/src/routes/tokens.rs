/// Token management endpoints
///
/// Lets a user see which sessions exist for their account and revoke
/// individual ones, for example a lost device.
///
/// # Endpoints
///
/// - `GET /api/tokens` - List the caller's active tokens
/// - `DELETE /api/tokens/:id` - Revoke one token by ID
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use taskhive_shared::{auth::guard::AuthSession, models::api_token::ApiToken};

/// One token as shown to its owner
///
/// The hash never leaves the database and the secret was only ever shown at
/// issue time, so this is metadata only.
#[derive(Debug, Serialize)]
pub struct TokenListItem {
    pub id: i64,
    pub name: String,
    pub abilities: Vec<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ApiToken> for TokenListItem {
    fn from(token: ApiToken) -> Self {
        Self {
            id: token.id,
            name: token.name,
            abilities: token.abilities.0,
            last_used_at: token.last_used_at,
            created_at: token.created_at,
        }
    }
}

/// Response for the token listing
#[derive(Debug, Serialize)]
pub struct TokenListResponse {
    pub success: bool,
    pub tokens: Vec<TokenListItem>,
}

/// List active tokens
///
/// Returns the caller's tokens newest first. `last_used_at` makes a
/// forgotten or stolen session stand out.
///
/// # Endpoint
///
/// ```text
/// GET /api/tokens
/// Authorization: Bearer <token>
/// ```
pub async fn list_tokens(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<TokenListResponse>> {
    let tokens = ApiToken::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(TokenListResponse {
        success: true,
        tokens: tokens.into_iter().map(TokenListItem::from).collect(),
    }))
}

/// Revoke a token by ID
///
/// Deletes the row, which invalidates the secret immediately. Revoking the
/// presenting token works and is equivalent to logout.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/tokens/:id
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No such token among the caller's own; whether the ID
///   exists under another account is not disclosed
pub async fn revoke_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let revoked = ApiToken::revoke(&state.db, id, auth.user_id).await?;

    if !revoked {
        return Err(ApiError::NotFound("Token not found".to_string()));
    }

    tracing::info!(user_id = auth.user_id, token_id = id, "Token revoked");

    Ok(Json(MessageResponse {
        success: true,
        message: "Token revoked".to_string(),
    }))
}
