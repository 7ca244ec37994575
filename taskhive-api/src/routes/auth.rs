/// Authentication and session endpoints
///
/// This module covers the full lifecycle of a bearer-token session:
/// creation (register, login), use (me), and destruction or replacement
/// (logout, logout-all, refresh, change-password).
///
/// # Endpoints
///
/// - `POST /api/register` - Register and receive a first token
/// - `POST /api/login` - Authenticate and receive a token
/// - `POST /api/logout` - Revoke the presenting token
/// - `POST /api/logout-all` - Revoke every token of the user
/// - `POST /api/refresh` - Replace the presenting token atomically
/// - `POST /api/change-password` - Rotate the password, keep this session
/// - `GET /api/me` - Identity behind the presenting token
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskhive_shared::{
    auth::{guard::AuthSession, password, token::default_abilities},
    models::{
        api_token::{ApiToken, IssueToken},
        user::{CreateUser, User},
    },
};
use validator::Validate;

/// Label given to tokens issued through login and registration
const SESSION_TOKEN_NAME: &str = "auth-token";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// First name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Last name
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,

    /// Email address, the login identifier
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    /// Must repeat the password exactly
    #[validate(must_match(other = "password", message = "Password confirmation does not match"))]
    pub password_confirmation: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Change password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// The password currently on the account
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    /// Replacement password
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,

    /// Must repeat the new password exactly
    #[validate(must_match(
        other = "new_password",
        message = "Password confirmation does not match"
    ))]
    pub new_password_confirmation: String,
}

/// Response for endpoints that hand out a token plus the identity behind it
///
/// `User` serializes without its password hash, so embedding the model
/// directly yields exactly `{id, name, last_name, email, created_at}`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,

    /// The plaintext secret; shown here and never again
    pub token: String,
    pub token_type: String,
    pub user: User,
}

/// Response for refresh, which replaces the secret but not the identity
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub token_type: String,
}

/// Response for the current-user endpoint
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: User,
}

/// Plain acknowledgement for operations with nothing else to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Issues a fresh wildcard session token for a user
async fn issue_session_token(state: &AppState, user_id: i64) -> ApiResult<String> {
    let (_, secret) = ApiToken::issue(
        &state.db,
        IssueToken {
            user_id,
            name: SESSION_TOKEN_NAME.to_string(),
            abilities: default_abilities(),
            ttl_seconds: state.token_ttl(),
        },
    )
    .await?;

    Ok(secret)
}

/// Register a new user
///
/// Creates the account and immediately issues a session token, so the client
/// can proceed authenticated without a second round trip.
///
/// # Endpoint
///
/// ```text
/// POST /api/register
/// Content-Type: application/json
///
/// {
///   "name": "John",
///   "last_name": "Doe",
///   "email": "user@example.com",
///   "password": "secret",
///   "password_confirmation": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or email already taken
/// - `409 Conflict`: Email uniqueness lost to a concurrent registration
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password)
        .map_err(|message| ApiError::field_error("password", &message))?;

    // Uniqueness pre-check; the unique index backstops the race
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::field_error(
            "email",
            "The email has already been taken",
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            last_name: req.last_name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let token = issue_session_token(&state, user.id).await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token,
            token_type: "Bearer".to_string(),
            user,
        }),
    ))
}

/// Login
///
/// Verifies the credentials and issues a new session token. Each login gets
/// its own token, so devices can be signed out independently.
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password, indistinguishable
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // An unknown email and a wrong password take the same exit
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredential)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredential);
    }

    let token = issue_session_token(&state, user.id).await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Logout
///
/// Deletes the presenting token's row. The secret stops authenticating on
/// the very next request; other sessions of the same user are untouched.
///
/// # Endpoint
///
/// ```text
/// POST /api/logout
/// Authorization: Bearer <token>
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<MessageResponse>> {
    // Idempotent: a concurrent revocation of the same token is still a
    // successful logout from the caller's point of view
    ApiToken::revoke(&state.db, auth.token_id, auth.user_id).await?;

    tracing::info!(user_id = auth.user_id, "User logged out");

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    }))
}

/// Logout everywhere
///
/// Deletes every token of the user, including the presenting one.
///
/// # Endpoint
///
/// ```text
/// POST /api/logout-all
/// Authorization: Bearer <token>
/// ```
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<MessageResponse>> {
    let revoked = ApiToken::revoke_all(&state.db, auth.user_id).await?;

    tracing::info!(user_id = auth.user_id, revoked, "User logged out everywhere");

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out from all devices".to_string(),
    }))
}

/// Refresh the presenting token
///
/// Revokes the presenting token and issues a replacement in one
/// transaction. A concurrent request observes the old token or the new one,
/// never both and never neither.
///
/// # Endpoint
///
/// ```text
/// POST /api/refresh
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: The presenting token was revoked concurrently
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<RefreshResponse>> {
    let rotated = ApiToken::rotate(
        &state.db,
        auth.token_id,
        IssueToken {
            user_id: auth.user_id,
            name: SESSION_TOKEN_NAME.to_string(),
            // The replacement keeps the grants of the token it replaces
            abilities: auth.abilities,
            ttl_seconds: state.token_ttl(),
        },
    )
    .await?;

    let (_, secret) = rotated.ok_or_else(|| {
        ApiError::Unauthenticated("Token is no longer valid".to_string())
    })?;

    tracing::info!(user_id = auth.user_id, "Token refreshed");

    Ok(Json(RefreshResponse {
        success: true,
        message: "Token refreshed".to_string(),
        token: secret,
        token_type: "Bearer".to_string(),
    }))
}

/// Change password
///
/// Re-verifies the current password, stores the new hash, then signs out
/// every other device. The session that made the change keeps its token.
///
/// # Endpoint
///
/// ```text
/// POST /api/change-password
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "current_password": "secret",
///   "new_password": "stronger",
///   "new_password_confirmation": "stronger"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Current password does not match
/// - `422 Unprocessable Entity`: Validation failed
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;
    password::validate_password_strength(&req.new_password)
        .map_err(|message| ApiError::field_error("new_password", &message))?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Account no longer exists".to_string()))?;

    let valid = password::verify_password(&req.current_password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthenticated(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, auth.user_id, &password_hash).await?;

    // Every other session is signed out; the presenting token survives
    let revoked = ApiToken::revoke_all_except(&state.db, auth.user_id, auth.token_id).await?;

    tracing::info!(user_id = auth.user_id, revoked, "Password changed");

    Ok(Json(MessageResponse {
        success: true,
        message: "Password changed successfully".to_string(),
    }))
}

/// Current user
///
/// Returns the identity behind the presenting token.
///
/// # Endpoint
///
/// ```text
/// GET /api/me
/// Authorization: Bearer <token>
/// ```
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Account no longer exists".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        user,
    }))
}
