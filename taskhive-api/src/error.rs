/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts to
/// the appropriate status code and a `{success: false, message, errors?}`
/// body.
///
/// It also provides `AppJson`, a drop-in replacement for `axum::Json` whose
/// rejection is routed through `ApiError`, so malformed request bodies
/// produce the same 422 shape as field validation failures.
use axum::{
    extract::rejection::JsonRejection,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name → list of messages, the 422 payload
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Unprocessable entity (422), field-level validation failures
    Validation(FieldErrors),

    /// Unauthorized (401) for login attempts
    ///
    /// One variant for both unknown email and wrong password, so the
    /// response cannot be used to probe which emails are registered
    InvalidCredential,

    /// Unauthorized (401) for missing, revoked, or expired tokens
    Unauthenticated(String),

    /// Forbidden (403), authenticated but not the owner
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email at insert time
    Conflict(String),

    /// Internal server error (500)
    Internal(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false for failures
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Field validation errors (422 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    /// Builds a single-field validation error
    ///
    /// Used for checks that live outside the derive attributes, such as the
    /// email uniqueness pre-check during registration.
    pub fn field_error(field: &str, message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.to_string()]);
        ApiError::Validation(fields)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(fields) => {
                write!(f, "Validation failed: {} fields", fields.len())
            }
            ApiError::InvalidCredential => write!(f, "Invalid email or password"),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The given data was invalid".to_string(),
                Some(fields),
            ),
            ApiError::InvalidCredential => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
                None,
            ),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            errors,
        });

        (status, body).into_response()
    }
}

/// `axum::Json` with rejections routed through `ApiError`
///
/// A body that is missing, not JSON, or JSON of the wrong shape never
/// reaches a handler; it becomes a 422 in the standard failure format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Convert body rejections to validation errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::field_error("body", &rejection.body_text())
    }
}

/// Convert derive-based validation failures to the 422 shape
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();

        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        ApiError::Validation(fields)
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // The email uniqueness pre-check can race with a concurrent
                // registration; the unique index is the backstop
                if db_err.is_unique_violation() {
                    if db_err.message().contains("users.email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict("Resource already exists".to_string());
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert token authentication errors to API errors
impl From<taskhive_shared::models::api_token::TokenError> for ApiError {
    fn from(err: taskhive_shared::models::api_token::TokenError) -> Self {
        use taskhive_shared::models::api_token::TokenError;

        match err {
            TokenError::Unknown => {
                ApiError::Unauthenticated("Invalid or revoked token".to_string())
            }
            TokenError::Expired => ApiError::Unauthenticated("Token has expired".to_string()),
            TokenError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

/// Convert authorization errors to API errors
impl From<taskhive_shared::auth::guard::GuardError> for ApiError {
    fn from(err: taskhive_shared::auth::guard::GuardError) -> Self {
        use taskhive_shared::auth::guard::GuardError;

        match err {
            GuardError::NotOwner => ApiError::Forbidden(
                "You do not have permission to access this resource".to_string(),
            ),
            GuardError::MissingAbility(ability) => {
                ApiError::Forbidden(format!("Token is missing the '{}' ability", ability))
            }
        }
    }
}

/// Convert password errors to API errors
impl From<taskhive_shared::auth::password::PasswordError> for ApiError {
    fn from(err: taskhive_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}
