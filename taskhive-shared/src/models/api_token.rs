/// API token model and database operations
///
/// This module provides the ApiToken model backing the bearer-token session
/// system. A row here IS a live session: issuing creates a row, every
/// authenticated request looks its hash up, and revoking deletes it, which
/// invalidates the token on the next request with no grace period.
///
/// # Security
///
/// - Secrets are stored as SHA-256 hashes (never plaintext)
/// - The full secret is only returned on issuance (never again)
/// - Tokens carry an abilities list (`["*"]` for login sessions)
/// - Tokens can be revoked individually, per user, or rotated atomically
///
/// # Schema
///
/// ```sql
/// CREATE TABLE api_tokens (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name TEXT NOT NULL,
///     token_hash TEXT NOT NULL UNIQUE,
///     abilities TEXT NOT NULL DEFAULT '["*"]',
///     created_at TEXT NOT NULL,
///     expires_at TEXT,
///     last_used_at TEXT
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::api_token::{ApiToken, IssueToken};
/// use taskhive_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// // Issue a new token
/// let (token, secret) = ApiToken::issue(&pool, IssueToken {
///     user_id: 1,
///     name: "auth-token".to_string(),
///     abilities: vec!["*".to_string()],
///     ttl_seconds: None,
/// }).await?;
///
/// // IMPORTANT: hand `secret` to the caller now - it's never shown again!
/// println!("Bearer {}", secret);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::auth::token::{generate_token, hash_token};

/// Error type for token authentication
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// No stored token matches the presented secret
    #[error("Unknown or revoked token")]
    Unknown,

    /// A matching token exists but its expiry has passed
    #[error("Token has expired")]
    Expired,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// API token model
///
/// One row per issued bearer token. The secret itself is not a column; only
/// its SHA-256 hash is stored, and the hash is excluded from serialization.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiToken {
    /// Unique token row ID
    ///
    /// Distinct from the secret, so a token can be revoked by id without
    /// knowing the credential itself
    pub id: i64,

    /// User this token belongs to
    pub user_id: i64,

    /// Human-readable name (the "device" label)
    pub name: String,

    /// SHA-256 hash of the full secret (never store plaintext!)
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// Granted abilities (e.g., ["*"] or ["tasks:read"])
    pub abilities: Json<Vec<String>>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,

    /// Optional expiry; None means the token lives until revoked
    pub expires_at: Option<DateTime<Utc>>,

    /// When the token last authenticated a request
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Input for issuing
#[derive(Debug, Clone)]
pub struct IssueToken {
    /// User the token is bound to
    pub user_id: i64,

    /// Human-readable name
    pub name: String,

    /// Granted abilities
    pub abilities: Vec<String>,

    /// Lifetime in seconds; None issues a token that lives until revoked
    pub ttl_seconds: Option<i64>,
}

impl ApiToken {
    /// Checks if the token is expired
    ///
    /// Returns true if expires_at is set and is in the past
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            expires_at < Utc::now()
        } else {
            false
        }
    }

    /// Issues a new token
    ///
    /// Returns both the database record and the plaintext secret.
    /// **IMPORTANT**: The plaintext secret is only returned once and never
    /// stored!
    ///
    /// # Returns
    ///
    /// Tuple of (ApiToken record, plaintext secret)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskhive_shared::models::api_token::{ApiToken, IssueToken};
    /// # use sqlx::SqlitePool;
    /// # async fn example(pool: SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
    /// let (token, secret) = ApiToken::issue(&pool, IssueToken {
    ///     user_id,
    ///     name: "auth-token".to_string(),
    ///     abilities: vec!["*".to_string()],
    ///     ttl_seconds: None,
    /// }).await?;
    ///
    /// // Hand `secret` to the caller - it won't be shown again!
    /// # Ok(())
    /// # }
    /// ```
    pub async fn issue(pool: &SqlitePool, data: IssueToken) -> Result<(Self, String), sqlx::Error> {
        let (secret, token_hash) = generate_token();
        let now = Utc::now();
        let expires_at = data
            .ttl_seconds
            .map(|seconds| now + Duration::seconds(seconds));

        let token = sqlx::query_as::<_, ApiToken>(
            r#"
            INSERT INTO api_tokens (user_id, name, token_hash, abilities, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, user_id, name, token_hash, abilities, created_at, expires_at, last_used_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(token_hash)
        .bind(Json(data.abilities))
        .bind(now)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok((token, secret))
    }

    /// Authenticates a presented secret
    ///
    /// Hashes the secret, looks up the matching row, rejects expired tokens,
    /// and stamps `last_used_at`. A secret whose row has been deleted fails
    /// here immediately; revocation has no grace period.
    ///
    /// # Errors
    ///
    /// - `TokenError::Unknown` if no row matches the hash
    /// - `TokenError::Expired` if the matching token is past its expiry
    /// - `TokenError::Database` for connection failures
    pub async fn authenticate(pool: &SqlitePool, secret: &str) -> Result<Self, TokenError> {
        let token_hash = hash_token(secret);

        let mut token = sqlx::query_as::<_, ApiToken>(
            r#"
            SELECT id, user_id, name, token_hash, abilities, created_at, expires_at, last_used_at
            FROM api_tokens
            WHERE token_hash = ?1
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(pool)
        .await?
        .ok_or(TokenError::Unknown)?;

        if token.is_expired() {
            return Err(TokenError::Expired);
        }

        let now = Utc::now();
        sqlx::query("UPDATE api_tokens SET last_used_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(token.id)
            .execute(pool)
            .await?;
        token.last_used_at = Some(now);

        Ok(token)
    }

    /// Finds a token by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, ApiToken>(
            r#"
            SELECT id, user_id, name, token_hash, abilities, created_at, expires_at, last_used_at
            FROM api_tokens
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Revokes a token with owner isolation
    ///
    /// Deletes the row only when it belongs to `user_id`. A nonexistent id
    /// and another user's id are indistinguishable to the caller, so token
    /// ids cannot be probed across accounts.
    ///
    /// # Returns
    ///
    /// True if a token was revoked, false otherwise
    pub async fn revoke(pool: &SqlitePool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every token belonging to a user
    ///
    /// The logout-everywhere operation.
    ///
    /// # Returns
    ///
    /// Number of tokens revoked
    pub async fn revoke_all(pool: &SqlitePool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE user_id = ?1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Revokes every token belonging to a user except one
    ///
    /// Used after a password change so the session that changed the password
    /// survives while every other device is signed out.
    ///
    /// # Returns
    ///
    /// Number of tokens revoked
    pub async fn revoke_all_except(
        pool: &SqlitePool,
        user_id: i64,
        keep_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE user_id = ?1 AND id != ?2")
            .bind(user_id)
            .bind(keep_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Rotates a token: revokes it and issues a replacement atomically
    ///
    /// Runs in a single transaction, so a concurrent authenticate observes
    /// either the old token or the new one, never both and never neither.
    ///
    /// # Returns
    ///
    /// The replacement record and its plaintext secret, or None when the
    /// presented token no longer exists (e.g., revoked concurrently)
    pub async fn rotate(
        pool: &SqlitePool,
        id: i64,
        data: IssueToken,
    ) -> Result<Option<(Self, String)>, sqlx::Error> {
        let (secret, token_hash) = generate_token();
        let now = Utc::now();
        let expires_at = data
            .ttl_seconds
            .map(|seconds| now + Duration::seconds(seconds));

        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM api_tokens WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(data.user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(None);
        }

        let token = sqlx::query_as::<_, ApiToken>(
            r#"
            INSERT INTO api_tokens (user_id, name, token_hash, abilities, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, user_id, name, token_hash, abilities, created_at, expires_at, last_used_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(token_hash)
        .bind(Json(data.abilities))
        .bind(now)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((token, secret)))
    }

    /// Lists all tokens for a user, newest first
    pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tokens = sqlx::query_as::<_, ApiToken>(
            r#"
            SELECT id, user_id, name, token_hash, abilities, created_at, expires_at, last_used_at
            FROM api_tokens
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tokens)
    }

    /// Counts tokens belonging to a user
    pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM api_tokens WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
