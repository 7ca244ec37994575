//! API client
//!
//! [`TaskhiveClient`] speaks the server's wire contract: JSON bodies, a
//! bearer token on authenticated calls, success envelopes for auth
//! operations, and bare objects for tasks. Whenever the server answers
//! 401 the client drops its session, so callers observe revocation as a
//! clean unauthenticated state rather than a stale token.

use crate::cache::TokenCache;
use crate::error::ClientError;
use crate::session::Session;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The identity fields the server shares about a user
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// One task as the server reports it
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub user_id: i64,
}

/// Metadata of one active token, never the secret itself
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSummary {
    pub id: i64,
    pub name: String,
    pub abilities: Vec<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Reported service health
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Input for creating an account
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTask {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Partial task update
///
/// An outer `None` leaves the field unchanged; `Some(None)` on the nullable
/// fields sends an explicit `null`, which clears the value on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct RefreshEnvelope {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MeEnvelope {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct TokenListEnvelope {
    tokens: Vec<TokenSummary>,
}

#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    message: Option<String>,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Reads a failure response into the API error variant
async fn read_failure(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let failure: FailureBody = response.json().await.unwrap_or_default();

    ClientError::Api {
        status,
        message: failure
            .message
            .unwrap_or_else(|| format!("Request failed with status {}", status)),
        errors: failure.errors,
    }
}

/// Client for the Taskhive REST API
pub struct TaskhiveClient {
    http_client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl TaskhiveClient {
    /// Creates a client with an empty session
    ///
    /// # Arguments
    /// * `base_url` - Server address, e.g. `http://localhost:8080`
    /// * `cache` - Where the session token is persisted
    pub fn new(base_url: impl Into<String>, cache: Box<dyn TokenCache>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Session::new(cache),
        }
    }

    /// Creates a client and restores the session the cache holds
    pub fn with_cached_session(
        base_url: impl Into<String>,
        cache: Box<dyn TokenCache>,
    ) -> Result<Self, ClientError> {
        let session = Session::load(cache)?;
        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    /// The current session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Builds the absolute URL for a path
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Starts a request with the session token attached
    fn authenticated(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;

        Ok(self
            .http_client
            .request(method, self.api_url(path))
            .header("Authorization", format!("Bearer {}", token)))
    }

    /// Sends a request, dropping the session when the server rejects its token
    async fn execute(
        &mut self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // The server will never accept this token again
            if let Err(err) = self.session.clear() {
                tracing::warn!("Failed to clear rejected session token: {}", err);
            }
        }

        Ok(response)
    }

    /// Checks service health; needs no session
    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let response = self
            .http_client
            .get(self.api_url("/health"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        Ok(response.json().await?)
    }

    /// Registers an account and stores the issued session token
    pub async fn register(&mut self, registration: &Registration) -> Result<UserProfile, ClientError> {
        let response = self
            .http_client
            .post(self.api_url("/api/register"))
            .json(registration)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let auth: AuthEnvelope = response.json().await?;
        self.session.store(auth.token)?;

        tracing::debug!(user_id = auth.user.id, "Registered and opened a session");
        Ok(auth.user)
    }

    /// Logs in and stores the issued session token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .http_client
            .post(self.api_url("/api/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let auth: AuthEnvelope = response.json().await?;
        self.session.store(auth.token)?;

        tracing::debug!(user_id = auth.user.id, "Logged in");
        Ok(auth.user)
    }

    /// The identity behind the current session
    pub async fn me(&mut self) -> Result<UserProfile, ClientError> {
        let request = self.authenticated(Method::GET, "/api/me")?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let envelope: MeEnvelope = response.json().await?;
        Ok(envelope.user)
    }

    /// Revokes the current token and clears the session
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let request = self.authenticated(Method::POST, "/api/logout")?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        self.session.clear()?;
        tracing::debug!("Logged out");
        Ok(())
    }

    /// Revokes every token of the user and clears the session
    pub async fn logout_all(&mut self) -> Result<(), ClientError> {
        let request = self.authenticated(Method::POST, "/api/logout-all")?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        self.session.clear()?;
        tracing::debug!("Logged out everywhere");
        Ok(())
    }

    /// Replaces the current token with a fresh one
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let request = self.authenticated(Method::POST, "/api/refresh")?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let refreshed: RefreshEnvelope = response.json().await?;
        self.session.store(refreshed.token)?;

        tracing::debug!("Session token refreshed");
        Ok(())
    }

    /// Changes the account password
    ///
    /// The server revokes every other session; this one keeps its token.
    pub async fn change_password(
        &mut self,
        current_password: &str,
        new_password: &str,
        new_password_confirmation: &str,
    ) -> Result<(), ClientError> {
        let payload = serde_json::json!({
            "current_password": current_password,
            "new_password": new_password,
            "new_password_confirmation": new_password_confirmation,
        });

        let request = self
            .authenticated(Method::POST, "/api/change-password")?
            .json(&payload);
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        tracing::debug!("Password changed");
        Ok(())
    }

    /// Lists the user's active tokens
    pub async fn list_tokens(&mut self) -> Result<Vec<TokenSummary>, ClientError> {
        let request = self.authenticated(Method::GET, "/api/tokens")?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let envelope: TokenListEnvelope = response.json().await?;
        Ok(envelope.tokens)
    }

    /// Revokes one token by ID
    pub async fn revoke_token(&mut self, id: i64) -> Result<(), ClientError> {
        let request = self.authenticated(Method::DELETE, &format!("/api/tokens/{}", id))?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        tracing::debug!(token_id = id, "Token revoked");
        Ok(())
    }

    /// Lists the user's tasks
    pub async fn list_tasks(&mut self) -> Result<Vec<Task>, ClientError> {
        let request = self.authenticated(Method::GET, "/api/tasks")?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        Ok(response.json().await?)
    }

    /// Creates a task
    pub async fn create_task(&mut self, task: &NewTask) -> Result<Task, ClientError> {
        let request = self.authenticated(Method::POST, "/api/tasks")?.json(task);
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        Ok(response.json().await?)
    }

    /// Fetches one task by ID
    pub async fn get_task(&mut self, id: i64) -> Result<Task, ClientError> {
        let request = self.authenticated(Method::GET, &format!("/api/tasks/detail/{}", id))?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        Ok(response.json().await?)
    }

    /// Updates fields of a task
    pub async fn update_task(&mut self, id: i64, patch: &TaskPatch) -> Result<Task, ClientError> {
        let request = self
            .authenticated(Method::POST, &format!("/api/tasks/update/{}", id))?
            .json(patch);
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        Ok(response.json().await?)
    }

    /// Deletes a task
    pub async fn delete_task(&mut self, id: i64) -> Result<(), ClientError> {
        let request = self.authenticated(Method::DELETE, &format!("/api/tasks/{}", id))?;
        let response = self.execute(request).await?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        Ok(())
    }
}
