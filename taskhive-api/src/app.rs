/// Application state and router builder
///
/// This module defines the shared application state, the bearer-token
/// authentication layer, and the function that assembles the Axum router
/// with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhive_api::{app::{build_router, AppState}, config::Config};
/// use taskhive_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
///
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use taskhive_shared::auth::{guard::AuthSession, token::validate_token_format};
use taskhive_shared::models::api_token::ApiToken;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Lifetime applied to newly issued tokens; None means no expiry
    pub fn token_ttl(&self) -> Option<i64> {
        self.config.token.ttl_seconds
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /api/
///     ├── POST /register            # Public
///     ├── POST /login               # Public
///     ├── POST /logout              # Bearer auth from here down
///     ├── POST /logout-all
///     ├── POST /refresh
///     ├── POST /change-password
///     ├── GET  /me
///     ├── /tokens/
///     │   ├── GET    /              # List the caller's tokens
///     │   └── DELETE /:id           # Revoke by id
///     └── /tasks/
///         ├── GET    /              # List the caller's tasks
///         ├── POST   /              # Create
///         ├── GET    /detail/:id
///         ├── POST   /update/:id
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Credential endpoints (public, no auth required)
    let public_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Session management for the presenting token
    let session_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/logout-all", post(routes::auth::logout_all))
        .route("/refresh", post(routes::auth::refresh))
        .route("/change-password", post(routes::auth::change_password))
        .route("/me", get(routes::auth::me));

    // Token management by row id
    let token_routes = Router::new()
        .route("/", get(routes::tokens::list_tokens))
        .route("/:id", delete(routes::tokens::revoke_token));

    // Task CRUD
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/detail/:id", get(routes::tasks::get_task))
        .route("/update/:id", post(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task));

    // Everything past this point requires a valid bearer token
    let protected_routes = Router::new()
        .merge(session_routes)
        .nest("/tokens", token_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer token authentication middleware layer
///
/// Extracts the bearer secret from the Authorization header, looks it up in
/// the database, and injects an `AuthSession` into request extensions.
/// Because validity is row existence, a revoked token fails here on its very
/// next request.
async fn bearer_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    use crate::error::ApiError;

    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing authorization header".to_string()))?;

    // Parse Bearer token
    let secret = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthenticated("Expected a Bearer token".to_string()))?;

    // Cheap shape check before touching the database
    if !validate_token_format(secret) {
        return Err(ApiError::Unauthenticated(
            "Invalid or revoked token".to_string(),
        ));
    }

    // Look up the token row and stamp its last use
    let token = ApiToken::authenticate(&state.db, secret).await?;

    let auth = AuthSession::new(token.user_id, token.id, token.abilities.0);

    // Insert into request extensions
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
