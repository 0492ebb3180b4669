/// Application state, router builder, and identity resolution
///
/// # Router Layout
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// ├── POST /token               # Login, form-encoded credentials (public)
/// ├── POST /users               # Registration (public)
/// ├── POST /upload-image        # Image upload (public)
/// ├── GET  /images/:name        # Image download (public)
/// └── /tasks                    # Bearer token required
///     ├── GET    /              # List own tasks, optional ?filter=
///     ├── POST   /              # Create task
///     ├── GET    /:id           # Read own task
///     ├── PUT    /:id           # Partial update of own task
///     └── DELETE /:id           # Delete own task
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication (task routes only)

use crate::{config::Config, error::ApiError, images::ImageStore, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::{auth::jwt, models::user::User};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The config
/// (including the JWT signing secret) is behind an `Arc` and never mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// On-disk store for uploaded images
    pub images: ImageStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let images = ImageStore::new(config.images.dir.clone());
        Self {
            db,
            config: Arc::new(config),
            images,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the configured access token lifetime
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.config.jwt.token_ttl_minutes)
    }
}

/// The authenticated user, resolved from the bearer token
///
/// Inserted into request extensions by [`bearer_auth_layer`], extracted in
/// handlers via `Extension<CurrentUser>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // Public routes: health, registration, login, images
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/token", post(routes::auth::login_for_access_token))
        .route("/users", post(routes::users::create_user))
        .route("/upload-image", post(routes::images::upload_image))
        .route("/images/:name", get(routes::images::get_image));

    // Task routes: every one of them requires a resolved identity,
    // including PUT and DELETE
    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer token authentication middleware
///
/// Extracts the `Authorization: Bearer` header, validates the token's
/// signature, expiry, and issuer, then resolves the subject claim to a user
/// record. A token whose user has since been deleted is still rejected even
/// though it is cryptographically valid.
///
/// Every failure kind produces the same 401 response; the kind is logged at
/// debug level only.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(kind = "missing_credentials", "Authentication failed");
            unauthenticated()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(kind = "invalid_scheme", "Authentication failed");
        unauthenticated()
    })?;

    // From<JwtError> collapses all validation failures to 401 and logs the kind
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let user = User::find_by_username(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!(kind = "unknown_user", "Authentication failed");
            unauthenticated()
        })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// The single caller-visible authentication failure
fn unauthenticated() -> ApiError {
    ApiError::Unauthorized("Could not validate credentials".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, ImageConfig, JwtConfig};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_token_ttl_from_config() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                token_ttl_minutes: 45,
            },
            images: ImageConfig {
                dir: PathBuf::from("./images"),
            },
        };

        let state = AppState::new(PgPool::connect_lazy(&config.database.url).unwrap(), config);
        assert_eq!(state.token_ttl(), chrono::Duration::minutes(45));
    }
}
