//! Pinnacle Financial site backend
//!
//! REST API for the marketing site and its content-management admin panel, with SQLite
//! persistence and signed session tokens.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod models;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenCodec;
use config::Config;
use db::{CredentialError, Repository};
use models::{CreateUserRequest, Sections};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub tokens: Arc<TokenCodec>,
    /// Compiled-in (or configured) site content defaults
    pub defaults: Arc<Sections>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Repository, defaults: Sections, config: Config) -> Self {
        Self {
            repo: Arc::new(repo),
            tokens: Arc::new(TokenCodec::new(&config.jwt_secret)),
            defaults: Arc::new(defaults),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        // Auth
        .route("/auth/login", post(api::login))
        .route("/auth/verify", get(api::verify))
        // Content
        .route("/content", get(api::get_content))
        .route("/content", put(api::update_content))
        .route("/content/revision", get(api::get_content_revision))
        // Contacts
        .route("/contacts", get(api::list_contacts))
        .route("/contacts", post(api::create_contact))
        .route("/contacts/{id}", put(api::update_contact))
        .route("/contacts/{id}", delete(api::delete_contact))
        // Pages
        .route("/pages", get(api::get_pages))
        .route("/pages", post(api::create_page))
        .route("/pages/{id}", put(api::update_page))
        .route("/pages/{id}", delete(api::delete_page))
        // Users
        .route("/users", get(api::list_users))
        .route("/users", post(api::create_user))
        .route("/users/{id}", put(api::update_user))
        .route("/users/{id}", delete(api::delete_user));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.allowed_origin.as_deref() {
        None => AllowOrigin::from(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!("Ignoring unusable CORS origin '{}'; allowing any", origin);
                AllowOrigin::from(Any)
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the configured bootstrap Admin when no account exists yet.
/// Returns whether an account was created.
pub async fn seed_bootstrap_admin(
    repo: &Repository,
    config: &Config,
) -> Result<bool, CredentialError> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(false);
    };
    if repo.count_users().await? > 0 {
        return Ok(false);
    }

    let user = repo
        .create_user(&CreateUserRequest {
            username: admin.username.clone(),
            password: admin.password.clone(),
            name: "Administrator".to_string(),
            email: String::new(),
            role: Some("Admin".to_string()),
        })
        .await?;
    tracing::info!(username = %user.username, "Created bootstrap admin account");
    Ok(true)
}
