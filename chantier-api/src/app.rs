//! Application state and router builder.
//!
//! # Architecture
//!
//! ```text
//! /
//! ├── /health                          # Health check (public)
//! └── /v1/                             # API v1
//!     ├── /auth/                       # register, login, refresh (public)
//!     ├── /me                          # profile (authenticated)
//!     ├── /folders                     # folder tree
//!     ├── /projects                    # projects, links, shares, documents
//!     ├── /libraries                   # libraries, articles, shares, import
//!     ├── /articles                    # article update/move/favorite
//!     ├── /project-shares, /library-shares
//!     └── /admin/users                 # admin-only user management
//! ```
//!
//! Every `/v1` route except `/v1/auth/*` sits behind the JWT layer, which
//! validates the Bearer token and injects an `AuthContext` extension.

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, storage::DocumentStore};
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use chantier_shared::auth::{jwt, middleware::{bearer_token, AuthContext}};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clone
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Document bytes on disk
    pub docs: DocumentStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let docs = DocumentStore::new(config.storage.root.clone());
        Self {
            db,
            config: Arc::new(config),
            docs,
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Everything below requires a valid access token
    let protected_routes = Router::new()
        .route("/me", get(routes::me::get_profile))
        .route("/me", put(routes::me::update_profile))
        .route("/me/password", put(routes::me::change_password))
        .route("/folders", get(routes::folders::list_folders))
        .route("/folders", post(routes::folders::create_folder))
        .route("/folders/:id", put(routes::folders::update_folder))
        .route("/folders/:id", delete(routes::folders::delete_folder))
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects", post(routes::projects::create_project))
        .route("/projects/import", post(routes::imports::import_projects))
        .route("/projects/:id", get(routes::projects::get_project))
        .route("/projects/:id", put(routes::projects::update_project))
        .route("/projects/:id", delete(routes::projects::delete_project))
        .route(
            "/projects/:id/libraries",
            get(routes::projects::list_project_libraries),
        )
        .route(
            "/projects/:id/libraries",
            post(routes::projects::assign_library),
        )
        .route(
            "/projects/:id/libraries/:library_id",
            delete(routes::projects::unassign_library),
        )
        .route(
            "/projects/:id/shares",
            get(routes::shares::list_project_shares),
        )
        .route(
            "/projects/:id/shares",
            post(routes::shares::create_project_share),
        )
        .route(
            "/projects/:id/documents",
            get(routes::documents::list_documents),
        )
        .route(
            "/projects/:id/documents",
            post(routes::documents::upload_document),
        )
        .route("/documents/:id", delete(routes::documents::delete_document))
        .route(
            "/project-shares",
            get(routes::shares::list_received_project_shares),
        )
        .route(
            "/project-shares/:id",
            put(routes::shares::update_project_share),
        )
        .route(
            "/project-shares/:id",
            delete(routes::shares::delete_project_share),
        )
        .route(
            "/project-shares/:id/accept",
            post(routes::shares::accept_project_share),
        )
        .route("/libraries", get(routes::libraries::list_libraries))
        .route("/libraries", post(routes::libraries::create_library))
        .route("/libraries/:id", get(routes::libraries::get_library))
        .route("/libraries/:id", put(routes::libraries::update_library))
        .route("/libraries/:id", delete(routes::libraries::delete_library))
        .route(
            "/libraries/:id/articles",
            get(routes::articles::list_articles),
        )
        .route(
            "/libraries/:id/articles",
            post(routes::articles::create_article),
        )
        .route(
            "/libraries/:id/import",
            post(routes::imports::import_articles),
        )
        .route(
            "/libraries/:id/shares",
            get(routes::shares::list_library_shares),
        )
        .route(
            "/libraries/:id/shares",
            post(routes::shares::create_library_share),
        )
        .route(
            "/library-shares/:id",
            put(routes::shares::update_library_share),
        )
        .route(
            "/library-shares/:id",
            delete(routes::shares::delete_library_share),
        )
        .route("/articles/:id", put(routes::articles::update_article))
        .route("/articles/:id", delete(routes::articles::delete_article))
        .route(
            "/articles/:id/favorite",
            post(routes::articles::toggle_favorite),
        )
        .route("/articles/move", post(routes::articles::move_articles))
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/users/:id", delete(routes::admin::delete_user))
        // Document uploads exceed the 2 MB axum default
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
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
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer token and injects an [`AuthContext`] into request
/// extensions for handlers to extract.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
