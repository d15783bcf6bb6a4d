//! Library endpoints.
//!
//! # Endpoints
//!
//! - `GET /v1/libraries` - Every library the caller can read
//! - `POST /v1/libraries` - Create a library
//! - `GET /v1/libraries/:id` - Library detail
//! - `PUT /v1/libraries/:id` - Update (editor or owner)
//! - `DELETE /v1/libraries/:id` - Delete with its articles (owner only)

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chantier_shared::{
    access::{self, Action},
    auth::middleware::AuthContext,
    models::library::{CreateLibrary, Library, UpdateLibrary},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Library creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLibraryRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_global: bool,
}

/// Library update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLibraryRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub is_global: Option<bool>,
}

/// Library with the caller's effective role attached
#[derive(Debug, Serialize)]
pub struct LibraryView {
    #[serde(flatten)]
    pub library: Library,

    /// The caller's role on this library
    pub access_role: String,
}

/// Library deletion response
#[derive(Debug, Serialize)]
pub struct DeleteLibraryResponse {
    pub deleted: bool,

    /// Articles removed by the cascade
    pub deleted_articles: i64,
}

/// Lists every library the caller can read
///
/// Ownership, direct shares, the global flag and readable linked projects
/// are ORed together; a library matching several conditions appears once.
pub async fn list_libraries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Library>>> {
    let libraries = Library::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(libraries))
}

/// Creates a library owned by the caller
pub async fn create_library(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateLibraryRequest>,
) -> ApiResult<Json<Library>> {
    req.validate().map_err(validation_details)?;

    let library = Library::create(
        &state.db,
        CreateLibrary {
            owner_id: auth.user_id,
            name: req.name,
            description: req.description,
            is_global: req.is_global,
        },
    )
    .await?;

    tracing::info!(library_id = %library.id, "Library created");

    Ok(Json(library))
}

/// Library detail with the caller's role
pub async fn get_library(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
) -> ApiResult<Json<LibraryView>> {
    let role = access::require_library(&state.db, library_id, auth.user_id, Action::Read).await?;

    let library = Library::find_by_id(&state.db, library_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    Ok(Json(LibraryView {
        library,
        access_role: role.as_str().to_string(),
    }))
}

/// Updates a library (editor or owner)
pub async fn update_library(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
    Json(req): Json<UpdateLibraryRequest>,
) -> ApiResult<Json<Library>> {
    req.validate().map_err(validation_details)?;

    access::require_library(&state.db, library_id, auth.user_id, Action::Write).await?;

    let library = Library::update(
        &state.db,
        library_id,
        UpdateLibrary {
            name: req.name,
            description: req.description,
            is_global: req.is_global,
        },
    )
    .await?
    .ok_or_else(ApiError::not_visible)?;

    Ok(Json(library))
}

/// Deletes a library and all of its articles (owner only)
pub async fn delete_library(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
) -> ApiResult<Json<DeleteLibraryResponse>> {
    access::require_library(&state.db, library_id, auth.user_id, Action::Delete).await?;

    let article_count = Library::article_count(&state.db, library_id).await?;

    Library::delete(&state.db, library_id).await?;

    tracing::info!(
        library_id = %library_id,
        deleted_articles = article_count,
        "Library deleted"
    );

    Ok(Json(DeleteLibraryResponse {
        deleted: true,
        deleted_articles: article_count,
    }))
}
