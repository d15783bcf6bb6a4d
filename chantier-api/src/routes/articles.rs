//! Article endpoints.
//!
//! # Endpoints
//!
//! - `GET /v1/libraries/:id/articles` - Articles of a library
//! - `POST /v1/libraries/:id/articles` - Create an article (editor+)
//! - `PUT /v1/articles/:id` - Update an article (editor+)
//! - `DELETE /v1/articles/:id` - Delete an article (editor+)
//! - `POST /v1/articles/:id/favorite` - Toggle the favorite flag
//! - `POST /v1/articles/move` - Batch move to another library

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chantier_shared::{
    access::{self, AccessRole, Action},
    auth::middleware::AuthContext,
    models::{
        article::{Article, CreateArticle, UpdateArticle},
        library::Library,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Article creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 512, message = "Designation must be 1-512 characters"))]
    pub designation: String,

    #[validate(length(min = 1, max = 255, message = "Lot must be 1-255 characters"))]
    pub lot: String,

    #[validate(length(max = 255, message = "Sub-category must be at most 255 characters"))]
    pub sub_category: Option<String>,

    #[validate(length(min = 1, max = 32, message = "Unit must be 1-32 characters"))]
    pub unit: String,

    #[validate(range(min = 0.0, message = "Unit price must not be negative"))]
    pub unit_price: f64,

    #[validate(length(max = 64, message = "Status must be at most 64 characters"))]
    pub status: Option<String>,
}

/// Article update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 512, message = "Designation must be 1-512 characters"))]
    pub designation: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Lot must be 1-255 characters"))]
    pub lot: Option<String>,

    #[validate(length(max = 255, message = "Sub-category must be at most 255 characters"))]
    pub sub_category: Option<String>,

    #[validate(length(min = 1, max = 32, message = "Unit must be 1-32 characters"))]
    pub unit: Option<String>,

    #[validate(range(min = 0.0, message = "Unit price must not be negative"))]
    pub unit_price: Option<f64>,

    #[validate(length(max = 64, message = "Status must be at most 64 characters"))]
    pub status: Option<String>,
}

/// Batch move request
#[derive(Debug, Deserialize)]
pub struct MoveArticlesRequest {
    pub article_ids: Vec<Uuid>,
    pub target_library_id: Uuid,
}

/// Batch move response
///
/// Articles the caller may not move out of their source library are
/// skipped, not errors: `moved_count` can be less than `total_requested`.
#[derive(Debug, Serialize)]
pub struct MoveArticlesResponse {
    pub moved_count: u64,
    pub total_requested: usize,
}

/// Favorite toggle response
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub is_favorite: bool,
}

/// Lists the articles of a library (read access required)
pub async fn list_articles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Article>>> {
    access::require_library(&state.db, library_id, auth.user_id, Action::Read).await?;

    let articles = Article::list_by_library(&state.db, library_id).await?;

    Ok(Json(articles))
}

/// Creates an article in a library (editor or owner)
pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
    Json(req): Json<CreateArticleRequest>,
) -> ApiResult<Json<Article>> {
    req.validate().map_err(validation_details)?;

    access::require_library(&state.db, library_id, auth.user_id, Action::Write).await?;

    let article = Article::create(
        &state.db,
        CreateArticle {
            library_id,
            designation: req.designation,
            lot: req.lot,
            sub_category: req.sub_category,
            unit: req.unit,
            unit_price: req.unit_price,
            status: req.status,
        },
    )
    .await?;

    Ok(Json(article))
}

/// Updates an article (editor or owner on its library)
pub async fn update_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(article_id): Path<Uuid>,
    Json(req): Json<UpdateArticleRequest>,
) -> ApiResult<Json<Article>> {
    req.validate().map_err(validation_details)?;

    access::require_article(&state.db, article_id, auth.user_id, Action::Write).await?;

    let article = Article::update(
        &state.db,
        article_id,
        UpdateArticle {
            designation: req.designation,
            lot: req.lot,
            sub_category: req.sub_category,
            unit: req.unit,
            unit_price: req.unit_price,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(ApiError::not_visible)?;

    Ok(Json(article))
}

/// Deletes an article (editor or owner on its library)
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    access::require_article(&state.db, article_id, auth.user_id, Action::Write).await?;

    let deleted = Article::delete(&state.db, article_id).await?;

    if !deleted {
        return Err(ApiError::not_visible());
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Toggles the favorite flag of an article
///
/// Requires direct ownership of the owning library; shared editors cannot
/// toggle favorites. This mirrors the original behavior on purpose.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let article = Article::find_by_id(&state.db, article_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    let library = Library::find_by_id(&state.db, article.library_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if library.owner_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    let is_favorite = Article::toggle_favorite(&state.db, article_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    Ok(Json(FavoriteResponse { is_favorite }))
}

/// Moves a batch of articles to another library
///
/// The destination needs editor or owner once for the whole batch; the
/// source library of each article is checked independently and articles
/// failing that check are skipped silently. The reassignment of the
/// passing subset runs in one transaction.
pub async fn move_articles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<MoveArticlesRequest>,
) -> ApiResult<Json<MoveArticlesResponse>> {
    if req.article_ids.is_empty() {
        return Err(ApiError::BadRequest("No articles to move".to_string()));
    }

    access::require_library(&state.db, req.target_library_id, auth.user_id, Action::Write).await?;

    let total_requested = req.article_ids.len();
    let mut movable = Vec::with_capacity(total_requested);

    for article_id in &req.article_ids {
        // Missing articles and articles the caller cannot edit out of
        // their source library are skipped, not errors
        match access::article_role(&state.db, *article_id, auth.user_id).await? {
            Some(role) if role.has_at_least(AccessRole::Editor) => movable.push(*article_id),
            _ => {}
        }
    }

    let moved_count = if movable.is_empty() {
        0
    } else {
        Article::reassign_many(&state.db, &movable, req.target_library_id).await?
    };

    tracing::info!(
        moved = moved_count,
        requested = total_requested,
        target_library = %req.target_library_id,
        "Batch article move"
    );

    Ok(Json(MoveArticlesResponse {
        moved_count,
        total_requested,
    }))
}
