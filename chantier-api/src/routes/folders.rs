//! Project folder endpoints.
//!
//! Folders are strictly per-user: every operation here checks `owner_id`
//! against the authenticated user directly, there is no sharing. System
//! folders reject rename, recolor, reparent and deletion outright.
//!
//! # Endpoints
//!
//! - `GET /v1/folders` - List own folders
//! - `POST /v1/folders` - Create a folder
//! - `PUT /v1/folders/:id` - Rename/recolor/reparent a folder
//! - `DELETE /v1/folders/:id` - Delete a folder subtree

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chantier_shared::{
    auth::middleware::AuthContext,
    models::folder::{CreateFolder, ProjectFolder, SystemFolder, UpdateFolder},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Folder creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 16, message = "Color must be at most 16 characters"))]
    pub color: Option<String>,

    pub parent_folder_id: Option<Uuid>,
}

/// Folder update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 16, message = "Color must be at most 16 characters"))]
    pub color: Option<String>,

    /// Present-and-null moves the folder to the top level
    #[serde(default, deserialize_with = "double_option")]
    pub parent_folder_id: Option<Option<Uuid>>,
}

/// Distinguishes an absent field (no change) from an explicit null (clear)
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Folder deletion response
#[derive(Debug, Serialize)]
pub struct DeleteFolderResponse {
    /// Folders removed (the target and its descendants)
    pub deleted_folders: u64,

    /// Projects reassigned to "Mes projets"
    pub reassigned_projects: u64,
}

/// Fetches a folder owned by the caller, hiding everything else
async fn owned_folder(
    state: &AppState,
    auth: &AuthContext,
    folder_id: Uuid,
) -> ApiResult<ProjectFolder> {
    let folder = ProjectFolder::find_by_id(&state.db, folder_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if folder.owner_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    Ok(folder)
}

/// Lists the caller's folders, system folders first
pub async fn list_folders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectFolder>>> {
    let folders = ProjectFolder::list_by_owner(&state.db, auth.user_id).await?;
    Ok(Json(folders))
}

/// Creates a folder under the caller's tree
pub async fn create_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<Json<ProjectFolder>> {
    req.validate().map_err(validation_details)?;

    if let Some(parent_id) = req.parent_folder_id {
        // The parent must exist and belong to the caller
        owned_folder(&state, &auth, parent_id).await?;
    }

    let folder = ProjectFolder::create(
        &state.db,
        CreateFolder {
            owner_id: auth.user_id,
            name: req.name,
            color: req.color,
            parent_folder_id: req.parent_folder_id,
        },
    )
    .await?;

    Ok(Json(folder))
}

/// Renames, recolors or reparents a folder
///
/// # Errors
///
/// - `403`: the folder is a system folder
pub async fn update_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(folder_id): Path<Uuid>,
    Json(req): Json<UpdateFolderRequest>,
) -> ApiResult<Json<ProjectFolder>> {
    req.validate().map_err(validation_details)?;

    let folder = owned_folder(&state, &auth, folder_id).await?;

    if folder.is_system {
        return Err(ApiError::Forbidden(
            "System folders cannot be modified".to_string(),
        ));
    }

    if let Some(Some(parent_id)) = req.parent_folder_id {
        if parent_id == folder_id {
            return Err(ApiError::BadRequest(
                "A folder cannot be its own parent".to_string(),
            ));
        }
        owned_folder(&state, &auth, parent_id).await?;
    }

    let updated = ProjectFolder::update(
        &state.db,
        folder_id,
        UpdateFolder {
            name: req.name,
            color: req.color,
            parent_folder_id: req.parent_folder_id,
        },
    )
    .await?
    .ok_or_else(ApiError::not_visible)?;

    Ok(Json(updated))
}

/// Deletes a folder and its whole subtree
///
/// Every project filed anywhere in the subtree is reassigned to the
/// caller's "Mes projets" system folder before the folders are removed.
///
/// # Errors
///
/// - `403`: the folder is a system folder
pub async fn delete_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<DeleteFolderResponse>> {
    let folder = owned_folder(&state, &auth, folder_id).await?;

    if folder.is_system {
        return Err(ApiError::Forbidden(
            "System folders cannot be deleted".to_string(),
        ));
    }

    let my_projects = ProjectFolder::system(&state.db, auth.user_id, SystemFolder::MyProjects)
        .await?
        .ok_or_else(|| {
            ApiError::InternalError("Missing system folder for user".to_string())
        })?;

    let subtree = ProjectFolder::collect_subtree(&state.db, folder_id).await?;
    let reassigned =
        ProjectFolder::reassign_projects(&state.db, &subtree, my_projects.id).await?;
    let deleted = ProjectFolder::delete_many(&state.db, &subtree).await?;

    tracing::info!(
        folder_id = %folder_id,
        deleted_folders = deleted,
        reassigned_projects = reassigned,
        "Folder subtree deleted"
    );

    Ok(Json(DeleteFolderResponse {
        deleted_folders: deleted,
        reassigned_projects: reassigned,
    }))
}
