//! Share management endpoints.
//!
//! # Endpoints
//!
//! Project shares:
//! - `POST /v1/projects/:id/shares` - Share a project (owner only)
//! - `GET /v1/projects/:id/shares` - List a project's shares (owner only)
//! - `GET /v1/project-shares` - Shares the caller has received
//! - `PUT /v1/project-shares/:id` - Change a share's role (owner only)
//! - `POST /v1/project-shares/:id/accept` - Accept a pending share
//! - `DELETE /v1/project-shares/:id` - Revoke (owner) or leave (recipient)
//!
//! Library shares:
//! - `POST /v1/libraries/:id/shares` - Share a library (owner only)
//! - `GET /v1/libraries/:id/shares` - List a library's shares (owner only)
//! - `PUT /v1/library-shares/:id` - Change a share's role (owner only)
//! - `DELETE /v1/library-shares/:id` - Revoke a share (owner only)
//!
//! Sharing a resource with yourself is rejected; a project share grants
//! nothing until the recipient accepts it, while library shares are
//! effective immediately.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chantier_shared::{
    access::{self, Action, ShareRole},
    auth::middleware::AuthContext,
    models::{
        library_share::{CreateLibraryShare, LibraryShare},
        project_share::{CreateProjectShare, ProjectShare, ShareStatus},
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Share creation request
///
/// The recipient is looked up by email, the way sharing is done from the
/// client.
#[derive(Debug, Deserialize)]
pub struct CreateShareRequest {
    pub email: String,
    pub role: ShareRole,
}

/// Share role update request
#[derive(Debug, Deserialize)]
pub struct UpdateShareRequest {
    pub role: ShareRole,
}

/// Resolves a share recipient by email, rejecting self-shares
async fn resolve_recipient(
    state: &AppState,
    auth: &AuthContext,
    email: &str,
) -> ApiResult<User> {
    let recipient = User::find_by_email(&state.db, &email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("No user with this email".to_string()))?;

    if recipient.id == auth.user_id {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "You cannot share a resource with yourself".to_string(),
        }]));
    }

    Ok(recipient)
}

/// Shares a project with another user (owner only)
///
/// The share starts pending; the recipient sees it in their received list
/// but gains no access until they accept.
pub async fn create_project_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateShareRequest>,
) -> ApiResult<Json<ProjectShare>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Share).await?;

    let recipient = resolve_recipient(&state, &auth, &req.email).await?;

    let share = ProjectShare::create(
        &state.db,
        CreateProjectShare {
            project_id,
            owner_id: auth.user_id,
            shared_with_user_id: recipient.id,
            role: req.role,
        },
    )
    .await?;

    tracing::info!(
        project_id = %project_id,
        recipient = %recipient.id,
        role = req.role.as_str(),
        "Project shared"
    );

    Ok(Json(share))
}

/// Lists a project's shares (owner only)
pub async fn list_project_shares(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectShare>>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Share).await?;

    let shares = ProjectShare::list_by_project(&state.db, project_id).await?;

    Ok(Json(shares))
}

/// Lists the project shares the caller has received, pending included
pub async fn list_received_project_shares(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectShare>>> {
    let shares = ProjectShare::list_received(&state.db, auth.user_id).await?;

    Ok(Json(shares))
}

/// Changes the role of a project share (owner only)
pub async fn update_project_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(share_id): Path<Uuid>,
    Json(req): Json<UpdateShareRequest>,
) -> ApiResult<Json<ProjectShare>> {
    let share = ProjectShare::find_by_id(&state.db, share_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if share.owner_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    let updated = ProjectShare::update_role(&state.db, share_id, req.role)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    Ok(Json(updated))
}

/// Accepts a pending project share (recipient only)
pub async fn accept_project_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(share_id): Path<Uuid>,
) -> ApiResult<Json<ProjectShare>> {
    let share = ProjectShare::find_by_id(&state.db, share_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if share.shared_with_user_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    if share.status == ShareStatus::Accepted {
        return Ok(Json(share));
    }

    let accepted = ProjectShare::accept(&state.db, share_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    tracing::info!(share_id = %share_id, "Project share accepted");

    Ok(Json(accepted))
}

/// Deletes a project share
///
/// The owner revokes; the recipient leaves the shared project. This is the
/// one mutation on a share that does not require ownership.
pub async fn delete_project_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(share_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let share = ProjectShare::find_by_id(&state.db, share_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if share.owner_id != auth.user_id && share.shared_with_user_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    ProjectShare::delete(&state.db, share_id).await?;

    tracing::info!(share_id = %share_id, "Project share removed");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Shares a library with another user (owner only)
///
/// Effective immediately: library shares have no pending state.
pub async fn create_library_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
    Json(req): Json<CreateShareRequest>,
) -> ApiResult<Json<LibraryShare>> {
    access::require_library(&state.db, library_id, auth.user_id, Action::Share).await?;

    let recipient = resolve_recipient(&state, &auth, &req.email).await?;

    let share = LibraryShare::create(
        &state.db,
        CreateLibraryShare {
            library_id,
            owner_id: auth.user_id,
            shared_with_user_id: recipient.id,
            role: req.role,
        },
    )
    .await?;

    tracing::info!(
        library_id = %library_id,
        recipient = %recipient.id,
        role = req.role.as_str(),
        "Library shared"
    );

    Ok(Json(share))
}

/// Lists a library's shares (owner only)
pub async fn list_library_shares(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(library_id): Path<Uuid>,
) -> ApiResult<Json<Vec<LibraryShare>>> {
    access::require_library(&state.db, library_id, auth.user_id, Action::Share).await?;

    let shares = LibraryShare::list_by_library(&state.db, library_id).await?;

    Ok(Json(shares))
}

/// Changes the role of a library share (owner only)
pub async fn update_library_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(share_id): Path<Uuid>,
    Json(req): Json<UpdateShareRequest>,
) -> ApiResult<Json<LibraryShare>> {
    let share = LibraryShare::find_by_id(&state.db, share_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if share.owner_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    let updated = LibraryShare::update_role(&state.db, share_id, req.role)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    Ok(Json(updated))
}

/// Revokes a library share (owner only)
pub async fn delete_library_share(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(share_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let share = LibraryShare::find_by_id(&state.db, share_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    if share.owner_id != auth.user_id {
        return Err(ApiError::not_visible());
    }

    LibraryShare::delete(&state.db, share_id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
