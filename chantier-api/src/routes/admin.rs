//! Admin-only user management endpoints.
//!
//! # Endpoints
//!
//! - `GET /v1/admin/users` - List all users
//! - `DELETE /v1/admin/users/:id` - Delete a user with everything they own
//!
//! Deletion cascades deterministically: the user's projects first (their
//! shares, library links and document rows go with them), then their
//! libraries with all articles, then the user row itself. Admins cannot
//! delete their own account through this path.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chantier_shared::{
    auth::middleware::AuthContext,
    models::{document::Document, library::Library, project::Project, user::User},
};
use serde::Serialize;
use uuid::Uuid;

/// User deletion response
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub deleted: bool,

    /// Projects removed with the user
    pub deleted_projects: u64,

    /// Libraries removed with the user (articles cascade with each)
    pub deleted_libraries: u64,
}

fn require_admin(auth: &AuthContext) -> ApiResult<()> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }
    Ok(())
}

/// Lists all users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    require_admin(&auth)?;

    let users = User::list(&state.db).await?;

    Ok(Json(users))
}

/// Deletes a user and everything they own (admin only)
///
/// # Errors
///
/// - `403`: caller is not an admin
/// - `422`: caller tries to delete their own account
/// - `404`: no such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    require_admin(&auth)?;

    if user_id == auth.user_id {
        return Err(ApiError::ValidationError(vec![
            crate::error::ValidationErrorDetail {
                field: "id".to_string(),
                message: "You cannot delete your own account".to_string(),
            },
        ]));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    // Collect document paths before the rows disappear with the projects
    let document_paths = Document::list_paths_by_owner(&state.db, user_id).await?;

    let deleted_projects = Project::delete_by_owner(&state.db, user_id).await?;
    let deleted_libraries = Library::delete_by_owner(&state.db, user_id).await?;
    User::delete(&state.db, user_id).await?;

    state.docs.remove_all(&document_paths).await;

    tracing::info!(
        user_id = %user.id,
        deleted_projects,
        deleted_libraries,
        "User deleted by admin"
    );

    Ok(Json(DeleteUserResponse {
        deleted: true,
        deleted_projects,
        deleted_libraries,
    }))
}
