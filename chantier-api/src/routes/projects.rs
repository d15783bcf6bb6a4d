//! Project endpoints.
//!
//! # Endpoints
//!
//! - `GET /v1/projects` - Owned and accepted-shared projects
//! - `POST /v1/projects` - Create a project
//! - `GET /v1/projects/:id` - Project detail
//! - `PUT /v1/projects/:id` - Update (editor or owner)
//! - `DELETE /v1/projects/:id` - Delete (owner only)
//! - `GET /v1/projects/:id/libraries` - Libraries linked to the project
//! - `POST /v1/projects/:id/libraries` - Link a library
//! - `DELETE /v1/projects/:id/libraries/:library_id` - Unlink a library

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
    models::{
        document::Document,
        folder::{ProjectFolder, SystemFolder},
        library::Library,
        project::{CreateProject, Project, ProjectStatus, UpdateProject},
        project_library::ProjectLibrary,
    },
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Target folder; when absent the project is filed by its status
    pub folder_id: Option<Uuid>,

    #[validate(length(max = 255, message = "Client must be at most 255 characters"))]
    pub client: Option<String>,

    #[validate(length(max = 255, message = "Typology must be at most 255 characters"))]
    pub typology: Option<String>,

    #[validate(length(max = 255, message = "Reference must be at most 255 characters"))]
    pub internal_reference: Option<String>,

    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    pub expected_delivery: Option<NaiveDate>,

    pub total_surface: Option<f64>,

    #[serde(default = "default_status")]
    pub status: ProjectStatus,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Draft
}

/// Project update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub folder_id: Option<Uuid>,

    #[validate(length(max = 255, message = "Client must be at most 255 characters"))]
    pub client: Option<String>,

    #[validate(length(max = 255, message = "Typology must be at most 255 characters"))]
    pub typology: Option<String>,

    #[validate(length(max = 255, message = "Reference must be at most 255 characters"))]
    pub internal_reference: Option<String>,

    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    pub expected_delivery: Option<NaiveDate>,

    pub total_surface: Option<f64>,

    /// Any status may be set from any other; there is no state machine
    pub status: Option<ProjectStatus>,
}

/// Library assignment request
#[derive(Debug, Deserialize)]
pub struct AssignLibraryRequest {
    pub library_id: Uuid,
}

/// Project with the caller's effective role attached
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,

    /// The caller's role on this project
    pub access_role: String,
}

/// Lists projects: owned plus accepted shares
///
/// Shared projects are reported under the caller's "Projets partagés"
/// system folder regardless of how the owner filed them; pending shares
/// never appear.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let mut projects = Project::list_owned(&state.db, auth.user_id).await?;

    let mut shared = Project::list_shared_with(&state.db, auth.user_id).await?;

    if !shared.is_empty() {
        let shared_folder = ProjectFolder::system(&state.db, auth.user_id, SystemFolder::Shared)
            .await?
            .ok_or_else(|| {
                ApiError::InternalError("Missing system folder for user".to_string())
            })?;

        // Display-only override: the owner's filing is not exposed
        for project in &mut shared {
            project.folder_id = Some(shared_folder.id);
        }
    }

    projects.append(&mut shared);

    Ok(Json(projects))
}

/// Creates a project
///
/// Without an explicit folder, the project is filed into "Archivés" when
/// created with archived status and "Mes projets" otherwise.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_details)?;

    let folder_id = match req.folder_id {
        Some(folder_id) => {
            let folder = ProjectFolder::find_by_id(&state.db, folder_id)
                .await?
                .ok_or_else(ApiError::not_visible)?;
            if folder.owner_id != auth.user_id {
                return Err(ApiError::not_visible());
            }
            folder_id
        }
        None => {
            let kind = match req.status {
                ProjectStatus::Archived => SystemFolder::Archived,
                _ => SystemFolder::MyProjects,
            };
            ProjectFolder::system(&state.db, auth.user_id, kind)
                .await?
                .ok_or_else(|| {
                    ApiError::InternalError("Missing system folder for user".to_string())
                })?
                .id
        }
    };

    let project = Project::create(
        &state.db,
        CreateProject {
            owner_id: auth.user_id,
            folder_id: Some(folder_id),
            name: req.name,
            client: req.client,
            typology: req.typology,
            internal_reference: req.internal_reference,
            address: req.address,
            expected_delivery: req.expected_delivery,
            total_surface: req.total_surface,
            status: req.status,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, "Project created");

    Ok(Json(project))
}

/// Project detail with the caller's role
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectView>> {
    let role = access::require_project(&state.db, project_id, auth.user_id, Action::Read).await?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    Ok(Json(ProjectView {
        project,
        access_role: role.as_str().to_string(),
    }))
}

/// Updates a project (editor or owner)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_details)?;

    access::require_project(&state.db, project_id, auth.user_id, Action::Write).await?;

    if let Some(folder_id) = req.folder_id {
        // Filing stays within the owner's tree; a shared editor cannot
        // refile the project into their own folders
        let project = Project::find_by_id(&state.db, project_id)
            .await?
            .ok_or_else(ApiError::not_visible)?;
        let folder = ProjectFolder::find_by_id(&state.db, folder_id)
            .await?
            .ok_or_else(ApiError::not_visible)?;
        if folder.owner_id != project.owner_id {
            return Err(ApiError::not_visible());
        }
    }

    let project = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            folder_id: req.folder_id,
            name: req.name,
            client: req.client,
            typology: req.typology,
            internal_reference: req.internal_reference,
            address: req.address,
            expected_delivery: req.expected_delivery,
            total_surface: req.total_surface,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(ApiError::not_visible)?;

    Ok(Json(project))
}

/// Deletes a project (owner only)
///
/// Shares, library links and document rows cascade in SQL; document files
/// are removed from disk afterwards, best-effort.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Delete).await?;

    let document_paths = Document::list_paths_by_project(&state.db, project_id).await?;

    Project::delete(&state.db, project_id).await?;

    state.docs.remove_all(&document_paths).await;

    tracing::info!(project_id = %project_id, "Project deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Lists the libraries linked to a project (read access required)
pub async fn list_project_libraries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Library>>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Read).await?;

    let libraries = ProjectLibrary::libraries_for_project(&state.db, project_id).await?;

    Ok(Json(libraries))
}

/// Links a library to a project
///
/// Requires write on the project and read on the library: an editor may
/// bring in any library they can at least see.
pub async fn assign_library(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AssignLibraryRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Write).await?;
    access::require_library(&state.db, req.library_id, auth.user_id, Action::Read).await?;

    let linked = ProjectLibrary::link(&state.db, project_id, req.library_id).await?;

    Ok(Json(serde_json::json!({ "linked": linked })))
}

/// Unlinks a library from a project (write on the project)
pub async fn unassign_library(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, library_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Write).await?;

    let unlinked = ProjectLibrary::unlink(&state.db, project_id, library_id).await?;

    if !unlinked {
        return Err(ApiError::not_visible());
    }

    Ok(Json(serde_json::json!({ "unlinked": true })))
}
