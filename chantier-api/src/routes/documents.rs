//! Document endpoints.
//!
//! # Endpoints
//!
//! - `GET /v1/projects/:id/documents` - List a project's documents
//! - `POST /v1/projects/:id/documents` - Upload (multipart)
//! - `DELETE /v1/documents/:id` - Delete a document
//!
//! The upload is a multipart form with a `doc_type` field (`plan` or
//! `document`) and a `file` field. Extensions are checked against the
//! per-type allow-list before anything touches disk.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use chantier_shared::{
    access::{self, Action},
    auth::middleware::AuthContext,
    models::document::{file_extension, CreateDocument, Document, DocumentKind},
};
use bytes::Bytes;
use uuid::Uuid;

/// Maximum accepted upload size
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Lists the documents of a project (read access required)
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Document>>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Read).await?;

    let documents = Document::list_by_project(&state.db, project_id).await?;

    Ok(Json(documents))
}

/// Uploads a document to a project (editor or owner)
///
/// # Errors
///
/// - `422`: missing fields, unknown `doc_type`, or an extension outside the
///   allow-list for the declared type
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<Document>> {
    access::require_project(&state.db, project_id, auth.user_id, Action::Write).await?;

    let mut doc_type: Option<DocumentKind> = None;
    let mut filename: Option<String> = None;
    let mut bytes: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("doc_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Malformed field: {}", e)))?;
                doc_type = match value.as_str() {
                    "plan" => Some(DocumentKind::Plan),
                    "document" => Some(DocumentKind::Document),
                    other => {
                        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                            field: "doc_type".to_string(),
                            message: format!("Unknown document type: {}", other),
                        }]))
                    }
                };
            }
            Some("file") => {
                filename = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Malformed field: {}", e)))?;
                if data.len() > MAX_UPLOAD_BYTES {
                    return Err(ApiError::BadRequest("File too large".to_string()));
                }
                bytes = Some(data);
            }
            _ => {}
        }
    }

    let doc_type = doc_type.ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "doc_type".to_string(),
            message: "doc_type field is required".to_string(),
        }])
    })?;
    let filename = filename.ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "file".to_string(),
            message: "file field is required".to_string(),
        }])
    })?;
    let bytes = bytes.ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "file".to_string(),
            message: "file field is required".to_string(),
        }])
    })?;

    let extension = file_extension(&filename).ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "file".to_string(),
            message: "Filename has no extension".to_string(),
        }])
    })?;

    if !doc_type.accepts_extension(&extension) {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "file".to_string(),
            message: format!(
                "Format .{} is not allowed for type {} (allowed: {})",
                extension,
                doc_type.as_str(),
                doc_type.allowed_extensions().join(", ")
            ),
        }]));
    }

    let document_id = Uuid::new_v4();
    let stored_path = state
        .docs
        .write(project_id, document_id, &extension, &bytes)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store document: {}", e)))?;

    let document = Document::create(
        &state.db,
        CreateDocument {
            project_id,
            uploaded_by: auth.user_id,
            doc_type,
            filename,
            stored_path: stored_path.to_string_lossy().into_owned(),
            size_bytes: bytes.len() as i64,
            format: extension,
        },
    )
    .await?;

    tracing::info!(
        project_id = %project_id,
        document_id = %document.id,
        size_bytes = document.size_bytes,
        "Document uploaded"
    );

    Ok(Json(document))
}

/// Deletes a document (editor or owner on its project)
///
/// The row is removed first; the file removal afterwards is best-effort
/// and logged when it fails.
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let document = Document::find_by_id(&state.db, document_id)
        .await?
        .ok_or_else(ApiError::not_visible)?;

    access::require_project(&state.db, document.project_id, auth.user_id, Action::Write).await?;

    Document::delete(&state.db, document_id).await?;

    state.docs.remove(&document.stored_path).await;

    tracing::info!(document_id = %document_id, "Document deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
