//! Document model and database operations.
//!
//! Documents are file attachments on a project. The row holds metadata only
//! (original filename, size, format, where the bytes were stored); the bytes
//! themselves live on disk under a path keyed by project id, written by the
//! API layer.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE document_kind AS ENUM ('plan', 'document');
//!
//! CREATE TABLE documents (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     uploaded_by UUID REFERENCES users(id) ON DELETE SET NULL,
//!     doc_type document_kind NOT NULL,
//!     filename VARCHAR(512) NOT NULL,
//!     stored_path VARCHAR(1024) NOT NULL,
//!     size_bytes BIGINT NOT NULL,
//!     format VARCHAR(16) NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Kind of document, deciding which file formats are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Technical drawing
    Plan,

    /// General project document
    Document,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Plan => "plan",
            DocumentKind::Document => "document",
        }
    }

    /// File extensions accepted for this kind, lowercase without the dot
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentKind::Plan => &["dwg", "pdf", "dxf"],
            DocumentKind::Document => &[
                "pdf", "jpg", "jpeg", "png", "doc", "docx", "xls", "xlsx",
            ],
        }
    }

    /// Checks an extension against the allow-list, case-insensitively
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.allowed_extensions().contains(&ext.as_str())
    }
}

/// Extracts the lowercase extension of a filename, if any
pub fn file_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Document metadata row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,

    pub project_id: Uuid,

    /// Uploader; None if the account was since deleted
    pub uploaded_by: Option<Uuid>,

    pub doc_type: DocumentKind,

    /// Original filename as uploaded
    pub filename: String,

    /// Where the bytes were written on disk
    pub stored_path: String,

    pub size_bytes: i64,

    /// Lowercase file extension
    pub format: String,

    pub created_at: DateTime<Utc>,
}

/// Input for recording an uploaded document
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub project_id: Uuid,
    pub uploaded_by: Uuid,
    pub doc_type: DocumentKind,
    pub filename: String,
    pub stored_path: String,
    pub size_bytes: i64,
    pub format: String,
}

impl Document {
    /// Records an uploaded document
    pub async fn create(pool: &PgPool, data: CreateDocument) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                project_id, uploaded_by, doc_type, filename, stored_path, size_bytes, format
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.project_id)
        .bind(data.uploaded_by)
        .bind(data.doc_type)
        .bind(data.filename)
        .bind(data.stored_path)
        .bind(data.size_bytes)
        .bind(data.format)
        .fetch_one(pool)
        .await
    }

    /// Finds a document by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the documents of a project
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Collects the stored paths of every document attached to a project
    ///
    /// Used before project deletion so the files can be removed after the
    /// rows are gone.
    pub async fn list_paths_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT stored_path FROM documents WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Collects stored paths across every project owned by a user
    ///
    /// Part of the admin user-deletion cascade.
    pub async fn list_paths_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT d.stored_path FROM documents d
            JOIN projects p ON p.id = d.project_id
            WHERE p.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes a document row
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_extensions() {
        assert!(DocumentKind::Plan.accepts_extension("dwg"));
        assert!(DocumentKind::Plan.accepts_extension("pdf"));
        assert!(DocumentKind::Plan.accepts_extension("dxf"));
        assert!(!DocumentKind::Plan.accepts_extension("jpg"));
        assert!(!DocumentKind::Plan.accepts_extension("docx"));
    }

    #[test]
    fn test_document_extensions() {
        for ext in ["pdf", "jpg", "jpeg", "png", "doc", "docx", "xls", "xlsx"] {
            assert!(DocumentKind::Document.accepts_extension(ext), "{ext}");
        }
        assert!(!DocumentKind::Document.accepts_extension("dwg"));
        assert!(!DocumentKind::Document.accepts_extension("exe"));
    }

    #[test]
    fn test_accepts_extension_case_and_dot() {
        assert!(DocumentKind::Plan.accepts_extension("PDF"));
        assert!(DocumentKind::Plan.accepts_extension(".dwg"));
        assert!(DocumentKind::Document.accepts_extension(".JPEG"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("plan.DWG"), Some("dwg".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noextension"), None);
        assert_eq!(file_extension("trailingdot."), None);
    }
}
