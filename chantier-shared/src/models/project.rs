//! Project model and database operations.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE project_status AS ENUM ('draft', 'in_progress', 'done', 'archived');
//!
//! CREATE TABLE projects (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     folder_id UUID REFERENCES project_folders(id) ON DELETE SET NULL,
//!     name VARCHAR(255) NOT NULL,
//!     client VARCHAR(255),
//!     typology VARCHAR(255),
//!     internal_reference VARCHAR(255),
//!     address VARCHAR(512),
//!     expected_delivery DATE,
//!     total_surface DOUBLE PRECISION,
//!     status project_status NOT NULL DEFAULT 'draft',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! `status` is a plain enum field: any status can be set to any other, there
//! is no enforced state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project lifecycle status
///
/// Unconstrained: updates may move between any two statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    InProgress,
    Done,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Done => "done",
            ProjectStatus::Archived => "archived",
        }
    }

    /// Parses the wire/CSV form of a status
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "draft" | "brouillon" => Some(ProjectStatus::Draft),
            "in_progress" | "en_cours" | "en cours" => Some(ProjectStatus::InProgress),
            "done" | "termine" | "terminé" => Some(ProjectStatus::Done),
            "archived" | "archive" | "archivé" => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

/// Construction project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    /// Owning user; never changes for the lifetime of the project
    pub owner_id: Uuid,

    /// Folder the project is filed under in the owner's tree
    ///
    /// For projects shared with the requesting user, listings rewrite this
    /// to the requester's "Projets partagés" system folder.
    pub folder_id: Option<Uuid>,

    pub name: String,

    pub client: Option<String>,

    pub typology: Option<String>,

    pub internal_reference: Option<String>,

    pub address: Option<String>,

    pub expected_delivery: Option<NaiveDate>,

    /// Total surface in square meters
    pub total_surface: Option<f64>,

    pub status: ProjectStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    pub client: Option<String>,
    pub typology: Option<String>,
    pub internal_reference: Option<String>,
    pub address: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
    pub total_surface: Option<f64>,
    pub status: ProjectStatus,
}

/// Input for updating a project
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub folder_id: Option<Uuid>,
    pub name: Option<String>,
    pub client: Option<String>,
    pub typology: Option<String>,
    pub internal_reference: Option<String>,
    pub address: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
    pub total_surface: Option<f64>,
    pub status: Option<ProjectStatus>,
}

impl Project {
    /// Creates a new project
    ///
    /// Folder auto-assignment for a missing `folder_id` happens in the
    /// service layer, which knows the caller's system folders.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                owner_id, folder_id, name, client, typology,
                internal_reference, address, expected_delivery, total_surface, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(data.name)
        .bind(data.client)
        .bind(data.typology)
        .bind(data.internal_reference)
        .bind(data.address)
        .bind(data.expected_delivery)
        .bind(data.total_surface)
        .bind(data.status)
        .fetch_one(pool)
        .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists projects owned by a user
    pub async fn list_owned(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Lists projects shared with a user through an accepted share
    ///
    /// Pending shares never appear. The rows keep the owner's `folder_id`;
    /// callers rewrite it for display.
    pub async fn list_shared_with(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT p.* FROM projects p
            JOIN project_shares ps ON ps.project_id = p.id
            WHERE ps.shared_with_user_id = $1 AND ps.status = 'accepted'
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Updates a project, leaving None fields untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET folder_id = COALESCE($2, folder_id),
                name = COALESCE($3, name),
                client = COALESCE($4, client),
                typology = COALESCE($5, typology),
                internal_reference = COALESCE($6, internal_reference),
                address = COALESCE($7, address),
                expected_delivery = COALESCE($8, expected_delivery),
                total_surface = COALESCE($9, total_surface),
                status = COALESCE($10, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.folder_id)
        .bind(data.name)
        .bind(data.client)
        .bind(data.typology)
        .bind(data.internal_reference)
        .bind(data.address)
        .bind(data.expected_delivery)
        .bind(data.total_surface)
        .bind(data.status)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a project
    ///
    /// Shares, documents rows and library links go with it via SQL cascade;
    /// document files on disk are the service layer's responsibility.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every project owned by a user, returning the count
    ///
    /// Part of the admin user-deletion cascade.
    pub async fn delete_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE owner_id = $1")
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ProjectStatus::Draft.as_str(), "draft");
        assert_eq!(ProjectStatus::InProgress.as_str(), "in_progress");
        assert_eq!(ProjectStatus::Done.as_str(), "done");
        assert_eq!(ProjectStatus::Archived.as_str(), "archived");
    }

    #[test]
    fn test_status_parse_english() {
        assert_eq!(ProjectStatus::parse("draft"), Some(ProjectStatus::Draft));
        assert_eq!(
            ProjectStatus::parse("in_progress"),
            Some(ProjectStatus::InProgress)
        );
        assert_eq!(ProjectStatus::parse("archived"), Some(ProjectStatus::Archived));
    }

    #[test]
    fn test_status_parse_french_csv_forms() {
        assert_eq!(ProjectStatus::parse("Brouillon"), Some(ProjectStatus::Draft));
        assert_eq!(
            ProjectStatus::parse("en cours"),
            Some(ProjectStatus::InProgress)
        );
        assert_eq!(ProjectStatus::parse("Terminé"), Some(ProjectStatus::Done));
        assert_eq!(ProjectStatus::parse("Archivé"), Some(ProjectStatus::Archived));
    }

    #[test]
    fn test_status_parse_unknown() {
        assert_eq!(ProjectStatus::parse("paused"), None);
        assert_eq!(ProjectStatus::parse(""), None);
    }
}
