//! Project-library association model.
//!
//! Linking a library to a project makes the library's articles available
//! for pricing that project, and, through the access resolver, lets users
//! who can read the project read the library too.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE project_libraries (
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     library_id UUID NOT NULL REFERENCES libraries(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (project_id, library_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::library::Library;

/// Project-library link
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectLibrary {
    pub project_id: Uuid,

    pub library_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl ProjectLibrary {
    /// Links a library to a project; linking twice is a no-op
    pub async fn link(
        pool: &PgPool,
        project_id: Uuid,
        library_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_libraries (project_id, library_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(library_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a link
    pub async fn unlink(
        pool: &PgPool,
        project_id: Uuid,
        library_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_libraries WHERE project_id = $1 AND library_id = $2")
                .bind(project_id)
                .bind(library_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a link exists
    pub async fn exists(
        pool: &PgPool,
        project_id: Uuid,
        library_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_libraries
                WHERE project_id = $1 AND library_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(library_id)
        .fetch_one(pool)
        .await
    }

    /// Lists the libraries linked to a project
    pub async fn libraries_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Library>, sqlx::Error> {
        sqlx::query_as::<_, Library>(
            r#"
            SELECT l.* FROM libraries l
            JOIN project_libraries pl ON pl.library_id = l.id
            WHERE pl.project_id = $1
            ORDER BY l.name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
