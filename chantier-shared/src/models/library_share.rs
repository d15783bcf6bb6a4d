//! Library share model and database operations.
//!
//! Like a project share, but effective immediately: library shares have no
//! pending/accepted lifecycle.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE library_shares (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     library_id UUID NOT NULL REFERENCES libraries(id) ON DELETE CASCADE,
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     shared_with_user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     role share_role NOT NULL DEFAULT 'viewer',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     UNIQUE (library_id, shared_with_user_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::ShareRole;

/// Library share grant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LibraryShare {
    pub id: Uuid,

    pub library_id: Uuid,

    /// Library owner who created the grant
    pub owner_id: Uuid,

    /// Recipient of the grant
    pub shared_with_user_id: Uuid,

    pub role: ShareRole,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a library share
#[derive(Debug, Clone)]
pub struct CreateLibraryShare {
    pub library_id: Uuid,
    pub owner_id: Uuid,
    pub shared_with_user_id: Uuid,
    pub role: ShareRole,
}

impl LibraryShare {
    /// Creates a share
    ///
    /// # Errors
    ///
    /// Returns a unique-constraint error if the library is already shared
    /// with this user.
    pub async fn create(pool: &PgPool, data: CreateLibraryShare) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, LibraryShare>(
            r#"
            INSERT INTO library_shares (library_id, owner_id, shared_with_user_id, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.library_id)
        .bind(data.owner_id)
        .bind(data.shared_with_user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await
    }

    /// Finds a share by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LibraryShare>("SELECT * FROM library_shares WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the shares of a library
    pub async fn list_by_library(pool: &PgPool, library_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, LibraryShare>(
            "SELECT * FROM library_shares WHERE library_id = $1 ORDER BY created_at ASC",
        )
        .bind(library_id)
        .fetch_all(pool)
        .await
    }

    /// Updates the role of a share
    pub async fn update_role(
        pool: &PgPool,
        id: Uuid,
        role: ShareRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LibraryShare>(
            "UPDATE library_shares SET role = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a share
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM library_shares WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
