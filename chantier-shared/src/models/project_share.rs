//! Project share model and database operations.
//!
//! A project share grants a non-owner user a viewer or editor role on one
//! project. Shares start `pending` and grant nothing until the recipient
//! accepts them.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE share_status AS ENUM ('pending', 'accepted');
//!
//! CREATE TABLE project_shares (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     shared_with_user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     role share_role NOT NULL DEFAULT 'viewer',
//!     status share_status NOT NULL DEFAULT 'pending',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     UNIQUE (project_id, shared_with_user_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::ShareRole;

/// Lifecycle of a project share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    /// Created by the owner, not yet visible to the recipient's listings
    Pending,

    /// Accepted by the recipient; grants the share's role
    Accepted,
}

impl ShareStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareStatus::Pending => "pending",
            ShareStatus::Accepted => "accepted",
        }
    }
}

/// Project share grant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectShare {
    pub id: Uuid,

    pub project_id: Uuid,

    /// Project owner who created the grant
    pub owner_id: Uuid,

    /// Recipient of the grant
    pub shared_with_user_id: Uuid,

    pub role: ShareRole,

    pub status: ShareStatus,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a project share
#[derive(Debug, Clone)]
pub struct CreateProjectShare {
    pub project_id: Uuid,
    pub owner_id: Uuid,
    pub shared_with_user_id: Uuid,
    pub role: ShareRole,
}

impl ProjectShare {
    /// Creates a pending share
    ///
    /// # Errors
    ///
    /// Returns a unique-constraint error if the project is already shared
    /// with this user.
    pub async fn create(pool: &PgPool, data: CreateProjectShare) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectShare>(
            r#"
            INSERT INTO project_shares (project_id, owner_id, shared_with_user_id, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.project_id)
        .bind(data.owner_id)
        .bind(data.shared_with_user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await
    }

    /// Finds a share by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectShare>("SELECT * FROM project_shares WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the shares of a project
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectShare>(
            "SELECT * FROM project_shares WHERE project_id = $1 ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Lists the shares a user has received, pending ones included
    ///
    /// Pending shares appear here (so the recipient can accept them) but
    /// never in project listings.
    pub async fn list_received(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectShare>(
            "SELECT * FROM project_shares WHERE shared_with_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Updates the role of a share
    pub async fn update_role(
        pool: &PgPool,
        id: Uuid,
        role: ShareRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectShare>(
            "UPDATE project_shares SET role = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await
    }

    /// Marks a share accepted
    pub async fn accept(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectShare>(
            "UPDATE project_shares SET status = 'accepted' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a share (owner revocation or recipient leaving)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_shares WHERE id = $1")
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
    fn test_share_status_as_str() {
        assert_eq!(ShareStatus::Pending.as_str(), "pending");
        assert_eq!(ShareStatus::Accepted.as_str(), "accepted");
    }
}
