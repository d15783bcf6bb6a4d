//! Library model and database operations.
//!
//! A library is a priced-article catalog owned by one user. Libraries
//! flagged `is_global` are readable by every authenticated user; writing
//! still requires an explicit editor or owner grant.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE libraries (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     name VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     is_global BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Price-article library
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Library {
    pub id: Uuid,

    /// Owning user; never changes
    pub owner_id: Uuid,

    pub name: String,

    pub description: Option<String>,

    /// Readable by every authenticated user when set
    pub is_global: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a library
#[derive(Debug, Clone)]
pub struct CreateLibrary {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_global: bool,
}

/// Input for updating a library
#[derive(Debug, Clone, Default)]
pub struct UpdateLibrary {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_global: Option<bool>,
}

impl Library {
    /// Creates a new library
    pub async fn create(pool: &PgPool, data: CreateLibrary) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Library>(
            r#"
            INSERT INTO libraries (owner_id, name, description, is_global)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.is_global)
        .fetch_one(pool)
        .await
    }

    /// Finds a library by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every library the user can read
    ///
    /// Four independent conditions ORed together (ownership, direct share,
    /// global flag, readable linked project) with DISTINCT so a library
    /// matching several conditions appears once.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Library>(
            r#"
            SELECT DISTINCT l.* FROM libraries l
            LEFT JOIN library_shares ls
                ON ls.library_id = l.id AND ls.shared_with_user_id = $1
            LEFT JOIN project_libraries pl ON pl.library_id = l.id
            LEFT JOIN projects p ON p.id = pl.project_id
            LEFT JOIN project_shares ps
                ON ps.project_id = p.id
                AND ps.shared_with_user_id = $1
                AND ps.status = 'accepted'
            WHERE l.owner_id = $1
                OR ls.id IS NOT NULL
                OR l.is_global
                OR p.owner_id = $1
                OR ps.id IS NOT NULL
            ORDER BY l.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Updates a library, leaving None fields untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateLibrary,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Library>(
            r#"
            UPDATE libraries
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_global = COALESCE($4, is_global),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.is_global)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a library and, via SQL cascade, all of its articles
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every library owned by a user, returning the count
    ///
    /// Articles go with each library via SQL cascade. Part of the admin
    /// user-deletion cascade, run after the user's projects are gone.
    pub async fn delete_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM libraries WHERE owner_id = $1")
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts the articles in a library
    pub async fn article_count(pool: &PgPool, id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM articles WHERE library_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
