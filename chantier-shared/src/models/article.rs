//! Article model and database operations.
//!
//! An article is a priced line item (designation, lot, unit, unit price)
//! belonging to exactly one library at a time. Moving articles between
//! libraries is a reassignment of `library_id`; the batch form runs in a
//! single transaction.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE articles (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     library_id UUID NOT NULL REFERENCES libraries(id) ON DELETE CASCADE,
//!     designation VARCHAR(512) NOT NULL,
//!     lot VARCHAR(255) NOT NULL,
//!     sub_category VARCHAR(255),
//!     unit VARCHAR(32) NOT NULL,
//!     unit_price DOUBLE PRECISION NOT NULL,
//!     status VARCHAR(64),
//!     is_favorite BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Priced article
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: Uuid,

    /// Owning library; exactly one at any time
    pub library_id: Uuid,

    /// What the article is, e.g. "Cloison placo BA13"
    pub designation: String,

    /// Work lot, e.g. "Gros œuvre"
    pub lot: String,

    pub sub_category: Option<String>,

    /// Pricing unit, e.g. "m²", "ml", "u"
    pub unit: String,

    pub unit_price: f64,

    pub status: Option<String>,

    pub is_favorite: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating an article
#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub library_id: Uuid,
    pub designation: String,
    pub lot: String,
    pub sub_category: Option<String>,
    pub unit: String,
    pub unit_price: f64,
    pub status: Option<String>,
}

/// Input for updating an article
#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub designation: Option<String>,
    pub lot: Option<String>,
    pub sub_category: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub status: Option<String>,
}

impl Article {
    /// Creates a new article
    pub async fn create(pool: &PgPool, data: CreateArticle) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (
                library_id, designation, lot, sub_category, unit, unit_price, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.library_id)
        .bind(data.designation)
        .bind(data.lot)
        .bind(data.sub_category)
        .bind(data.unit)
        .bind(data.unit_price)
        .bind(data.status)
        .fetch_one(pool)
        .await
    }

    /// Finds an article by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the articles of a library
    pub async fn list_by_library(pool: &PgPool, library_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE library_id = $1 ORDER BY lot ASC, designation ASC",
        )
        .bind(library_id)
        .fetch_all(pool)
        .await
    }

    /// Updates an article, leaving None fields untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateArticle,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET designation = COALESCE($2, designation),
                lot = COALESCE($3, lot),
                sub_category = COALESCE($4, sub_category),
                unit = COALESCE($5, unit),
                unit_price = COALESCE($6, unit_price),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.designation)
        .bind(data.lot)
        .bind(data.sub_category)
        .bind(data.unit)
        .bind(data.unit_price)
        .bind(data.status)
        .fetch_optional(pool)
        .await
    }

    /// Flips the favorite flag, returning the new value
    pub async fn toggle_favorite(pool: &PgPool, id: Uuid) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE articles
            SET is_favorite = NOT is_favorite, updated_at = NOW()
            WHERE id = $1
            RETURNING is_favorite
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an article
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reassigns a set of articles to a destination library in one
    /// transaction
    ///
    /// The permission filtering (which articles may leave their source
    /// library) happens before this call; here the whole reassignment either
    /// commits together or rolls back on a storage error. Returns the number
    /// of rows actually moved.
    pub async fn reassign_many(
        pool: &PgPool,
        article_ids: &[Uuid],
        destination_library_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut moved = 0u64;
        for article_id in article_ids {
            let result = sqlx::query(
                "UPDATE articles SET library_id = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(article_id)
            .bind(destination_library_id)
            .execute(&mut *tx)
            .await?;

            moved += result.rows_affected();
        }

        tx.commit().await?;

        Ok(moved)
    }
}
