//! Project folder model and database operations.
//!
//! Folders form a per-user tree via `parent_folder_id`. Three system
//! folders exist for every user, created at registration and protected from
//! rename, recolor, reparent and deletion:
//!
//! - "Mes projets" (`my_projects`): default home for new projects
//! - "Archivés" (`archived`): default home for projects created archived
//! - "Projets partagés" (`shared`): display folder for projects shared by
//!   other users
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE system_folder AS ENUM ('my_projects', 'archived', 'shared');
//!
//! CREATE TABLE project_folders (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     name VARCHAR(255) NOT NULL,
//!     color VARCHAR(16),
//!     parent_folder_id UUID REFERENCES project_folders(id) ON DELETE SET NULL,
//!     is_system BOOLEAN NOT NULL DEFAULT FALSE,
//!     system_kind system_folder,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     UNIQUE (owner_id, system_kind)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The three protected per-user system folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "system_folder", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SystemFolder {
    /// Default folder for new projects
    MyProjects,

    /// Default folder for projects created with archived status
    Archived,

    /// Display folder for projects shared with this user
    Shared,
}

impl SystemFolder {
    /// Display name used when the folder is created at registration
    pub fn default_name(&self) -> &'static str {
        match self {
            SystemFolder::MyProjects => "Mes projets",
            SystemFolder::Archived => "Archivés",
            SystemFolder::Shared => "Projets partagés",
        }
    }
}

/// Project folder
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectFolder {
    pub id: Uuid,

    /// Owning user; folders are never shared
    pub owner_id: Uuid,

    pub name: String,

    /// Display color, free-form hex string
    pub color: Option<String>,

    /// Parent folder, None for top-level folders
    pub parent_folder_id: Option<Uuid>,

    /// Whether this is a protected system folder
    pub is_system: bool,

    /// Which system folder this is, None for regular folders
    pub system_kind: Option<SystemFolder>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a regular folder
#[derive(Debug, Clone)]
pub struct CreateFolder {
    pub owner_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub parent_folder_id: Option<Uuid>,
}

/// Input for updating a regular folder
///
/// Only non-None fields are written. `parent_folder_id` uses a double
/// Option: `Some(None)` moves the folder to the top level.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolder {
    pub name: Option<String>,
    pub color: Option<String>,
    pub parent_folder_id: Option<Option<Uuid>>,
}

impl ProjectFolder {
    /// Creates a regular (non-system) folder
    pub async fn create(pool: &PgPool, data: CreateFolder) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectFolder>(
            r#"
            INSERT INTO project_folders (owner_id, name, color, parent_folder_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.color)
        .bind(data.parent_folder_id)
        .fetch_one(pool)
        .await
    }

    /// Creates the three system folders for a freshly registered user
    ///
    /// Registration is the only caller; the unique `(owner_id, system_kind)`
    /// constraint rejects duplicates.
    pub async fn bootstrap_for_user(pool: &PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
        for kind in [
            SystemFolder::MyProjects,
            SystemFolder::Archived,
            SystemFolder::Shared,
        ] {
            sqlx::query(
                r#"
                INSERT INTO project_folders (owner_id, name, is_system, system_kind)
                VALUES ($1, $2, TRUE, $3)
                "#,
            )
            .bind(owner_id)
            .bind(kind.default_name())
            .bind(kind)
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    /// Finds a folder by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFolder>("SELECT * FROM project_folders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetches one of the user's system folders
    ///
    /// System folders are created at registration, so a missing row means
    /// the account is corrupt; callers treat that as a storage-level error.
    pub async fn system(
        pool: &PgPool,
        owner_id: Uuid,
        kind: SystemFolder,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFolder>(
            "SELECT * FROM project_folders WHERE owner_id = $1 AND system_kind = $2",
        )
        .bind(owner_id)
        .bind(kind)
        .fetch_optional(pool)
        .await
    }

    /// Lists all folders owned by a user, system folders first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFolder>(
            r#"
            SELECT * FROM project_folders
            WHERE owner_id = $1
            ORDER BY is_system DESC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Lists the direct children of a folder
    pub async fn list_children(pool: &PgPool, parent_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFolder>(
            "SELECT * FROM project_folders WHERE parent_folder_id = $1",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// Collects a folder id and all of its descendants, breadth-first
    ///
    /// Used by folder deletion to reassign every project in the subtree
    /// before removing the folders themselves.
    pub async fn collect_subtree(pool: &PgPool, root_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut subtree = vec![root_id];
        let mut frontier = vec![root_id];

        while let Some(parent) = frontier.pop() {
            let children: Vec<Uuid> = sqlx::query_scalar(
                "SELECT id FROM project_folders WHERE parent_folder_id = $1",
            )
            .bind(parent)
            .fetch_all(pool)
            .await?;

            for child in children {
                subtree.push(child);
                frontier.push(child);
            }
        }

        Ok(subtree)
    }

    /// Updates a folder's name, color or parent
    ///
    /// Callers must reject system folders before calling; this method does
    /// not re-check.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateFolder,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (set_parent, parent) = match data.parent_folder_id {
            Some(value) => (true, value),
            None => (false, None),
        };

        sqlx::query_as::<_, ProjectFolder>(
            r#"
            UPDATE project_folders
            SET name = COALESCE($2, name),
                color = COALESCE($3, color),
                parent_folder_id = CASE WHEN $4 THEN $5 ELSE parent_folder_id END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.color)
        .bind(set_parent)
        .bind(parent)
        .fetch_optional(pool)
        .await
    }

    /// Reassigns every project filed under the given folders to a target
    /// folder
    ///
    /// Returns the number of projects moved.
    pub async fn reassign_projects(
        pool: &PgPool,
        folder_ids: &[Uuid],
        target_folder_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET folder_id = $2 WHERE folder_id = ANY($1)")
            .bind(folder_ids)
            .bind(target_folder_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a set of folders
    pub async fn delete_many(pool: &PgPool, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_folders WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_folder_names() {
        assert_eq!(SystemFolder::MyProjects.default_name(), "Mes projets");
        assert_eq!(SystemFolder::Archived.default_name(), "Archivés");
        assert_eq!(SystemFolder::Shared.default_name(), "Projets partagés");
    }

    #[test]
    fn test_system_folder_serde_names() {
        assert_eq!(
            serde_json::to_string(&SystemFolder::MyProjects).unwrap(),
            "\"my_projects\""
        );
        assert_eq!(
            serde_json::to_string(&SystemFolder::Shared).unwrap(),
            "\"shared\""
        );
    }
}
