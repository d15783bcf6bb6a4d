//! SQL-backed role resolution.
//!
//! The `*_role` functions compute the effective [`AccessRole`] of a user on
//! a resource, returning `None` when the resource is missing or no grant
//! matches. The `require_*` functions layer the action check on top and
//! collapse both outcomes into [`AccessError::Denied`] so callers cannot
//! distinguish a hidden resource from a missing one.

use sqlx::PgPool;
use uuid::Uuid;

use super::{derived_library_role, fold_role, AccessError, AccessRole, Action, ShareRole};

/// Resolves the user's effective role on a project
///
/// Owner first, then an *accepted* direct share; a pending share grants
/// nothing.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn project_role(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<AccessRole>, sqlx::Error> {
    let owner_id: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

    let Some(owner_id) = owner_id else {
        return Ok(None);
    };

    if owner_id == user_id {
        return Ok(Some(AccessRole::Owner));
    }

    let share_role: Option<ShareRole> = sqlx::query_scalar(
        r#"
        SELECT role FROM project_shares
        WHERE project_id = $1 AND shared_with_user_id = $2 AND status = 'accepted'
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(share_role.map(|r| r.as_access_role()))
}

/// Resolves the user's effective role on a library
///
/// Combines, highest wins:
/// - ownership;
/// - a direct `LibraryShare`;
/// - the global flag (viewer for any authenticated user);
/// - roles derived from every project the library is linked to through
///   `project_libraries`, where project editors/owners derive editor and
///   project viewers derive viewer.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn library_role(
    pool: &PgPool,
    library_id: Uuid,
    user_id: Uuid,
) -> Result<Option<AccessRole>, sqlx::Error> {
    let meta: Option<(Uuid, bool)> =
        sqlx::query_as("SELECT owner_id, is_global FROM libraries WHERE id = $1")
            .bind(library_id)
            .fetch_optional(pool)
            .await?;

    let Some((owner_id, is_global)) = meta else {
        return Ok(None);
    };

    if owner_id == user_id {
        return Ok(Some(AccessRole::Owner));
    }

    let mut best: Option<AccessRole> = None;

    let share_role: Option<ShareRole> = sqlx::query_scalar(
        "SELECT role FROM library_shares WHERE library_id = $1 AND shared_with_user_id = $2",
    )
    .bind(library_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some(role) = share_role {
        best = fold_role(best, role.as_access_role());
    }

    if is_global {
        best = fold_role(best, AccessRole::Viewer);
    }

    // One row per linked project the user can read: ownership or an
    // accepted project share.
    let linked: Vec<(bool, Option<ShareRole>)> = sqlx::query_as(
        r#"
        SELECT (p.owner_id = $2) AS is_owner, ps.role
        FROM project_libraries pl
        JOIN projects p ON p.id = pl.project_id
        LEFT JOIN project_shares ps
            ON ps.project_id = p.id
            AND ps.shared_with_user_id = $2
            AND ps.status = 'accepted'
        WHERE pl.library_id = $1
            AND (p.owner_id = $2 OR ps.id IS NOT NULL)
        "#,
    )
    .bind(library_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    for (is_owner, share) in linked {
        let project_role = if is_owner {
            AccessRole::Owner
        } else {
            match share {
                Some(role) => role.as_access_role(),
                None => continue,
            }
        };

        best = fold_role(best, derived_library_role(project_role));
    }

    Ok(best)
}

/// Resolves the user's effective role on an article
///
/// Articles carry no grants of their own; the role is the role on the
/// owning library.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` on storage failure.
pub async fn article_role(
    pool: &PgPool,
    article_id: Uuid,
    user_id: Uuid,
) -> Result<Option<AccessRole>, sqlx::Error> {
    let library_id: Option<Uuid> =
        sqlx::query_scalar("SELECT library_id FROM articles WHERE id = $1")
            .bind(article_id)
            .fetch_optional(pool)
            .await?;

    let Some(library_id) = library_id else {
        return Ok(None);
    };

    library_role(pool, library_id, user_id).await
}

/// Requires a minimum role for an action on a project
///
/// # Errors
///
/// Returns [`AccessError::Denied`] when the project is missing, the user has
/// no role on it, or the role is below the action's minimum;
/// [`AccessError::Storage`] on database failure.
pub async fn require_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    action: Action,
) -> Result<AccessRole, AccessError> {
    let role = project_role(pool, project_id, user_id)
        .await?
        .ok_or(AccessError::Denied)?;

    if !role.allows(action) {
        return Err(AccessError::Denied);
    }

    Ok(role)
}

/// Requires a minimum role for an action on a library
///
/// # Errors
///
/// Same semantics as [`require_project`].
pub async fn require_library(
    pool: &PgPool,
    library_id: Uuid,
    user_id: Uuid,
    action: Action,
) -> Result<AccessRole, AccessError> {
    let role = library_role(pool, library_id, user_id)
        .await?
        .ok_or(AccessError::Denied)?;

    if !role.allows(action) {
        return Err(AccessError::Denied);
    }

    Ok(role)
}

/// Requires a minimum role for an action on an article
///
/// # Errors
///
/// Same semantics as [`require_project`].
pub async fn require_article(
    pool: &PgPool,
    article_id: Uuid,
    user_id: Uuid,
    action: Action,
) -> Result<AccessRole, AccessError> {
    let role = article_role(pool, article_id, user_id)
        .await?
        .ok_or(AccessError::Denied)?;

    if !role.allows(action) {
        return Err(AccessError::Denied);
    }

    Ok(role)
}
