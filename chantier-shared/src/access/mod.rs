//! Access control for Chantier resources.
//!
//! Every project, library and article operation is gated by this module.
//! Access is decided from four independent grant sources, highest role wins:
//!
//! 1. **Ownership**: the resource's `owner_id` matches the user.
//! 2. **Direct share**: a `ProjectShare` (accepted only) or `LibraryShare`
//!    row names the user.
//! 3. **Global library**: a library flagged `is_global` is readable by any
//!    authenticated user.
//! 4. **Transitive project grant**: a library linked to a project the user
//!    can read inherits a role from that project, across *all* linked
//!    projects.
//!
//! Denied lookups never reveal whether the resource exists:
//! [`AccessError::Denied`] covers both "not found" and "forbidden". Storage
//! failures are a distinct error kind and are never conflated with a
//! permission decision.
//!
//! # Example
//!
//! ```no_run
//! use chantier_shared::access::{self, Action};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid, library_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! // Editor or better required to add an article
//! let role = access::require_library(&pool, library_id, user_id, Action::Write).await?;
//! tracing::debug!(role = role.as_str(), "library write permitted");
//! # Ok(())
//! # }
//! ```

pub mod resolver;

pub use resolver::{
    article_role, library_role, project_role, require_article, require_library, require_project,
};

use serde::{Deserialize, Serialize};

/// Role granted by a share row
///
/// The subset of [`AccessRole`] that can be stored on a `ProjectShare` or
/// `LibraryShare`; ownership is never granted through a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    /// Read-only access
    Viewer,

    /// Read and write access
    Editor,
}

impl ShareRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareRole::Viewer => "viewer",
            ShareRole::Editor => "editor",
        }
    }

    /// Converts the stored share role into an effective access role
    pub fn as_access_role(&self) -> AccessRole {
        match self {
            ShareRole::Viewer => AccessRole::Viewer,
            ShareRole::Editor => AccessRole::Editor,
        }
    }
}

/// Effective role of a user on a resource
///
/// Hierarchy: Owner > Editor > Viewer. The resolver always reports the
/// highest role among all matching grant sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessRole {
    /// Read-only access
    Viewer,

    /// May create and modify content, but not share or delete the resource
    Editor,

    /// Full control, including sharing and deletion
    Owner,
}

impl AccessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRole::Viewer => "viewer",
            AccessRole::Editor => "editor",
            AccessRole::Owner => "owner",
        }
    }

    /// Numeric level for precedence comparison
    fn level(&self) -> u8 {
        match self {
            AccessRole::Viewer => 1,
            AccessRole::Editor => 2,
            AccessRole::Owner => 3,
        }
    }

    /// Checks whether this role meets a minimum required role
    pub fn has_at_least(&self, required: AccessRole) -> bool {
        self.level() >= required.level()
    }

    /// Whether this role permits the given action
    pub fn allows(&self, action: Action) -> bool {
        self.has_at_least(action.min_role())
    }

    /// Returns the higher of two roles
    pub fn max(self, other: AccessRole) -> AccessRole {
        if self.level() >= other.level() {
            self
        } else {
            other
        }
    }
}

/// Role a library inherits from a linked project
///
/// Editors and owners of a linked project get editor rights on the library;
/// viewers get viewer rights. Ownership itself never propagates.
pub fn derived_library_role(project_role: AccessRole) -> AccessRole {
    match project_role {
        AccessRole::Owner | AccessRole::Editor => AccessRole::Editor,
        AccessRole::Viewer => AccessRole::Viewer,
    }
}

/// Folds a new grant into the best role seen so far
pub(crate) fn fold_role(best: Option<AccessRole>, grant: AccessRole) -> Option<AccessRole> {
    Some(match best {
        Some(current) => current.max(grant),
        None => grant,
    })
}

/// Actions a user can request on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read the resource or list its contents
    Read,

    /// Create, update or move content within the resource
    Write,

    /// Grant or modify shares on the resource
    Share,

    /// Delete the resource itself
    Delete,
}

impl Action {
    /// Minimum role required for this action
    pub fn min_role(&self) -> AccessRole {
        match self {
            Action::Read => AccessRole::Viewer,
            Action::Write => AccessRole::Editor,
            Action::Share | Action::Delete => AccessRole::Owner,
        }
    }
}

/// Error type for access resolution
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The resource does not exist, or the user is not permitted to know
    /// whether it exists
    #[error("Resource not found or not accessible")]
    Denied,

    /// Underlying storage failure, unrelated to the permission decision
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_precedence() {
        assert!(AccessRole::Owner.has_at_least(AccessRole::Editor));
        assert!(AccessRole::Owner.has_at_least(AccessRole::Viewer));
        assert!(AccessRole::Editor.has_at_least(AccessRole::Viewer));
        assert!(!AccessRole::Viewer.has_at_least(AccessRole::Editor));
        assert!(!AccessRole::Editor.has_at_least(AccessRole::Owner));
    }

    #[test]
    fn test_action_min_roles() {
        assert_eq!(Action::Read.min_role(), AccessRole::Viewer);
        assert_eq!(Action::Write.min_role(), AccessRole::Editor);
        assert_eq!(Action::Share.min_role(), AccessRole::Owner);
        assert_eq!(Action::Delete.min_role(), AccessRole::Owner);
    }

    #[test]
    fn test_role_allows_actions() {
        assert!(AccessRole::Viewer.allows(Action::Read));
        assert!(!AccessRole::Viewer.allows(Action::Write));

        assert!(AccessRole::Editor.allows(Action::Write));
        assert!(!AccessRole::Editor.allows(Action::Share));
        assert!(!AccessRole::Editor.allows(Action::Delete));

        assert!(AccessRole::Owner.allows(Action::Read));
        assert!(AccessRole::Owner.allows(Action::Write));
        assert!(AccessRole::Owner.allows(Action::Share));
        assert!(AccessRole::Owner.allows(Action::Delete));
    }

    #[test]
    fn test_share_role_conversion() {
        assert_eq!(ShareRole::Viewer.as_access_role(), AccessRole::Viewer);
        assert_eq!(ShareRole::Editor.as_access_role(), AccessRole::Editor);
    }

    #[test]
    fn test_derived_library_role() {
        // Ownership of a project grants editor (not owner) on linked libraries
        assert_eq!(derived_library_role(AccessRole::Owner), AccessRole::Editor);
        assert_eq!(derived_library_role(AccessRole::Editor), AccessRole::Editor);
        assert_eq!(derived_library_role(AccessRole::Viewer), AccessRole::Viewer);
    }

    #[test]
    fn test_fold_role_keeps_highest() {
        let best = fold_role(None, AccessRole::Viewer);
        assert_eq!(best, Some(AccessRole::Viewer));

        let best = fold_role(best, AccessRole::Editor);
        assert_eq!(best, Some(AccessRole::Editor));

        // A weaker grant never downgrades the result
        let best = fold_role(best, AccessRole::Viewer);
        assert_eq!(best, Some(AccessRole::Editor));

        let best = fold_role(best, AccessRole::Owner);
        assert_eq!(best, Some(AccessRole::Owner));
    }

    #[test]
    fn test_max_is_commutative() {
        assert_eq!(
            AccessRole::Viewer.max(AccessRole::Owner),
            AccessRole::Owner.max(AccessRole::Viewer)
        );
        assert_eq!(AccessRole::Editor.max(AccessRole::Editor), AccessRole::Editor);
    }
}
