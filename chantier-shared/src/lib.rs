//! # Chantier Shared Library
//!
//! Shared types and business logic used by the Chantier API server:
//! database models for construction projects, price-article libraries and
//! their sharing relationships, plus the access resolver that decides what a
//! user may do with each resource.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `access`: Permission resolution (ownership, shares, global libraries,
//!   transitive project grants)
//! - `auth`: Password hashing, JWT tokens, request authentication
//! - `db`: Connection pool and migrations

pub mod access;
pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Chantier shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
