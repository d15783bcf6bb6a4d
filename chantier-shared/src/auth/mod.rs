//! Authentication primitives for Chantier
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and strength validation
//! - [`jwt`]: JWT access/refresh token generation and validation
//! - [`middleware`]: Axum middleware extracting the authenticated user
//!
//! Authorization (what an authenticated user may do with a resource) lives
//! in the crate-level [`crate::access`] module, not here.
//!
//! # Example
//!
//! ```no_run
//! use chantier_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//! # Ok(())
//! # }
//! ```

pub mod jwt;
pub mod middleware;
pub mod password;
