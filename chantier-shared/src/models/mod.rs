//! Database models for Chantier
//!
//! One module per entity, each providing the row struct, `CreateX`/`UpdateX`
//! input structs and static async CRUD methods over a `PgPool`.
//!
//! # Models
//!
//! - `user`: Accounts with an `admin`/`user` role
//! - `folder`: Per-user project folder tree, including system folders
//! - `project`: Construction projects
//! - `library`: Price-article libraries
//! - `article`: Priced articles, each belonging to exactly one library
//! - `project_share` / `library_share`: Per-resource role grants
//! - `project_library`: Library-to-project associations
//! - `document`: Uploaded file metadata, bytes live on disk
//!
//! # Example
//!
//! ```no_run
//! use chantier_shared::models::user::{CreateUser, User, UserRole};
//!
//! # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::Error> {
//! let user = User::create(&pool, CreateUser {
//!     email: "marie@example.com".to_string(),
//!     password_hash: Some("$argon2id$...".to_string()),
//!     role: UserRole::User,
//!     name: Some("Marie Dupont".to_string()),
//!     company: None,
//!     phone: None,
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod article;
pub mod document;
pub mod folder;
pub mod library;
pub mod library_share;
pub mod project;
pub mod project_library;
pub mod project_share;
pub mod user;
