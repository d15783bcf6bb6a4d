//! API route handlers
//!
//! One module per resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, token refresh
//! - `me`: Own profile management
//! - `folders`: Project folder tree
//! - `projects`: Project CRUD and library assignments
//! - `libraries`: Library CRUD
//! - `articles`: Article CRUD, favorites, batch move
//! - `shares`: Project and library share management
//! - `documents`: Document upload and deletion
//! - `imports`: CSV import of articles and projects
//! - `admin`: Admin-only user management

pub mod admin;
pub mod articles;
pub mod auth;
pub mod documents;
pub mod folders;
pub mod health;
pub mod imports;
pub mod libraries;
pub mod me;
pub mod projects;
pub mod shares;
