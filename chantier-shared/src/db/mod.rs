//! Database layer for Chantier
//!
//! Connection pooling and schema migrations. Models live in the `models`
//! module at the crate root.
//!
//! # Example
//!
//! ```no_run
//! use chantier_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
