//! # rowkeep-adapter-storage-mysql-sqlx
//!
//! `MySQL` backend using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `Backend` and `Link` port traits defined in `rowkeep-app::ports`
//! - Build connection options from configuration (host, credentials, charset)
//! - Prepare statements and bind positional parameters with their inferred types
//! - Map between `MySQL` column values and `rowkeep_domain::value::Value`
//! - Escape text with `mysql_real_escape_string` rules
//!
//! ## Dependency rule
//! Depends on `rowkeep-app` (for port traits) and `rowkeep-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod backend;
pub mod config;
pub mod error;
pub mod escape;
mod value;

pub use backend::{MySqlBackend, MySqlLink};
pub use config::Config;
pub use error::StorageError;
