//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that the executor, the typed
//! repositories and the storage adapters can all depend on them without
//! creating circular dependencies.

pub mod backend;
pub mod user_repo;

pub use backend::{Backend, DriverError, ExecSummary, Link};
pub use user_repo::{SaveReport, UserRepository};
