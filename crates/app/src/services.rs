//! Application services — use-case implementations.
//!
//! [`UserRepository`](crate::ports::UserRepository) is implemented here for
//! the generic [`Repository`](crate::repository::Repository); the service
//! struct accepts any implementation of the port via a generic parameter
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod user_repository;
pub mod user_service;

pub use user_service::UserService;
