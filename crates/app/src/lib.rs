//! # rowkeep-app
//!
//! Application layer — the statement executor, the query builder and the
//! generic repository engine, plus the **port definitions** backends implement.
//!
//! ## Responsibilities
//! - Define **port traits** that storage adapters must implement:
//!   - `Backend` — opens the single database link, escapes text
//!   - `Link` — prepares and executes one statement with bound parameters
//! - Provide the [`Connection`](connection::Connection): lazy link, bind type
//!   inference, per-statement timing, failure diagnostics, generated-id
//!   reconstruction
//! - Build SELECT / INSERT / UPDATE / DELETE statements from schema
//!   descriptors, binding every value and quoting every identifier
//! - Provide the generic [`Repository`](repository::Repository): hydration,
//!   insert/update reconciliation and insert-vs-update partitioning
//! - Provide typed repositories built on top of it (`UserRepository`)
//!
//! ## Dependency rule
//! Depends on `rowkeep-domain` only (plus serde/chrono for diagnostics).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bind;
pub mod connection;
pub mod diagnostics;
pub mod ports;
pub mod query;
pub mod repository;
pub mod row;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
