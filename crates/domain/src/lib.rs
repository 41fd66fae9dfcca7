//! # rowkeep-domain
//!
//! Pure domain model for the rowkeep persistence layer.
//!
//! ## Responsibilities
//! - Foundational types: integer identities, dynamic [`Value`](value::Value)s,
//!   validated SQL [`Identifier`](identifier::Identifier)s, error conventions
//! - Define the **entity contract**: identity plus fingerprint-based change
//!   tracking ([`Entity`](entity::Entity), [`Tracking`](entity::Tracking))
//! - Define **schema descriptors**: the explicit column ↔ accessor mapping each
//!   entity type declares once ([`Schema`](schema::Schema))
//! - Ship the sample [`User`](user::User) entity
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod identifier;
pub mod value;

pub mod entity;
pub mod schema;
pub mod user;
