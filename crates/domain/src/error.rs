//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`RowkeepError`]
//! via `#[from]`. Driver failures travel as boxed sources so this crate stays
//! free of any database dependency.

use crate::id::EntityId;

/// Boxed error produced by a database driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error returned by connections and repositories.
#[derive(Debug, thiserror::Error)]
pub enum RowkeepError {
    /// The database link could not be opened.
    #[error("failed to establish database connection")]
    ConnectionEstablish(#[source] BoxError),

    /// A statement was issued after the connection was shut down.
    #[error("connection has been shut down")]
    ConnectionClosed,

    /// The backend rejected the statement text.
    #[error("failed to prepare statement `{statement}`")]
    Prepare {
        statement: String,
        #[source]
        source: BoxError,
    },

    /// A parameter's runtime kind has no bind type.
    #[error(transparent)]
    UnbindableParameter(#[from] UnbindableParameterError),

    /// The statement's placeholders and the bound arguments disagree.
    #[error("statement has {placeholders} placeholders but {bound} bound parameters")]
    ParameterCountMismatch { placeholders: usize, bound: usize },

    /// The backend reported an error while executing the statement.
    #[error("failed to execute statement `{statement}`")]
    Execute {
        statement: String,
        #[source]
        source: BoxError,
    },

    /// A call-time column name is not declared in the entity's schema.
    #[error("column `{column}` is not declared for table `{table}`")]
    UnknownColumn { table: &'static str, column: String },

    /// An update could not resolve any WHERE predicate for an entity.
    #[error("update of `{table}` resolved no WHERE predicate for entity {id}")]
    MissingWherePredicate { table: &'static str, id: EntityId },

    /// An update could not resolve any SET column.
    #[error("update of `{table}` resolved no column to assign")]
    EmptyAssignment { table: &'static str },

    #[error("identity error")]
    Identity(#[from] IdentityError),

    #[error("value conversion error")]
    Value(#[from] ValueError),

    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// A requested row does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A positional parameter whose kind cannot be bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parameter {position} of kind `{kind}` cannot be bound")]
pub struct UnbindableParameterError {
    /// Zero-based parameter position.
    pub position: usize,
    /// Runtime kind of the offending value.
    pub kind: &'static str,
}

/// Identity assignment failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("entity already has identity {current}, refusing to assign {requested}")]
    Reassigned {
        current: EntityId,
        requested: EntityId,
    },

    #[error("persisted identity must be positive, got {0}")]
    NotPositive(EntityId),

    #[error("entity is already persisted as {0}, refusing to insert it again")]
    AlreadyPersisted(EntityId),
}

/// Failures converting a dynamic [`Value`](crate::value::Value) into a typed field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("`{0}` is not a valid date-time")]
    DateTime(String),
}

/// Rejected SQL identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier is {len} bytes long, the limit is 64")]
    TooLong { len: usize },

    #[error("identifier has invalid byte {byte:#04x} at position {position}")]
    InvalidByte { position: usize, byte: u8 },
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("email must contain `@`")]
    InvalidEmail,

    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
}
