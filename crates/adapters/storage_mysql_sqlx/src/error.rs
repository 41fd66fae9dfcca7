//! Storage-specific error type wrapping sqlx errors.

use rowkeep_app::ports::DriverError;

/// Errors originating from the `MySQL` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// A column value has no counterpart in the value model.
    #[error("column `{column}` of type `{type_name}` cannot be decoded")]
    Undecodable {
        column: String,
        type_name: String,
        #[source]
        source: sqlx::Error,
    },
}

impl StorageError {
    pub(crate) fn prepare(self) -> DriverError {
        DriverError::Prepare(Box::new(self))
    }

    pub(crate) fn execute(self) -> DriverError {
        DriverError::Execute(Box::new(self))
    }
}
