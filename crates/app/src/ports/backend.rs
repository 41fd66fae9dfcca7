//! Backend port — the single database link and its statement primitives.

use std::future::Future;

use rowkeep_domain::error::BoxError;

use crate::bind::BindParameter;
use crate::row::Row;

/// Failure reported by a [`Link`], split by the phase that failed.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The backend rejected the statement text.
    #[error("prepare failed")]
    Prepare(#[source] BoxError),

    /// The statement was prepared but failed while executing.
    #[error("execute failed")]
    Execute(#[source] BoxError),
}

/// Outcome of a statement without a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecSummary {
    /// Rows inserted, updated or deleted.
    pub affected_rows: u64,
    /// First auto-increment value generated by the statement, `0` if none.
    pub last_insert_id: u64,
    /// Every generated identity, when the driver can report them directly.
    pub generated_ids: Option<Vec<i64>>,
}

/// Factory for the database link plus backend-specific text escaping.
pub trait Backend: Send + Sync {
    /// The live link this backend opens.
    type Link: Link;

    /// Open the link.
    fn connect(&self) -> impl Future<Output = Result<Self::Link, BoxError>> + Send;

    /// Escape `text` for contexts that cannot use parameter binding.
    fn escape(&self, text: &str) -> String;
}

/// One open database link; statements run strictly one after another.
pub trait Link: Send {
    /// Prepare and run `statement`, materializing every row.
    fn fetch(
        &mut self,
        statement: &str,
        params: &[BindParameter],
    ) -> impl Future<Output = Result<Vec<Row>, DriverError>> + Send;

    /// Prepare and run a statement that produces no result set.
    fn execute(
        &mut self,
        statement: &str,
        params: &[BindParameter],
    ) -> impl Future<Output = Result<ExecSummary, DriverError>> + Send;

    /// Release the link.
    fn close(self) -> impl Future<Output = ()> + Send;
}
