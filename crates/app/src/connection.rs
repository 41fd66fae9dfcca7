//! Connection — the statement executor over a single lazily opened link.
//!
//! Every statement goes through the same pipeline: normalize the text, infer
//! bind types, check the placeholder count, open the link on first use, run
//! and time the statement, then map driver failures into [`RowkeepError`]
//! after recording diagnostics.

use std::mem;
use std::time::Instant;

use rowkeep_domain::error::RowkeepError;
use rowkeep_domain::id::EntityId;
use rowkeep_domain::value::Value;

use crate::bind::{BindParameter, bind_parameters, count_placeholders, normalize_statement};
use crate::diagnostics::{Diagnostics, QueryTiming};
use crate::ports::{Backend, DriverError, ExecSummary, Link};
use crate::row::Row;

/// Batches at or above this size are never reconstructed into id ranges.
pub const MAX_RECONSTRUCTED_IDS: u64 = 100_000;

/// Rebuild the ids of a multi-row insert from the first generated id.
///
/// Valid only for a single writer on one connection with an auto-increment
/// step of 1. Returns an empty list when nothing was inserted, when no id was
/// generated, when the batch reaches [`MAX_RECONSTRUCTED_IDS`], or when the
/// range would overflow.
#[must_use]
pub fn reconstruct_contiguous_ids(first_id: u64, affected_rows: u64) -> Vec<EntityId> {
    if affected_rows == 0 || first_id == 0 || affected_rows >= MAX_RECONSTRUCTED_IDS {
        return Vec::new();
    }
    let (Ok(first), Ok(count)) = (i64::try_from(first_id), i64::try_from(affected_rows)) else {
        return Vec::new();
    };
    let Some(last) = first.checked_add(count - 1) else {
        return Vec::new();
    };
    (first..=last).map(EntityId::new).collect()
}

enum LinkState<L> {
    Idle,
    Open(L),
    Closed,
}

/// Owns the database link of one unit of work.
///
/// The link is opened on the first statement and reused until
/// [`shutdown`](Self::shutdown). Methods take `&mut self`, so statements on a
/// connection never overlap.
pub struct Connection<B: Backend> {
    backend: B,
    state: LinkState<B::Link>,
    diagnostics: Diagnostics,
}

impl<B: Backend> Connection<B> {
    #[must_use]
    pub const fn new(backend: B, diagnostics: Diagnostics) -> Self {
        Self {
            backend,
            state: LinkState::Idle,
            diagnostics,
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Timing of the statements executed so far, see [`Diagnostics::history`].
    #[must_use]
    pub fn history(&self) -> &[QueryTiming] {
        self.diagnostics.history()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Open(_))
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, LinkState::Closed)
    }

    /// Run a statement and materialize every result row.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::UnbindableParameter`] or
    /// [`RowkeepError::ParameterCountMismatch`] before anything is sent,
    /// [`RowkeepError::ConnectionEstablish`] or
    /// [`RowkeepError::ConnectionClosed`] when no link is available, and
    /// [`RowkeepError::Prepare`] or [`RowkeepError::Execute`] when the
    /// backend rejects the statement.
    #[tracing::instrument(skip(self, params), fields(params = params.len()))]
    pub async fn fetch_query(
        &mut self,
        statement: &str,
        params: &[Value],
    ) -> Result<Vec<Row>, RowkeepError> {
        let (statement, bound) = self.bind(statement, params)?;
        self.open_link().await?;
        let LinkState::Open(link) = &mut self.state else {
            return Err(RowkeepError::ConnectionClosed);
        };
        let started = Instant::now();
        let result = link.fetch(&statement, &bound).await;
        self.complete(statement, params, started, result)
    }

    /// Run a statement that produces no result set.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_query`](Self::fetch_query).
    #[tracing::instrument(skip(self, params), fields(params = params.len()))]
    pub async fn update_query(&mut self, statement: &str, params: &[Value]) -> Result<(), RowkeepError> {
        self.execute(statement, params).await.map(|_| ())
    }

    /// Run an INSERT and return the generated identities in row order.
    ///
    /// The driver's own id list is used when it reports one; otherwise the
    /// ids are rebuilt with [`reconstruct_contiguous_ids`].
    ///
    /// # Errors
    ///
    /// Same as [`fetch_query`](Self::fetch_query).
    #[tracing::instrument(skip(self, params), fields(params = params.len()))]
    pub async fn insert_query(
        &mut self,
        statement: &str,
        params: &[Value],
    ) -> Result<Vec<EntityId>, RowkeepError> {
        let summary = self.execute(statement, params).await?;
        if let Some(ids) = summary.generated_ids {
            return Ok(ids.into_iter().map(EntityId::new).collect());
        }
        if summary.affected_rows >= MAX_RECONSTRUCTED_IDS {
            tracing::warn!(
                affected_rows = summary.affected_rows,
                "insert batch too large to reconstruct generated ids"
            );
        }
        Ok(reconstruct_contiguous_ids(
            summary.last_insert_id,
            summary.affected_rows,
        ))
    }

    /// Escape `text` with the backend's rules, for contexts that cannot bind.
    #[must_use]
    pub fn escape(&self, text: &str) -> String {
        self.backend.escape(text)
    }

    /// Release the link and clear the history.
    ///
    /// Safe to call when no link was ever opened and safe to call twice. Any
    /// statement issued afterwards fails with [`RowkeepError::ConnectionClosed`].
    pub async fn shutdown(&mut self) {
        if let LinkState::Open(link) = mem::replace(&mut self.state, LinkState::Closed) {
            link.close().await;
            tracing::debug!("database link closed");
        }
        self.diagnostics.clear();
    }

    async fn execute(
        &mut self,
        statement: &str,
        params: &[Value],
    ) -> Result<ExecSummary, RowkeepError> {
        let (statement, bound) = self.bind(statement, params)?;
        self.open_link().await?;
        let LinkState::Open(link) = &mut self.state else {
            return Err(RowkeepError::ConnectionClosed);
        };
        let started = Instant::now();
        let result = link.execute(&statement, &bound).await;
        self.complete(statement, params, started, result)
    }

    fn bind(
        &self,
        statement: &str,
        params: &[Value],
    ) -> Result<(String, Vec<BindParameter>), RowkeepError> {
        let statement = normalize_statement(statement);
        let bound = match bind_parameters(params) {
            Ok(bound) => bound,
            Err(err) => return Err(self.fail(err.into(), &statement, params)),
        };
        let placeholders = count_placeholders(&statement);
        if placeholders != bound.len() {
            let err = RowkeepError::ParameterCountMismatch {
                placeholders,
                bound: bound.len(),
            };
            return Err(self.fail(err, &statement, params));
        }
        Ok((statement, bound))
    }

    async fn open_link(&mut self) -> Result<(), RowkeepError> {
        match self.state {
            LinkState::Open(_) => Ok(()),
            LinkState::Closed => Err(RowkeepError::ConnectionClosed),
            LinkState::Idle => match self.backend.connect().await {
                Ok(link) => {
                    tracing::debug!("database link opened");
                    self.state = LinkState::Open(link);
                    Ok(())
                }
                Err(source) => Err(self.fail(RowkeepError::ConnectionEstablish(source), "", &[])),
            },
        }
    }

    fn complete<T>(
        &mut self,
        statement: String,
        params: &[Value],
        started: Instant,
        result: Result<T, DriverError>,
    ) -> Result<T, RowkeepError> {
        match result {
            Ok(output) => {
                self.diagnostics.record_timing(&statement, started.elapsed());
                Ok(output)
            }
            Err(DriverError::Prepare(source)) => {
                let err = RowkeepError::Prepare {
                    statement: statement.clone(),
                    source,
                };
                Err(self.fail(err, &statement, params))
            }
            Err(DriverError::Execute(source)) => {
                let err = RowkeepError::Execute {
                    statement: statement.clone(),
                    source,
                };
                Err(self.fail(err, &statement, params))
            }
        }
    }

    fn fail(&self, err: RowkeepError, statement: &str, params: &[Value]) -> RowkeepError {
        self.diagnostics.record_failure(&err, statement, params);
        err
    }
}

impl<B: Backend + std::fmt::Debug> std::fmt::Debug for Connection<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            LinkState::Idle => "idle",
            LinkState::Open(_) => "open",
            LinkState::Closed => "closed",
        };
        f.debug_struct("Connection")
            .field("backend", &self.backend)
            .field("state", &state)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
