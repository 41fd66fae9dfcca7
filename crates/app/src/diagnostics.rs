//! Statement timing history and failure reporting.
//!
//! Every executed statement is timed and kept in an ordered in-memory history.
//! In verbose mode the history is unbounded and failures are dumped inline
//! through `tracing`. Otherwise only the last [`LOGGED_HISTORY_WINDOW`]
//! timings are kept, and each failure is appended as one JSON line, history
//! included, to an error log file.

use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rowkeep_domain::value::Value;
use serde::Serialize;

/// Number of recent timings kept outside verbose mode.
pub const LOGGED_HISTORY_WINDOW: usize = 32;

/// Where diagnostics go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMode {
    /// Keep a timing history and dump failures inline.
    Verbose,
    /// Append failures to the file at `path`.
    Logged { path: PathBuf },
}

/// Wall-clock duration of one executed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTiming {
    pub statement: String,
    pub duration: Duration,
}

/// One line of the error log.
#[derive(Debug, Serialize)]
struct FailureRecord<'a> {
    timestamp: DateTime<Utc>,
    error: String,
    statement: &'a str,
    params: &'a [Value],
    history: &'a [QueryTiming],
}

/// Diagnostic state owned by a connection.
#[derive(Debug)]
pub struct Diagnostics {
    mode: DiagnosticMode,
    history: Vec<QueryTiming>,
}

impl Diagnostics {
    #[must_use]
    pub const fn new(mode: DiagnosticMode) -> Self {
        Self {
            mode,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub const fn verbose() -> Self {
        Self::new(DiagnosticMode::Verbose)
    }

    #[must_use]
    pub fn logged(path: impl Into<PathBuf>) -> Self {
        Self::new(DiagnosticMode::Logged { path: path.into() })
    }

    #[must_use]
    pub const fn mode(&self) -> &DiagnosticMode {
        &self.mode
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        matches!(self.mode, DiagnosticMode::Verbose)
    }

    /// Timing history in execution order.
    ///
    /// Outside verbose mode this is the last [`LOGGED_HISTORY_WINDOW`]
    /// statements only.
    #[must_use]
    pub fn history(&self) -> &[QueryTiming] {
        &self.history
    }

    pub fn record_timing(&mut self, statement: &str, duration: Duration) {
        if self.is_verbose() {
            tracing::debug!(statement, ?duration, "statement executed");
        } else if self.history.len() >= LOGGED_HISTORY_WINDOW {
            self.history.remove(0);
        }
        self.history.push(QueryTiming {
            statement: statement.to_string(),
            duration,
        });
    }

    /// Report a failed statement.
    ///
    /// Never fails itself: if the error log cannot be written, a warning is
    /// emitted and the original failure still reaches the caller.
    pub fn record_failure(&self, error: &(dyn Error + 'static), statement: &str, params: &[Value]) {
        let chain = error_chain(error);
        match &self.mode {
            DiagnosticMode::Verbose => {
                tracing::error!(
                    error = %chain,
                    statement,
                    ?params,
                    history = ?self.history,
                    "statement failed"
                );
            }
            DiagnosticMode::Logged { path } => {
                let record = FailureRecord {
                    timestamp: Utc::now(),
                    error: chain,
                    statement,
                    params,
                    history: &self.history,
                };
                if let Err(err) = append_record(path, &record) {
                    tracing::warn!(path = %path.display(), error = %err, "unable to write error log");
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

fn append_record(path: &Path, record: &FailureRecord<'_>) -> io::Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&line)
}

/// Render `error` and all of its sources as `outer: inner: root`.
#[must_use]
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
