//! In-memory backend used by the unit tests of this crate.
//!
//! Responses are scripted in order; every statement that reaches the link is
//! recorded with its bound values.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rowkeep_domain::error::BoxError;
use rowkeep_domain::value::Value;

use crate::bind::BindParameter;
use crate::connection::Connection;
use crate::diagnostics::Diagnostics;
use crate::ports::{Backend, DriverError, ExecSummary, Link};
use crate::repository::Repository;
use crate::row::Row;

#[derive(Debug)]
enum Scripted {
    Rows(Vec<Row>),
    Exec(ExecSummary),
    PrepareError(String),
    ExecuteError(String),
}

/// A statement as seen by the link.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub statement: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Default)]
struct State {
    refuse_connect: bool,
    connects: usize,
    closes: usize,
    script: VecDeque<Scripted>,
    executed: Vec<Executed>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every connection attempt fails.
    pub fn refusing() -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().refuse_connect = true;
        backend
    }

    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.push(Scripted::Rows(rows))
    }

    /// Script an INSERT/UPDATE/DELETE outcome without a generated-id list.
    pub fn push_exec(&self, affected_rows: u64, last_insert_id: u64) -> &Self {
        self.push(Scripted::Exec(ExecSummary {
            affected_rows,
            last_insert_id,
            generated_ids: None,
        }))
    }

    pub fn push_generated(&self, ids: Vec<i64>) -> &Self {
        self.push(Scripted::Exec(ExecSummary {
            affected_rows: ids.len() as u64,
            last_insert_id: ids.first().copied().unwrap_or_default() as u64,
            generated_ids: Some(ids),
        }))
    }

    pub fn push_prepare_error(&self, message: &str) -> &Self {
        self.push(Scripted::PrepareError(message.to_string()))
    }

    pub fn push_execute_error(&self, message: &str) -> &Self {
        self.push(Scripted::ExecuteError(message.to_string()))
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .map(|executed| executed.statement)
            .collect()
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    fn push(&self, scripted: Scripted) -> &Self {
        self.state.lock().unwrap().script.push_back(scripted);
        self
    }

    fn open(&self) -> Result<FakeLink, BoxError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_connect {
            return Err("connection refused".into());
        }
        state.connects += 1;
        Ok(FakeLink {
            state: Arc::clone(&self.state),
        })
    }
}

impl Backend for FakeBackend {
    type Link = FakeLink;

    async fn connect(&self) -> Result<FakeLink, BoxError> {
        self.open()
    }

    fn escape(&self, text: &str) -> String {
        text.replace('\'', "\\'")
    }
}

#[derive(Debug)]
pub struct FakeLink {
    state: Arc<Mutex<State>>,
}

impl FakeLink {
    fn next(&self, statement: &str, params: &[BindParameter]) -> Option<Scripted> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(Executed {
            statement: statement.to_string(),
            params: params.iter().map(|param| param.value().clone()).collect(),
        });
        state.script.pop_front()
    }
}

impl Link for FakeLink {
    async fn fetch(
        &mut self,
        statement: &str,
        params: &[BindParameter],
    ) -> Result<Vec<Row>, DriverError> {
        match self.next(statement, params) {
            None => Ok(Vec::new()),
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::PrepareError(message)) => Err(DriverError::Prepare(message.into())),
            Some(Scripted::ExecuteError(message)) => Err(DriverError::Execute(message.into())),
            Some(Scripted::Exec(_)) => Err(DriverError::Execute("scripted exec for fetch".into())),
        }
    }

    async fn execute(
        &mut self,
        statement: &str,
        params: &[BindParameter],
    ) -> Result<ExecSummary, DriverError> {
        match self.next(statement, params) {
            None => Ok(ExecSummary::default()),
            Some(Scripted::Exec(summary)) => Ok(summary),
            Some(Scripted::PrepareError(message)) => Err(DriverError::Prepare(message.into())),
            Some(Scripted::ExecuteError(message)) => Err(DriverError::Execute(message.into())),
            Some(Scripted::Rows(_)) => Err(DriverError::Execute("scripted rows for execute".into())),
        }
    }

    async fn close(self) {
        self.state.lock().unwrap().closes += 1;
    }
}

pub fn connection(backend: &FakeBackend) -> Connection<FakeBackend> {
    Connection::new(backend.clone(), Diagnostics::verbose())
}

pub fn repository(backend: &FakeBackend) -> Repository<FakeBackend> {
    Repository::new(connection(backend))
}
