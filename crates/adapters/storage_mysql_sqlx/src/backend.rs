//! `MySQL` implementation of the [`Backend`] and [`Link`] ports.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions as _, Connection as _, Executor as _, Statement as _};

use rowkeep_app::bind::{BindParameter, type_string};
use rowkeep_app::ports::{Backend, DriverError, ExecSummary, Link};
use rowkeep_app::row::Row;
use rowkeep_domain::error::BoxError;

use crate::error::StorageError;
use crate::escape::escape_string;
use crate::value::{bind, decode_row};

/// Opens single `MySQL` connections from fixed options.
#[derive(Debug, Clone)]
pub struct MySqlBackend {
    options: MySqlConnectOptions,
}

impl MySqlBackend {
    #[must_use]
    pub const fn new(options: MySqlConnectOptions) -> Self {
        Self { options }
    }
}

impl Backend for MySqlBackend {
    type Link = MySqlLink;

    async fn connect(&self) -> Result<MySqlLink, BoxError> {
        let conn = self.options.connect().await.map_err(StorageError::from)?;
        Ok(MySqlLink { conn })
    }

    fn escape(&self, text: &str) -> String {
        escape_string(text)
    }
}

/// One open `MySQL` connection.
#[derive(Debug)]
pub struct MySqlLink {
    conn: MySqlConnection,
}

impl Link for MySqlLink {
    async fn fetch(
        &mut self,
        statement: &str,
        params: &[BindParameter],
    ) -> Result<Vec<Row>, DriverError> {
        let prepared = self
            .conn
            .prepare(statement)
            .await
            .map_err(|err| StorageError::from(err).prepare())?;
        tracing::trace!(statement, types = %type_string(params), "binding parameters");
        let query = params.iter().fold(prepared.query(), bind);
        let rows = query
            .fetch_all(&mut self.conn)
            .await
            .map_err(|err| StorageError::from(err).execute())?;
        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::execute)
    }

    async fn execute(
        &mut self,
        statement: &str,
        params: &[BindParameter],
    ) -> Result<ExecSummary, DriverError> {
        let prepared = self
            .conn
            .prepare(statement)
            .await
            .map_err(|err| StorageError::from(err).prepare())?;
        tracing::trace!(statement, types = %type_string(params), "binding parameters");
        let result = params
            .iter()
            .fold(prepared.query(), bind)
            .execute(&mut self.conn)
            .await
            .map_err(|err| StorageError::from(err).execute())?;
        Ok(ExecSummary {
            affected_rows: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
            generated_ids: None,
        })
    }

    async fn close(self) {
        if let Err(err) = self.conn.close().await {
            tracing::warn!(error = %err, "failed to close database connection cleanly");
        }
    }
}
