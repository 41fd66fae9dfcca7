//! Conversion between sqlx `MySQL` values and [`Value`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};

use rowkeep_app::bind::BindParameter;
use rowkeep_app::row::Row;
use rowkeep_domain::value::{DATETIME_FORMAT, Value};

use crate::error::StorageError;

pub(crate) type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// Bind one parameter; the Rust type used matches its inferred bind type.
pub(crate) fn bind<'q>(query: MySqlQuery<'q>, param: &BindParameter) -> MySqlQuery<'q> {
    match param.value() {
        Value::Null => query.bind(None::<i64>),
        Value::Bool(flag) => query.bind(i64::from(*flag)),
        Value::Int(number) => query.bind(*number),
        Value::Float(number) => query.bind(*number),
        Value::Text(text) => query.bind(text.clone()),
        Value::DateTime(at) => query.bind(at.format(DATETIME_FORMAT).to_string()),
        // Lists never reach the link; bind_parameters rejects them.
        Value::List(_) => query.bind(param.value().to_string()),
    }
}

/// Materialize one result row, keeping the select order.
pub(crate) fn decode_row(row: &MySqlRow) -> Result<Row, StorageError> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal()).map_err(|source| {
            StorageError::Undecodable {
                column: column.name().to_string(),
                type_name: column.type_info().name().to_string(),
                source,
            }
        })?;
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

fn decode_column(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }
    if let Ok(number) = row.try_get::<i64, _>(index) {
        return Ok(Value::Int(number));
    }
    if let Ok(number) = row.try_get::<u64, _>(index) {
        return Ok(i64::try_from(number).map_or_else(|_| Value::Text(number.to_string()), Value::Int));
    }
    if let Ok(number) = row.try_get::<f64, _>(index) {
        return Ok(Value::Float(number));
    }
    if let Ok(number) = row.try_get::<f32, _>(index) {
        return Ok(Value::Float(f64::from(number)));
    }
    if let Ok(at) = row.try_get::<NaiveDateTime, _>(index) {
        return Ok(Value::DateTime(at));
    }
    if let Ok(day) = row.try_get::<NaiveDate, _>(index) {
        return Ok(Value::Text(day.format("%Y-%m-%d").to_string()));
    }
    if let Ok(time) = row.try_get::<NaiveTime, _>(index) {
        return Ok(Value::Text(time.format("%H:%M:%S").to_string()));
    }
    if let Ok(text) = row.try_get::<String, _>(index) {
        return Ok(Value::Text(text));
    }
    if let Ok(bytes) = row.try_get::<Vec<u8>, _>(index) {
        return Ok(Value::Text(String::from_utf8_lossy(&bytes).into_owned()));
    }
    // DECIMAL and friends travel as text.
    row.try_get_unchecked::<String, _>(index).map(Value::Text)
}
