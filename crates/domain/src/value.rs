//! Dynamic values exchanged with the store.
//!
//! A [`Value`] is the runtime kind of one bound parameter or one hydrated
//! column. Its variant decides the placeholder type used when binding and
//! which typed fields it can be converted into.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ValueError;
use crate::id::EntityId;

/// Textual format of MySQL `DATETIME` columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A dynamically typed column or parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    #[serde(serialize_with = "serialize_datetime")]
    DateTime(NaiveDateTime),
    /// Composite value; only meaningful as an `IN (...)` filter.
    List(Vec<Value>),
}

impl Value {
    /// Short name of the runtime kind, used in errors and diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer zero, which foreign-key columns treat as "absent".
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        matches!(self, Self::Int(0))
    }

    /// Everything except [`Value::List`] is scalar.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    /// Convert into `T`, mapping [`Value::Null`] to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when a non-null value does not convert into `T`.
    pub fn try_into_option<T>(self) -> Result<Option<T>, ValueError>
    where
        T: TryFrom<Self, Error = ValueError>,
    {
        match self {
            Self::Null => Ok(None),
            other => T::try_from(other).map(Some),
        }
    }

    /// Build a [`Value::List`] from any iterator of convertible items.
    pub fn list<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

fn serialize_datetime<S: serde::Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(DATETIME_FORMAT))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(true) => f.write_str("1"),
            Self::Bool(false) => f.write_str("0"),
            Self::Int(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Text(value) => f.write_str(value),
            Self::DateTime(value) => value.format(DATETIME_FORMAT).fmt(f),
            Self::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    value.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<EntityId> for Value {
    fn from(value: EntityId) -> Self {
        Self::Int(value.get())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::list(values)
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ValueError {
    ValueError::Mismatch {
        expected,
        found: found.kind(),
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(value) => Ok(value),
            Value::Bool(value) => Ok(Self::from(value)),
            Value::Text(ref text) => text.trim().parse().map_err(|_| mismatch("int", &value)),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let wide = i64::try_from(value)?;
        Self::try_from(wide).map_err(|_| ValueError::OutOfRange {
            value: wide.to_string(),
            target: "i32",
        })
    }
}

impl TryFrom<Value> for u32 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let wide = i64::try_from(value)?;
        Self::try_from(wide).map_err(|_| ValueError::OutOfRange {
            value: wide.to_string(),
            target: "u32",
        })
    }
}

impl TryFrom<Value> for EntityId {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Self::new)
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(value) => Ok(value),
            Value::Int(value) => Ok(value != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(value) => Ok(value),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(value) => Ok(value as Self),
            Value::Text(ref text) => text.trim().parse().map_err(|_| mismatch("float", &value)),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(value) => Ok(value),
            Value::Null | Value::List(_) => Err(mismatch("text", &value)),
            scalar => Ok(scalar.to_string()),
        }
    }
}

impl TryFrom<Value> for NaiveDateTime {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::DateTime(value) => Ok(value),
            Value::Text(text) => Self::parse_from_str(&text, DATETIME_FORMAT)
                .map_err(|_| ValueError::DateTime(text)),
            other => Err(mismatch("datetime", &other)),
        }
    }
}
