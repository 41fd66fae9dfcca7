//! Statement builders.
//!
//! Identifiers always come from a [`Schema`] declaration and are emitted
//! backtick-quoted; values are never interpolated, only bound. SELECT
//! statements alias the table as `t1`.

use std::fmt::Write as _;

use rowkeep_domain::error::RowkeepError;
use rowkeep_domain::identifier::Identifier;
use rowkeep_domain::schema::Schema;
use rowkeep_domain::value::Value;

/// Alias of the selected table.
pub const TABLE_ALIAS: &str = "t1";

/// Sort direction of one ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One WHERE condition on a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `col = ?`
    Equals(Value),
    /// `col IN (?, ...)`; an empty list matches nothing.
    In(Vec<Value>),
    /// `col IS NULL`
    IsNull,
}

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::IsNull,
            Value::List(items) => Self::In(items),
            other => Self::Equals(other),
        }
    }
}

impl Predicate {
    fn render(&self, qualified: &str, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::Equals(value) => {
                let _ = write!(sql, "{qualified} = ?");
                params.push(value.clone());
            }
            Self::In(items) if items.is_empty() => sql.push_str("0 = 1"),
            Self::In(items) => {
                let placeholders = vec!["?"; items.len()].join(", ");
                let _ = write!(sql, "{qualified} IN ({placeholders})");
                params.extend(items.iter().cloned());
            }
            Self::IsNull => {
                let _ = write!(sql, "{qualified} IS NULL");
            }
        }
    }
}

/// Projection, filters, ordering and limit of a SELECT.
///
/// Column names are plain strings here and are resolved against the entity's
/// schema when the statement is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCriteria {
    columns: Vec<String>,
    filters: Vec<(String, Predicate)>,
    order: Vec<(String, Direction)>,
    limit: Option<u64>,
}

impl QueryCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the projection; by default every column (`t1.*`) is selected.
    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Filter on `column`: `NULL` becomes `IS NULL`, a list becomes `IN`,
    /// anything else an equality.
    #[must_use]
    pub fn filter(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicate(column, Predicate::from(value.into()))
    }

    #[must_use]
    pub fn predicate(mut self, column: impl Into<String>, predicate: Predicate) -> Self {
        self.filters.push((column.into(), predicate));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    /// Limit the number of rows; `0` means no limit.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }
}

/// Statement text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

fn qualified(column: Identifier) -> String {
    format!("{TABLE_ALIAS}.{}", column.quoted())
}

/// Build ``SELECT ... FROM `table` t1 [WHERE ...] [ORDER BY ...] [LIMIT ?]``.
///
/// # Errors
///
/// Returns [`RowkeepError::UnknownColumn`] when a projected, filtered or
/// ordered column is not declared in `schema`.
pub fn select<E>(schema: &Schema<E>, criteria: &QueryCriteria) -> Result<Statement, RowkeepError> {
    let mut params = Vec::new();

    let projection = if criteria.columns.is_empty() {
        format!("{TABLE_ALIAS}.*")
    } else {
        schema
            .resolve_all(&criteria.columns)?
            .into_iter()
            .map(|mapping| qualified(mapping.column()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!(
        "SELECT {projection} FROM {} {TABLE_ALIAS}",
        schema.table().quoted()
    );

    for (index, (column, predicate)) in criteria.filters.iter().enumerate() {
        let mapping = schema.resolve(column)?;
        sql.push_str(if index == 0 { " WHERE " } else { " AND " });
        predicate.render(&qualified(mapping.column()), &mut sql, &mut params);
    }

    for (index, (column, direction)) in criteria.order.iter().enumerate() {
        let mapping = schema.resolve(column)?;
        sql.push_str(if index == 0 { " ORDER BY " } else { ", " });
        let _ = write!(sql, "{} {}", qualified(mapping.column()), direction.as_sql());
    }

    if let Some(limit) = criteria.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Int(i64::try_from(limit).unwrap_or(i64::MAX)));
    }

    Ok(Statement { sql, params })
}

/// Build one multi-row ``INSERT INTO `table` (...) VALUES (...), (...)``.
///
/// Every row must hold exactly one value per column.
#[must_use]
pub fn insert(table: Identifier, columns: &[Identifier], rows: Vec<Vec<Value>>) -> Statement {
    let column_list = columns
        .iter()
        .map(|column| column.quoted())
        .collect::<Vec<_>>()
        .join(", ");
    let tuple = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![tuple; rows.len()].join(", ");

    Statement {
        sql: format!(
            "INSERT INTO {} ({column_list}) VALUES {values}",
            table.quoted()
        ),
        params: rows.into_iter().flatten().collect(),
    }
}

/// Build ``UPDATE `table` SET ... WHERE ...`` for one row.
///
/// Callers guarantee at least one assignment and one predicate.
#[must_use]
pub fn update(
    table: Identifier,
    assignments: Vec<(Identifier, Value)>,
    predicates: &[(Identifier, Predicate)],
) -> Statement {
    let mut params = Vec::with_capacity(assignments.len() + predicates.len());
    let set = assignments
        .into_iter()
        .map(|(column, value)| {
            params.push(value);
            format!("{} = ?", column.quoted())
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("UPDATE {} SET {set}", table.quoted());
    for (index, (column, predicate)) in predicates.iter().enumerate() {
        sql.push_str(if index == 0 { " WHERE " } else { " AND " });
        predicate.render(&column.quoted(), &mut sql, &mut params);
    }

    Statement { sql, params }
}

/// Build ``DELETE FROM `table` WHERE `id` = ?``.
#[must_use]
pub fn delete_by_id(table: Identifier, id_column: Identifier, id: Value) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            table.quoted(),
            id_column.quoted()
        ),
        params: vec![id],
    }
}
