//! Schema descriptors — the explicit column ↔ accessor mapping of an entity.
//!
//! Every entity type declares its table and columns once. Each column carries
//! an optional getter (used when writing and fingerprinting) and an optional
//! setter (used when hydrating). Column names passed to the repository at call
//! time are resolved against this declaration, which acts as the allow-list of
//! identifiers a statement may reference.

use std::fmt;

use crate::entity::Entity;
use crate::error::{RowkeepError, ValueError};
use crate::ident;
use crate::identifier::Identifier;
use crate::value::Value;

/// Reads one column's value from an entity.
pub type Getter<E> = fn(&E) -> Value;

/// Writes one hydrated column value into an entity.
pub type Setter<E> = fn(&mut E, Value) -> Result<(), ValueError>;

/// Name of the identity column every schema carries.
pub const ID_COLUMN: Identifier = ident!("id");

/// Derive an accessor name from a column name.
///
/// Splits on `_` and capitalizes the first letter of every segment:
/// `user_id` becomes `UserId`.
#[must_use]
pub fn database_column_name_to_method_name(column: &str) -> String {
    column
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// One declared column and its accessors.
pub struct ColumnMapping<E> {
    column: Identifier,
    accessor: String,
    getter: Option<Getter<E>>,
    setter: Option<Setter<E>>,
}

impl<E> ColumnMapping<E> {
    fn new(column: Identifier, getter: Option<Getter<E>>, setter: Option<Setter<E>>) -> Self {
        Self {
            column,
            accessor: database_column_name_to_method_name(column.as_str()),
            getter,
            setter,
        }
    }

    #[must_use]
    pub const fn column(&self) -> Identifier {
        self.column
    }

    /// Accessor name derived from the column name.
    #[must_use]
    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    #[must_use]
    pub const fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    #[must_use]
    pub const fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the column from `entity`, or `None` when no getter is declared.
    pub fn read(&self, entity: &E) -> Option<Value> {
        self.getter.map(|get| get(entity))
    }

    /// Write `value` into `entity`, or `None` when no setter is declared.
    pub fn write(&self, entity: &mut E, value: Value) -> Option<Result<(), ValueError>> {
        self.setter.map(|set| set(entity, value))
    }
}

impl<E> fmt::Debug for ColumnMapping<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMapping")
            .field("column", &self.column)
            .field("accessor", &self.accessor)
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

/// Table name plus ordered column mappings for entity type `E`.
///
/// The identity column `id` is always the first mapping; its getter reads the
/// entity's tracked identity and it has no setter, since hydration assigns the
/// identity when constructing the entity.
pub struct Schema<E> {
    table: Identifier,
    columns: Vec<ColumnMapping<E>>,
}

impl<E: Entity> Schema<E> {
    /// Start declaring the schema of `table`.
    #[must_use]
    pub fn builder(table: Identifier) -> SchemaBuilder<E> {
        SchemaBuilder {
            table,
            columns: vec![ColumnMapping::new(
                ID_COLUMN,
                Some(read_identity::<E> as Getter<E>),
                None,
            )],
        }
    }
}

fn read_identity<E: Entity>(entity: &E) -> Value {
    Value::from(entity.id())
}

impl<E> Schema<E> {
    #[must_use]
    pub const fn table(&self) -> Identifier {
        self.table
    }

    /// All mappings in declaration order, identity first.
    #[must_use]
    pub fn columns(&self) -> &[ColumnMapping<E>] {
        &self.columns
    }

    /// Look up a declared column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMapping<E>> {
        self.columns.iter().find(|mapping| mapping.column == *name)
    }

    /// Resolve a call-time column name against the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::UnknownColumn`] when `name` is not declared.
    pub fn resolve(&self, name: &str) -> Result<&ColumnMapping<E>, RowkeepError> {
        self.column(name).ok_or_else(|| RowkeepError::UnknownColumn {
            table: self.table.as_str(),
            column: name.to_string(),
        })
    }

    /// Resolve several column names, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::UnknownColumn`] for the first undeclared name.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<&ColumnMapping<E>>, RowkeepError> {
        names.iter().map(|name| self.resolve(name.as_ref())).collect()
    }
}

impl<E> fmt::Debug for Schema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Step-by-step builder for [`Schema`].
pub struct SchemaBuilder<E> {
    table: Identifier,
    columns: Vec<ColumnMapping<E>>,
}

impl<E> SchemaBuilder<E> {
    /// Declare a column with both a getter and a setter.
    #[must_use]
    pub fn field(self, column: Identifier, getter: Getter<E>, setter: Setter<E>) -> Self {
        self.push(ColumnMapping::new(column, Some(getter), Some(setter)))
    }

    /// Declare a column that is written and fingerprinted but never hydrated.
    #[must_use]
    pub fn getter(self, column: Identifier, getter: Getter<E>) -> Self {
        self.push(ColumnMapping::new(column, Some(getter), None))
    }

    /// Declare a column that is hydrated but never written.
    #[must_use]
    pub fn setter(self, column: Identifier, setter: Setter<E>) -> Self {
        self.push(ColumnMapping::new(column, None, Some(setter)))
    }

    /// Declare a column with no accessor; inserts write `0` (or `NULL` for `*_id`).
    #[must_use]
    pub fn column(self, column: Identifier) -> Self {
        self.push(ColumnMapping::new(column, None, None))
    }

    // A redeclared column replaces the earlier mapping in place.
    fn push(mut self, mapping: ColumnMapping<E>) -> Self {
        match self
            .columns
            .iter_mut()
            .find(|existing| existing.column == mapping.column)
        {
            Some(existing) => *existing = mapping,
            None => self.columns.push(mapping),
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Schema<E> {
        Schema {
            table: self.table,
            columns: self.columns,
        }
    }
}
