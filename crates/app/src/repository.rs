//! Generic repository engine.
//!
//! Turns rows into entities through their [`Schema`], writes entities back
//! with multi-row INSERTs and per-entity UPDATEs, and keeps every entity's
//! identity and clean baseline in sync with what was written.
//!
//! [`Schema`]: rowkeep_domain::schema::Schema

use rowkeep_domain::entity::Entity;
use rowkeep_domain::error::{IdentityError, RowkeepError, ValueError};
use rowkeep_domain::id::EntityId;
use rowkeep_domain::identifier::Identifier;
use rowkeep_domain::schema::{ColumnMapping, ID_COLUMN};
use rowkeep_domain::value::Value;

use crate::connection::Connection;
use crate::ports::Backend;
use crate::query::{self, Predicate, QueryCriteria};
use crate::row::Row;

/// Why a row could not be turned into an entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// A result row dropped during hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationSkip {
    /// Position of the row in the result set.
    pub row: usize,
    pub column: String,
    pub reason: HydrationError,
}

/// Entities hydrated by a select, plus the rows that were dropped.
#[derive(Debug)]
pub struct Selection<E> {
    pub entities: Vec<E>,
    pub skipped: Vec<HydrationSkip>,
}

impl<E> Selection<E> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn into_first(self) -> Option<E> {
        self.entities.into_iter().next()
    }
}

impl<E> IntoIterator for Selection<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

/// The backend returned a different number of ids than rows were submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationMismatch {
    pub submitted: usize,
    pub generated: Vec<EntityId>,
}

/// Result of [`Repository::insert_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// No entities or no columns; nothing was sent.
    Empty,
    /// Every entity received its generated id, in submission order.
    Inserted { ids: Vec<EntityId> },
    /// Rows were written but no entity was touched.
    Mismatch(ReconciliationMismatch),
}

/// Entities grouped by the write they need.
#[derive(Debug)]
pub struct Partition<'a, E> {
    /// Transient and dirty.
    pub inserts: Vec<&'a mut E>,
    /// Persisted and dirty.
    pub updates: Vec<&'a mut E>,
    /// Clean, nothing to write.
    pub unchanged: Vec<&'a mut E>,
}

/// Group `entities` into inserts, updates and unchanged, keeping input order
/// inside each group.
pub fn split_into_insert_update<E: Entity>(entities: &mut [E]) -> Partition<'_, E> {
    let mut partition = Partition {
        inserts: Vec::new(),
        updates: Vec::new(),
        unchanged: Vec::new(),
    };
    for entity in entities {
        if entity.compare_snapshot_id() {
            partition.unchanged.push(entity);
        } else if entity.id().is_persisted() {
            partition.updates.push(entity);
        } else {
            partition.inserts.push(entity);
        }
    }
    partition
}

/// Build one entity from one row.
///
/// A non-null, non-zero `id` becomes the entity's identity. Other columns go
/// through their schema setters; unknown columns, setter-less columns and
/// `NULL` values are skipped. The result is snapshotted as clean.
///
/// # Errors
///
/// Returns the offending column and the conversion failure.
pub fn hydrate<E: Entity>(mut row: Row) -> Result<E, (String, HydrationError)> {
    let schema = E::schema();

    let mut entity = match row.take(ID_COLUMN.as_str()) {
        Some(value) if !value.is_null() => {
            let fail = |err: HydrationError| (ID_COLUMN.as_str().to_string(), err);
            let id = EntityId::try_from(value).map_err(|err| fail(err.into()))?;
            if id == EntityId::TRANSIENT {
                E::default()
            } else {
                E::with_id(id).map_err(|err| fail(err.into()))?
            }
        }
        _ => E::default(),
    };

    for (column, value) in row {
        if value.is_null() {
            continue;
        }
        let Some(mapping) = schema.column(&column) else {
            continue;
        };
        if let Some(Err(err)) = mapping.write(&mut entity, value) {
            return Err((column, err.into()));
        }
    }

    entity.update_snapshot_id();
    Ok(entity)
}

fn hydrate_rows<E: Entity>(rows: Vec<Row>) -> Selection<E> {
    let mut selection = Selection {
        entities: Vec::with_capacity(rows.len()),
        skipped: Vec::new(),
    };
    for (index, row) in rows.into_iter().enumerate() {
        match hydrate::<E>(row) {
            Ok(entity) => selection.entities.push(entity),
            Err((column, reason)) => {
                tracing::warn!(
                    table = %E::schema().table(),
                    row = index,
                    column = %column,
                    error = %reason,
                    "row skipped during hydration"
                );
                selection.skipped.push(HydrationSkip {
                    row: index,
                    column,
                    reason,
                });
            }
        }
    }
    selection
}

/// Value written for `mapping`: getter-less columns write `0` and foreign keys
/// holding `0` write `NULL`.
fn write_value<E>(mapping: &ColumnMapping<E>, entity: &E) -> Value {
    let value = mapping.read(entity).unwrap_or(Value::Int(0));
    if mapping.column().is_foreign_key() && value.is_zero() {
        Value::Null
    } else {
        value
    }
}

/// Entity persistence on top of one [`Connection`].
pub struct Repository<B: Backend> {
    connection: Connection<B>,
}

impl<B: Backend> Repository<B> {
    #[must_use]
    pub const fn new(connection: Connection<B>) -> Self {
        Self { connection }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection<B> {
        &self.connection
    }

    pub const fn connection_mut(&mut self) -> &mut Connection<B> {
        &mut self.connection
    }

    /// Shut the underlying connection down.
    pub async fn shutdown(&mut self) {
        self.connection.shutdown().await;
    }

    /// Select and hydrate entities matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::UnknownColumn`] for undeclared columns and any
    /// connection error. Rows that fail hydration are reported in
    /// [`Selection::skipped`] instead.
    #[tracing::instrument(skip_all, fields(table = %E::schema().table()))]
    pub async fn select_model<E: Entity>(
        &mut self,
        criteria: &QueryCriteria,
    ) -> Result<Selection<E>, RowkeepError> {
        let statement = query::select(E::schema(), criteria)?;
        let rows = self
            .connection
            .fetch_query(&statement.sql, &statement.params)
            .await?;
        Ok(hydrate_rows(rows))
    }

    /// Insert every entity with one multi-row INSERT.
    ///
    /// When the backend reports exactly one id per entity, ids are assigned in
    /// submission order and each entity is snapshotted as clean.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::Identity`] when an entity is already persisted
    /// and [`RowkeepError::UnknownColumn`] for undeclared columns, both before
    /// anything is sent, plus any connection error.
    #[tracing::instrument(skip_all, fields(table = %E::schema().table(), count = entities.len()))]
    pub async fn insert_model<E: Entity>(
        &mut self,
        columns: &[&str],
        entities: &mut [&mut E],
    ) -> Result<InsertOutcome, RowkeepError> {
        if entities.is_empty() || columns.is_empty() {
            return Ok(InsertOutcome::Empty);
        }

        if let Some(entity) = entities.iter().find(|entity| entity.id().is_persisted()) {
            return Err(IdentityError::AlreadyPersisted(entity.id()).into());
        }

        let schema = E::schema();
        let mappings = schema.resolve_all(columns)?;
        let identifiers: Vec<Identifier> = mappings.iter().map(|mapping| mapping.column()).collect();

        let mut rows = Vec::with_capacity(entities.len());
        for entity in entities.iter_mut() {
            entity.pre_database_hook();
            rows.push(
                mappings
                    .iter()
                    .map(|mapping| write_value(mapping, &**entity))
                    .collect(),
            );
        }

        let statement = query::insert(schema.table(), &identifiers, rows);
        let ids = self
            .connection
            .insert_query(&statement.sql, &statement.params)
            .await?;

        if ids.len() != entities.len() {
            tracing::warn!(
                submitted = entities.len(),
                generated = ids.len(),
                "generated ids do not match inserted entities"
            );
            return Ok(InsertOutcome::Mismatch(ReconciliationMismatch {
                submitted: entities.len(),
                generated: ids,
            }));
        }

        for (entity, id) in entities.iter_mut().zip(&ids) {
            entity.tracking_mut().assign_id(*id)?;
            entity.update_snapshot_id();
            entity.post_database_hook();
        }

        Ok(InsertOutcome::Inserted { ids })
    }

    /// Update every entity with its own UPDATE statement.
    ///
    /// All statements are resolved before the first one runs. Columns without
    /// a getter are left out of SET; a `NULL` WHERE value renders as
    /// `IS NULL`.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::EmptyAssignment`] or
    /// [`RowkeepError::MissingWherePredicate`] when the columns resolve no SET
    /// getter or no WHERE getter, [`RowkeepError::UnknownColumn`] for
    /// undeclared columns, and any connection error. These are raised before
    /// any pre-write hook runs.
    #[tracing::instrument(skip_all, fields(table = %E::schema().table(), count = entities.len()))]
    pub async fn update_model<E: Entity>(
        &mut self,
        columns: &[&str],
        where_columns: &[&str],
        entities: &mut [&mut E],
    ) -> Result<(), RowkeepError> {
        let schema = E::schema();
        let table = schema.table();
        let set_mappings = schema.resolve_all(columns)?;
        let where_mappings = schema.resolve_all(where_columns)?;

        // Presence of SET and WHERE values depends on declared getters only,
        // so both checks run before any hook touches an entity.
        let Some(first) = entities.first() else {
            return Ok(());
        };
        if !set_mappings.iter().any(|mapping| mapping.has_getter()) {
            return Err(RowkeepError::EmptyAssignment {
                table: table.as_str(),
            });
        }
        if !where_mappings.iter().any(|mapping| mapping.has_getter()) {
            return Err(RowkeepError::MissingWherePredicate {
                table: table.as_str(),
                id: first.id(),
            });
        }

        let mut statements = Vec::with_capacity(entities.len());
        for entity in entities.iter_mut() {
            entity.pre_database_hook();
            let entity: &E = &**entity;

            let assignments: Vec<(Identifier, Value)> = set_mappings
                .iter()
                .filter(|mapping| mapping.has_getter())
                .map(|mapping| (mapping.column(), write_value(mapping, entity)))
                .collect();
            let predicates: Vec<(Identifier, Predicate)> = where_mappings
                .iter()
                .filter_map(|mapping| {
                    mapping
                        .read(entity)
                        .map(|value| (mapping.column(), Predicate::from(value)))
                })
                .collect();
            statements.push(query::update(table, assignments, &predicates));
        }

        for (entity, statement) in entities.iter_mut().zip(statements) {
            self.connection
                .update_query(&statement.sql, &statement.params)
                .await?;
            entity.update_snapshot_id();
            entity.post_database_hook();
        }
        Ok(())
    }

    /// Delete the row of `E` whose identity is `id`.
    ///
    /// # Errors
    ///
    /// Returns any connection error.
    #[tracing::instrument(skip(self), fields(table = %E::schema().table()))]
    pub async fn delete_by_id<E: Entity>(&mut self, id: EntityId) -> Result<(), RowkeepError> {
        let statement = query::delete_by_id(E::schema().table(), ID_COLUMN, id.into());
        self.connection
            .update_query(&statement.sql, &statement.params)
            .await
    }
}

impl<B: Backend + std::fmt::Debug> std::fmt::Debug for Repository<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("connection", &self.connection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use rowkeep_domain::entity::Tracking;
    use rowkeep_domain::ident;
    use rowkeep_domain::schema::Schema;

    use super::*;
    use crate::testing::{FakeBackend, repository};

    #[derive(Debug, Default)]
    struct Comment {
        tracking: Tracking,
        body: String,
        parent_id: i64,
        deleted_at: Option<String>,
        saved: usize,
    }

    impl Entity for Comment {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: LazyLock<Schema<Comment>> = LazyLock::new(|| {
                Schema::<Comment>::builder(ident!("comment"))
                    .field(
                        ident!("body"),
                        |comment| comment.body.as_str().into(),
                        |comment, value| {
                            comment.body = value.try_into()?;
                            Ok(())
                        },
                    )
                    .field(
                        ident!("parent_id"),
                        |comment| comment.parent_id.into(),
                        |comment, value| {
                            comment.parent_id = value.try_into()?;
                            Ok(())
                        },
                    )
                    .field(
                        ident!("deleted_at"),
                        |comment| comment.deleted_at.clone().into(),
                        |comment, value| {
                            comment.deleted_at = value.try_into_option()?;
                            Ok(())
                        },
                    )
                    .column(ident!("score"))
                    .build()
            });
            &SCHEMA
        }

        fn tracking(&self) -> &Tracking {
            &self.tracking
        }

        fn tracking_mut(&mut self) -> &mut Tracking {
            &mut self.tracking
        }

        fn pre_database_hook(&mut self) {
            self.body = self.body.trim().to_string();
        }

        fn post_database_hook(&mut self) {
            self.saved += 1;
        }
    }

    fn comment(body: &str) -> Comment {
        Comment {
            body: body.to_string(),
            ..Comment::default()
        }
    }

    fn row(id: i64, body: &str) -> Row {
        [("id", Value::Int(id)), ("body", Value::from(body))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn should_hydrate_rows_as_clean_entities() {
        let backend = FakeBackend::new();
        backend.push_rows(vec![row(1, "first"), row(2, "second")]);
        let mut repo = repository(&backend);

        let selection = repo
            .select_model::<Comment>(&QueryCriteria::new().order_by("id", query::Direction::Asc))
            .await
            .unwrap();

        assert_eq!(
            backend.statements(),
            ["SELECT t1.* FROM `comment` t1 ORDER BY t1.`id` ASC"]
        );
        assert!(selection.skipped.is_empty());
        assert_eq!(selection.len(), 2);
        let first = &selection.entities[0];
        assert_eq!(first.id(), EntityId::new(1));
        assert_eq!(first.body, "first");
        assert!(first.compare_snapshot_id());
    }

    #[tokio::test]
    async fn should_skip_null_and_unknown_columns_while_hydrating() {
        let backend = FakeBackend::new();
        let raw: Row = [
            ("id", Value::Int(3)),
            ("body", Value::Null),
            ("score", Value::Int(12)),
            ("extra", Value::from("ignored")),
        ]
        .into_iter()
        .collect();
        backend.push_rows(vec![raw]);
        let mut repo = repository(&backend);

        let selection = repo
            .select_model::<Comment>(&QueryCriteria::new())
            .await
            .unwrap();
        let comment = selection.into_first().unwrap();
        assert_eq!(comment.id(), EntityId::new(3));
        assert_eq!(comment.body, "");
    }

    #[test]
    fn should_hydrate_transient_entity_for_zero_or_null_id() {
        let zero = hydrate::<Comment>(row(0, "x")).unwrap();
        assert_eq!(zero.id(), EntityId::TRANSIENT);

        let null: Row = [("id", Value::Null)].into_iter().collect();
        let null = hydrate::<Comment>(null).unwrap();
        assert_eq!(null.id(), EntityId::TRANSIENT);
    }

    #[tokio::test]
    async fn should_report_rows_failing_hydration() {
        let backend = FakeBackend::new();
        let bad: Row = [("id", Value::Int(2)), ("parent_id", Value::from("abc"))]
            .into_iter()
            .collect();
        backend.push_rows(vec![row(1, "ok"), bad]);
        let mut repo = repository(&backend);

        let selection = repo
            .select_model::<Comment>(&QueryCriteria::new())
            .await
            .unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.skipped.len(), 1);
        assert_eq!(selection.skipped[0].row, 1);
        assert_eq!(selection.skipped[0].column, "parent_id");
        assert!(matches!(selection.skipped[0].reason, HydrationError::Value(_)));
    }

    #[test]
    fn should_skip_row_with_negative_identity() {
        let result = hydrate::<Comment>(row(-4, "x"));
        assert!(matches!(
            result,
            Err((ref column, HydrationError::Identity(IdentityError::NotPositive(_)))) if column == "id"
        ));
    }

    #[tokio::test]
    async fn should_insert_and_assign_contiguous_ids() {
        let backend = FakeBackend::new();
        backend.push_exec(2, 5);
        let mut repo = repository(&backend);
        let mut first = comment("a");
        let mut second = comment("b");

        let outcome = repo
            .insert_model(&["body"], &mut [&mut first, &mut second])
            .await
            .unwrap();

        assert_eq!(
            outcome,
            InsertOutcome::Inserted {
                ids: vec![EntityId::new(5), EntityId::new(6)]
            }
        );
        assert_eq!(first.id(), EntityId::new(5));
        assert_eq!(second.id(), EntityId::new(6));
        assert!(first.compare_snapshot_id());
        assert_eq!(second.saved, 1);
        assert_eq!(
            backend.statements(),
            ["INSERT INTO `comment` (`body`) VALUES (?), (?)"]
        );
    }

    #[tokio::test]
    async fn should_write_zero_foreign_key_as_null_and_missing_getter_as_zero() {
        let backend = FakeBackend::new();
        backend.push_exec(1, 1);
        let mut repo = repository(&backend);
        let mut entity = comment("a");

        repo.insert_model(&["parent_id", "score", "body"], &mut [&mut entity])
            .await
            .unwrap();

        assert_eq!(
            backend.executed()[0].params,
            vec![Value::Null, Value::Int(0), Value::from("a")]
        );
    }

    #[tokio::test]
    async fn should_leave_entities_untouched_on_id_mismatch() {
        let backend = FakeBackend::new();
        backend.push_exec(1, 5);
        let mut repo = repository(&backend);
        let mut first = comment("a");
        let mut second = comment("b");

        let outcome = repo
            .insert_model(&["body"], &mut [&mut first, &mut second])
            .await
            .unwrap();

        assert_eq!(
            outcome,
            InsertOutcome::Mismatch(ReconciliationMismatch {
                submitted: 2,
                generated: vec![EntityId::new(5)],
            })
        );
        assert_eq!(first.id(), EntityId::TRANSIENT);
        assert_eq!(first.saved, 0);
    }

    #[tokio::test]
    async fn should_not_send_anything_for_empty_insert() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut entity = comment("a");

        let none: &mut [&mut Comment] = &mut [];
        assert_eq!(
            repo.insert_model(&["body"], none).await.unwrap(),
            InsertOutcome::Empty
        );
        assert_eq!(
            repo.insert_model::<Comment>(&[], &mut [&mut entity]).await.unwrap(),
            InsertOutcome::Empty
        );
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_to_insert_persisted_entity_before_sending() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut fresh = comment("a");
        let mut stored = hydrate::<Comment>(row(7, "old")).unwrap();

        let result = repo
            .insert_model(&["body"], &mut [&mut fresh, &mut stored])
            .await;

        assert!(matches!(
            result,
            Err(RowkeepError::Identity(IdentityError::AlreadyPersisted(id))) if id == EntityId::new(7)
        ));
        assert!(backend.executed().is_empty());
        assert_eq!(fresh.id(), EntityId::TRANSIENT);
    }

    #[tokio::test]
    async fn should_reject_undeclared_insert_column() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut entity = comment("a");

        let result = repo.insert_model(&["nope"], &mut [&mut entity]).await;
        assert!(matches!(result, Err(RowkeepError::UnknownColumn { .. })));
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn should_update_dirty_entity_and_refresh_snapshot() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut entity = hydrate::<Comment>(row(7, "old")).unwrap();
        entity.body = "new".to_string();

        repo.update_model(&["body", "score"], &["id"], &mut [&mut entity])
            .await
            .unwrap();

        let executed = backend.executed();
        assert_eq!(
            executed[0].statement,
            "UPDATE `comment` SET `body` = ? WHERE `id` = ?"
        );
        assert_eq!(executed[0].params, vec![Value::from("new"), Value::Int(7)]);
        assert!(entity.compare_snapshot_id());
        assert_eq!(entity.saved, 1);
    }

    #[tokio::test]
    async fn should_render_null_where_value_as_is_null() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut entity = hydrate::<Comment>(row(7, "old")).unwrap();

        repo.update_model(&["body"], &["deleted_at"], &mut [&mut entity])
            .await
            .unwrap();

        assert_eq!(
            backend.statements(),
            ["UPDATE `comment` SET `body` = ? WHERE `deleted_at` IS NULL"]
        );
    }

    #[tokio::test]
    async fn should_refuse_update_without_where_predicate() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut first = hydrate::<Comment>(row(1, "a")).unwrap();
        let mut second = hydrate::<Comment>(row(2, "b")).unwrap();

        let result = repo
            .update_model(&["body"], &["score"], &mut [&mut first, &mut second])
            .await;

        assert!(matches!(
            result,
            Err(RowkeepError::MissingWherePredicate { table: "comment", .. })
        ));
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn should_leave_entities_unhooked_when_update_is_refused() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut first = hydrate::<Comment>(row(1, " a ")).unwrap();
        let mut second = hydrate::<Comment>(row(2, " b ")).unwrap();

        let result = repo
            .update_model(&["body"], &["score"], &mut [&mut first, &mut second])
            .await;

        assert!(result.is_err());
        assert_eq!(first.body, " a ");
        assert_eq!(second.body, " b ");
        assert!(first.compare_snapshot_id());
    }

    #[tokio::test]
    async fn should_refuse_update_without_assignment() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        let mut entity = hydrate::<Comment>(row(1, "a")).unwrap();

        let result = repo
            .update_model(&["score"], &["id"], &mut [&mut entity])
            .await;

        assert!(matches!(result, Err(RowkeepError::EmptyAssignment { .. })));
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn should_delete_by_id() {
        let backend = FakeBackend::new();
        let mut repo = repository(&backend);
        repo.delete_by_id::<Comment>(EntityId::new(9)).await.unwrap();

        let executed = backend.executed();
        assert_eq!(executed[0].statement, "DELETE FROM `comment` WHERE `id` = ?");
        assert_eq!(executed[0].params, vec![Value::Int(9)]);
    }

    #[test]
    fn should_partition_every_entity_once_in_order() {
        let mut dirty = hydrate::<Comment>(row(2, "dirty")).unwrap();
        dirty.body = "changed".to_string();
        let mut entities = vec![
            comment("new-a"),
            hydrate::<Comment>(row(1, "clean")).unwrap(),
            dirty,
            comment("new-b"),
        ];

        let partition = split_into_insert_update(&mut entities);

        assert_eq!(
            partition.inserts.len() + partition.updates.len() + partition.unchanged.len(),
            4
        );
        let inserts: Vec<&str> = partition.inserts.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(inserts, ["new-a", "new-b"]);
        assert_eq!(partition.updates[0].id(), EntityId::new(2));
        assert_eq!(partition.unchanged[0].id(), EntityId::new(1));
    }

    #[tokio::test]
    async fn should_round_trip_without_pending_writes() {
        let backend = FakeBackend::new();
        backend.push_rows(vec![row(1, "a"), row(2, "b")]);
        let mut repo = repository(&backend);

        let mut entities = repo
            .select_model::<Comment>(&QueryCriteria::new())
            .await
            .unwrap()
            .entities;
        let partition = split_into_insert_update(&mut entities);

        assert!(partition.inserts.is_empty());
        assert!(partition.updates.is_empty());
        assert_eq!(partition.unchanged.len(), 2);
    }
}
