//! [`UserRepository`] on top of the generic [`Repository`].

use rowkeep_domain::entity::Entity;
use rowkeep_domain::error::RowkeepError;
use rowkeep_domain::id::EntityId;
use rowkeep_domain::user::User;
use rowkeep_domain::value::Value;

use crate::ports::{Backend, SaveReport, UserRepository};
use crate::query::QueryCriteria;
use crate::repository::{InsertOutcome, Partition, Repository, Selection, split_into_insert_update};

const EXIST_USERNAME: &str = "SELECT t1.`id` FROM `user` t1 WHERE t1.`username` = ? LIMIT 1";

const FIND_HASH_BY_USERNAME: &str =
    "SELECT t1.`id`, t1.`password` FROM `user` t1 WHERE t1.`username` = ? LIMIT 1";

const UPDATE_COLUMNS: [&str; 2] = ["email", "password"];
const UPDATE_WHERE: [&str; 1] = ["id"];
const INSERT_COLUMNS: [&str; 4] = ["level", "email", "password", "username"];

impl<B: Backend> UserRepository for Repository<B> {
    #[tracing::instrument(skip(self))]
    async fn exist_username(&mut self, username: &str) -> Result<bool, RowkeepError> {
        let rows = self
            .connection_mut()
            .fetch_query(EXIST_USERNAME, &[Value::from(username)])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn find_all(&mut self) -> Result<Selection<User>, RowkeepError> {
        self.select_model::<User>(&QueryCriteria::new()).await
    }

    async fn find_user_by_id(&mut self, id: EntityId) -> Result<Option<User>, RowkeepError> {
        let criteria = QueryCriteria::new().filter("id", id).limit(1);
        let selection = self.select_model::<User>(&criteria).await?;
        Ok(selection.into_first())
    }

    #[tracing::instrument(skip(self))]
    async fn find_user_hash_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<(EntityId, String)>, RowkeepError> {
        let rows = self
            .connection_mut()
            .fetch_query(FIND_HASH_BY_USERNAME, &[Value::from(username)])
            .await?;
        let Some(mut row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let id = EntityId::try_from(row.take("id").unwrap_or(Value::Null))?;
        let hash = String::try_from(row.take("password").unwrap_or(Value::Null))?;
        Ok(Some((id, hash)))
    }

    #[tracing::instrument(skip_all, fields(count = users.len()))]
    async fn save_users(&mut self, users: &mut [User]) -> Result<SaveReport, RowkeepError> {
        for user in users.iter() {
            user.validate()?;
        }

        let Partition {
            mut inserts,
            mut updates,
            unchanged,
        } = split_into_insert_update(users);

        let mut report = SaveReport {
            updated: updates.len(),
            unchanged: unchanged.len(),
            ..SaveReport::default()
        };

        if !updates.is_empty() {
            self.update_model(&UPDATE_COLUMNS, &UPDATE_WHERE, &mut updates)
                .await?;
        }

        if !inserts.is_empty() {
            match self.insert_model(&INSERT_COLUMNS, &mut inserts).await? {
                InsertOutcome::Inserted { ids } => report.inserted = ids.len(),
                InsertOutcome::Mismatch(mismatch) => report.mismatch = Some(mismatch),
                InsertOutcome::Empty => {}
            }
        }

        tracing::debug!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            "users saved"
        );
        Ok(report)
    }

    async fn delete_user(&mut self, user: &User) -> Result<(), RowkeepError> {
        self.delete_by_id::<User>(user.id()).await
    }
}
