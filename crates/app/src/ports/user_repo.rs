//! User repository port — persistence for [`User`]s.

use std::future::Future;

use rowkeep_domain::error::RowkeepError;
use rowkeep_domain::id::EntityId;
use rowkeep_domain::user::User;

use crate::repository::{ReconciliationMismatch, Selection};

/// What a [`UserRepository::save_users`] call wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Set when inserted rows could not be matched to generated ids.
    pub mismatch: Option<ReconciliationMismatch>,
}

/// Repository for persisting and querying [`User`]s.
pub trait UserRepository {
    /// Whether any account uses `username`.
    fn exist_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = Result<bool, RowkeepError>> + Send;

    /// Get all accounts.
    fn find_all(&mut self) -> impl Future<Output = Result<Selection<User>, RowkeepError>> + Send;

    /// Get an account by its identity.
    fn find_user_by_id(
        &mut self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<User>, RowkeepError>> + Send;

    /// Get the identity and stored password hash of `username`.
    fn find_user_hash_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = Result<Option<(EntityId, String)>, RowkeepError>> + Send;

    /// Insert new accounts and update changed ones; clean accounts are left alone.
    fn save_users(
        &mut self,
        users: &mut [User],
    ) -> impl Future<Output = Result<SaveReport, RowkeepError>> + Send;

    /// Delete an account.
    fn delete_user(&mut self, user: &User) -> impl Future<Output = Result<(), RowkeepError>> + Send;
}
