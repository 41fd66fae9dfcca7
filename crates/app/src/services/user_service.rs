//! User service — use-cases for managing accounts.

use rowkeep_domain::entity::Entity;
use rowkeep_domain::error::{NotFoundError, RowkeepError, ValidationError};
use rowkeep_domain::id::EntityId;
use rowkeep_domain::user::User;

use crate::ports::UserRepository;
use crate::repository::Selection;

/// Application service for account operations.
pub struct UserService<R> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new service backed by the given repository.
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }

    pub const fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Register a new account with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::Validation`] if invariants fail or the username
    /// is taken, or a storage error from the repository.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RowkeepError> {
        let user = User::builder()
            .username(username)
            .email(email)
            .password(password_hash)
            .build()?;
        if self.repo.exist_username(username).await? {
            return Err(ValidationError::UsernameTaken(username.to_string()).into());
        }

        let mut users = [user];
        let report = self.repo.save_users(&mut users).await?;
        if let Some(mismatch) = report.mismatch {
            tracing::warn!(
                username,
                submitted = mismatch.submitted,
                generated = mismatch.generated.len(),
                "account inserted without a reconciled identity"
            );
        }
        let [user] = users;
        Ok(user)
    }

    /// Look up an account by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::NotFound`] when no account with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_user(&mut self, id: EntityId) -> Result<User, RowkeepError> {
        self.repo.find_user_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "User",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all accounts.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_users(&mut self) -> Result<Selection<User>, RowkeepError> {
        self.repo.find_all().await
    }

    /// Whether `username` is taken.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn username_exists(&mut self, username: &str) -> Result<bool, RowkeepError> {
        self.repo.exist_username(username).await
    }

    /// Change the email of an existing account.
    ///
    /// Nothing is written when the email is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::NotFound`] for unknown ids,
    /// [`RowkeepError::Validation`] for invalid emails, or a storage error.
    pub async fn change_email(&mut self, id: EntityId, email: &str) -> Result<User, RowkeepError> {
        let mut user = self.get_user(id).await?;
        user.email = email.to_string();
        user.validate()?;

        let mut users = [user];
        self.repo.save_users(&mut users).await?;
        let [user] = users;
        Ok(user)
    }

    /// Delete an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::NotFound`] for unknown ids, or a storage error.
    pub async fn delete_user(&mut self, id: EntityId) -> Result<(), RowkeepError> {
        let user = self.get_user(id).await?;
        self.repo.delete_user(&user).await?;
        tracing::info!(id = %user.id(), username = %user.username, "account deleted");
        Ok(())
    }
}
