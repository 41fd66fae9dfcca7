//! User — the account entity shipped with the framework.

use std::sync::LazyLock;

use crate::entity::{Entity, Tracking};
use crate::error::{RowkeepError, ValidationError};
use crate::ident;
use crate::schema::Schema;

/// An account stored in the `user` table.
///
/// `password` holds an already-hashed credential; hashing belongs to the
/// caller. `level` is declared without accessors, so new accounts are always
/// inserted at level `0`.
#[derive(Debug, Clone, Default)]
pub struct User {
    tracking: Tracking,
    pub email: String,
    pub username: String,
    pub password: String,
}

static SCHEMA: LazyLock<Schema<User>> = LazyLock::new(|| {
    Schema::<User>::builder(ident!("user"))
        .column(ident!("level"))
        .field(
            ident!("email"),
            |user| user.email.as_str().into(),
            |user, value| {
                user.email = value.try_into()?;
                Ok(())
            },
        )
        .field(
            ident!("username"),
            |user| user.username.as_str().into(),
            |user, value| {
                user.username = value.try_into()?;
                Ok(())
            },
        )
        .field(
            ident!("password"),
            |user| user.password.as_str().into(),
            |user, value| {
                user.password = value.try_into()?;
                Ok(())
            },
        )
        .build()
});

impl Entity for User {
    fn schema() -> &'static Schema<Self> {
        &SCHEMA
    }

    fn tracking(&self) -> &Tracking {
        &self.tracking
    }

    fn tracking_mut(&mut self) -> &mut Tracking {
        &mut self.tracking
    }

    fn pre_database_hook(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }
}

impl User {
    /// Create a builder for constructing a [`User`].
    #[must_use]
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::Validation`] when `username` is empty or
    /// `email` has no `@`.
    pub fn validate(&self) -> Result<(), RowkeepError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`User`].
#[derive(Debug, Default)]
pub struct UserBuilder {
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl UserBuilder {
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Consume the builder, validate, and return a transient [`User`].
    ///
    /// # Errors
    ///
    /// Returns [`RowkeepError::Validation`] if the username or email is invalid.
    pub fn build(self) -> Result<User, RowkeepError> {
        let user = User {
            tracking: Tracking::new(),
            email: self.email.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        };
        user.validate()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityId;
    use crate::value::Value;

    fn alice() -> User {
        User::builder()
            .username("alice")
            .email("alice@example.com")
            .password("$argon2id$hash")
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_transient_user() {
        let user = alice();
        assert_eq!(user.id(), EntityId::TRANSIENT);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn should_return_validation_error_when_username_is_empty() {
        let result = User::builder().email("a@b.c").build();
        assert!(matches!(
            result,
            Err(RowkeepError::Validation(ValidationError::EmptyUsername))
        ));
    }

    #[test]
    fn should_return_validation_error_when_email_is_invalid() {
        let result = User::builder().username("bob").email("bob").build();
        assert!(matches!(
            result,
            Err(RowkeepError::Validation(ValidationError::InvalidEmail))
        ));
    }

    #[test]
    fn should_declare_user_table_columns() {
        let schema = User::schema();
        assert_eq!(schema.table().as_str(), "user");
        let level = schema.column("level").unwrap();
        assert!(!level.has_getter());
        assert!(!level.has_setter());
        assert!(schema.column("password").unwrap().has_setter());
    }

    #[test]
    fn should_hydrate_through_schema_setters() {
        let mut user = User::default();
        let email = User::schema().column("email").unwrap();
        email.write(&mut user, Value::from("x@y.z")).unwrap().unwrap();
        assert_eq!(user.email, "x@y.z");
    }

    #[test]
    fn should_normalize_email_before_write() {
        let mut user = alice();
        user.email = "  Alice@Example.COM ".to_string();
        user.pre_database_hook();
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn should_become_dirty_when_password_changes() {
        let mut user = alice();
        user.update_snapshot_id();
        user.password = "$argon2id$other".to_string();
        assert!(!user.compare_snapshot_id());
    }

    #[test]
    fn should_become_dirty_when_text_moves_between_fields() {
        let mut user = User {
            email: "a@x".to_string(),
            username: "bob;Password=text:p1".to_string(),
            password: String::new(),
            ..User::default()
        };
        user.update_snapshot_id();

        user.username = "bob".to_string();
        user.password = "p1;Password=text:".to_string();

        assert!(!user.compare_snapshot_id());
    }
}
