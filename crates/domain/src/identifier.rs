//! Validated SQL identifiers for table and column names.
//!
//! Identifiers are never bound as parameters, so they are the only part of a
//! generated statement that comes from text. They are restricted to
//! `[A-Za-z_][A-Za-z0-9_]*`, at most [`Identifier::MAX_LEN`] bytes, and always
//! emitted backtick-quoted.

use std::fmt;

use crate::error::IdentifierError;

/// A table or column name that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(&'static str);

impl Identifier {
    /// MySQL's identifier length limit.
    pub const MAX_LEN: usize = 64;

    /// Validate `name`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when `name` is empty, too long, or contains
    /// a byte outside the allowed set.
    pub const fn new(name: &'static str) -> Result<Self, IdentifierError> {
        let bytes = name.as_bytes();
        if bytes.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if bytes.len() > Self::MAX_LEN {
            return Err(IdentifierError::TooLong { len: bytes.len() });
        }

        let mut position = 0;
        while position < bytes.len() {
            let byte = bytes[position];
            let allowed = byte == b'_'
                || byte.is_ascii_alphabetic()
                || (position > 0 && byte.is_ascii_digit());
            if !allowed {
                return Err(IdentifierError::InvalidByte { position, byte });
            }
            position += 1;
        }

        Ok(Self(name))
    }

    /// Validate a literal, panicking on invalid input.
    ///
    /// Meant for const contexts (see [`ident!`](crate::ident)), where the
    /// panic becomes a compile error.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid identifier.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        match Self::new(name) {
            Ok(identifier) => identifier,
            Err(_) => panic!("invalid SQL identifier"),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Backtick-quoted form used in generated statements.
    #[must_use]
    pub fn quoted(self) -> String {
        format!("`{}`", self.0)
    }

    /// Columns named `*_id` hold foreign keys; a zero value means "absent".
    #[must_use]
    pub fn is_foreign_key(self) -> bool {
        self.0.ends_with("_id")
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Build an [`Identifier`] from a literal, validated at compile time.
///
/// ```
/// use rowkeep_domain::ident;
///
/// let column = ident!("parent_id");
/// assert_eq!(column.quoted(), "`parent_id`");
/// ```
#[macro_export]
macro_rules! ident {
    ($name:literal) => {
        const { $crate::identifier::Identifier::from_static($name) }
    };
}
