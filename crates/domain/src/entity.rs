//! Entity identity and fingerprint-based change tracking.
//!
//! An entity is dirty when the fingerprint of its exposed scalar state differs
//! from the baseline stored at the last load or save. The fingerprint is a
//! cheap change detector (xxh3), not a security primitive.

use std::fmt::Write as _;

use xxhash_rust::xxh3::xxh3_64;

use crate::error::IdentityError;
use crate::id::EntityId;
use crate::schema::Schema;

/// Hash over an entity's scalar accessor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint `entity` using the accessors declared in `schema`.
    ///
    /// Each scalar getter contributes `accessor=kind:len:value;` in
    /// declaration order, `len` being the byte length of the rendered value so
    /// no value can spill into the next field. Composite values are skipped.
    pub fn of<E>(entity: &E, schema: &Schema<E>) -> Self {
        let mut buffer = String::new();
        for mapping in schema.columns() {
            let Some(value) = mapping.read(entity) else {
                continue;
            };
            if !value.is_scalar() {
                continue;
            }
            let rendered = value.to_string();
            // Writing into a String cannot fail.
            let _ = write!(
                buffer,
                "{}={}:{}:{rendered};",
                mapping.accessor(),
                value.kind(),
                rendered.len()
            );
        }
        Self(xxh3_64(buffer.as_bytes()))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identity plus clean-state baseline, embedded in every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracking {
    id: EntityId,
    baseline: Option<Fingerprint>,
}

impl Tracking {
    /// Tracking state of a transient entity.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: EntityId::TRANSIENT,
            baseline: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Assign the identity handed out by the store.
    ///
    /// Re-assigning the same identity is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotPositive`] for non-positive ids and
    /// [`IdentityError::Reassigned`] when a different identity is already set.
    pub fn assign_id(&mut self, id: EntityId) -> Result<(), IdentityError> {
        if !id.is_persisted() {
            return Err(IdentityError::NotPositive(id));
        }
        if self.id.is_persisted() && self.id != id {
            return Err(IdentityError::Reassigned {
                current: self.id,
                requested: id,
            });
        }
        self.id = id;
        Ok(())
    }

    #[must_use]
    pub const fn baseline(&self) -> Option<Fingerprint> {
        self.baseline
    }

    pub fn set_baseline(&mut self, fingerprint: Fingerprint) {
        self.baseline = Some(fingerprint);
    }
}

/// Contract every persisted domain object implements.
///
/// Implementors embed a [`Tracking`] value and declare their [`Schema`] once;
/// every other method has a default implementation.
pub trait Entity: Default + Send + Sized + 'static {
    /// The table and column mapping of this entity type.
    fn schema() -> &'static Schema<Self>;

    fn tracking(&self) -> &Tracking;

    fn tracking_mut(&mut self) -> &mut Tracking;

    /// Identity, `0` while transient.
    fn id(&self) -> EntityId {
        self.tracking().id()
    }

    /// Construct an entity carrying a store-assigned identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotPositive`] when `id` is not positive.
    fn with_id(id: EntityId) -> Result<Self, IdentityError> {
        let mut entity = Self::default();
        entity.tracking_mut().assign_id(id)?;
        Ok(entity)
    }

    /// Current fingerprint of the exposed scalar state.
    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self, Self::schema())
    }

    /// Record the current state as the clean baseline.
    fn update_snapshot_id(&mut self) {
        let fingerprint = self.fingerprint();
        self.tracking_mut().set_baseline(fingerprint);
    }

    /// `true` when nothing observable changed since the last baseline.
    fn compare_snapshot_id(&self) -> bool {
        self.tracking().baseline() == Some(self.fingerprint())
    }

    /// Called right before the entity is written.
    fn pre_database_hook(&mut self) {}

    /// Called right after the entity was written.
    fn post_database_hook(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident;
    use std::sync::LazyLock;

    #[derive(Debug, Default)]
    struct Note {
        tracking: Tracking,
        body: String,
        tags: Vec<String>,
        pinned: bool,
    }

    impl Entity for Note {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: LazyLock<Schema<Note>> = LazyLock::new(|| {
                Schema::<Note>::builder(ident!("note"))
                    .field(
                        ident!("body"),
                        |note| note.body.as_str().into(),
                        |note, value| {
                            note.body = value.try_into()?;
                            Ok(())
                        },
                    )
                    .getter(ident!("tags"), |note| {
                        crate::value::Value::list(note.tags.iter().map(String::as_str))
                    })
                    .getter(ident!("pinned"), |note| note.pinned.into())
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
    }

    #[test]
    fn should_be_dirty_before_first_snapshot() {
        let note = Note::default();
        assert!(!note.compare_snapshot_id());
    }

    #[test]
    fn should_be_clean_right_after_snapshot() {
        let mut note = Note::default();
        note.update_snapshot_id();
        assert!(note.compare_snapshot_id());
    }

    #[test]
    fn should_become_dirty_after_scalar_mutation() {
        let mut note = Note::default();
        note.update_snapshot_id();

        note.body = "changed".to_string();
        assert!(!note.compare_snapshot_id());

        note.update_snapshot_id();
        assert!(note.compare_snapshot_id());
    }

    #[test]
    fn should_detect_reverted_change_as_clean() {
        let mut note = Note::default();
        note.update_snapshot_id();
        note.pinned = true;
        note.pinned = false;
        assert!(note.compare_snapshot_id());
    }

    #[test]
    fn should_ignore_composite_accessors() {
        let mut note = Note::default();
        note.update_snapshot_id();
        note.tags.push("rust".to_string());
        assert!(note.compare_snapshot_id());
    }

    #[test]
    fn should_include_identity_in_fingerprint() {
        let mut note = Note::default();
        let before = note.fingerprint();
        note.tracking_mut().assign_id(EntityId::new(3)).unwrap();
        assert_ne!(before, note.fingerprint());
    }

    #[test]
    fn should_construct_with_persisted_identity() {
        let note = Note::with_id(EntityId::new(11)).unwrap();
        assert_eq!(note.id(), EntityId::new(11));
    }

    #[test]
    fn should_reject_non_positive_identity() {
        assert_eq!(
            Note::with_id(EntityId::TRANSIENT).unwrap_err(),
            IdentityError::NotPositive(EntityId::TRANSIENT)
        );
    }

    #[test]
    fn should_refuse_to_reassign_identity() {
        let mut tracking = Tracking::new();
        tracking.assign_id(EntityId::new(5)).unwrap();
        assert!(tracking.assign_id(EntityId::new(5)).is_ok());
        assert_eq!(
            tracking.assign_id(EntityId::new(6)),
            Err(IdentityError::Reassigned {
                current: EntityId::new(5),
                requested: EntityId::new(6),
            })
        );
    }
}
