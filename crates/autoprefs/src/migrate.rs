//! Moving a preference set from one backend to another.
//!
//! Migration opens the destination backend for the same namespace, then
//! copies every source entry into it with its stored type intact.  The
//! source is only ever read.  Keys already present in the destination are
//! overwritten; destination keys the source does not have are left alone.
//!
//! # Steps
//!
//! 1. Reject a destination of the same kind with
//!    [`PreferenceError::SameBackend`].
//! 2. Open the destination exactly as `open_in(config, namespace,
//!    Some(destination))` would.  An unreadable destination file fails here,
//!    before anything is copied, and its error is returned as is.
//! 3. Enumerate the source keys.
//! 4. For each key, read the raw [`crate::Value`] and write it unchanged.  The
//!    type tag travels with the value: a `long` stays a `long`, an `opaque`
//!    stays `opaque`.  Each write is persisted by the destination before the
//!    next key is read.
//!
//! # Failure
//!
//! A failure in steps 3 or 4 aborts the migration with
//! [`PreferenceError::Migration`], carrying the key being copied (if any) and
//! the underlying error.  The destination may then hold some of the entries
//! and should be discarded; re-running the migration is safe because every
//! copied key is simply overwritten.  [`Preferences::migrate_and_clear`]
//! never clears a source after a failed copy.

use tracing::{debug, info};

use crate::domain::BackendKind;
use crate::error::{PreferenceError, PreferenceResult};
use crate::preferences::Preferences;

impl Preferences {
    /// Copies every entry into a new store of kind `destination` and returns
    /// it.  This store is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`PreferenceError::SameBackend`] if `destination` is this store's
    ///   own kind.
    /// - Any error from opening the destination (for example
    ///   [`PreferenceError::ConfigLoad`]), unwrapped.
    /// - [`PreferenceError::Migration`] if reading or writing an entry fails.
    pub fn migrate(&self, destination: BackendKind) -> PreferenceResult<Preferences> {
        migrate(self, destination)
    }

    /// Migrates like [`Preferences::migrate`], then clears this store.
    ///
    /// The source is cleared only after every entry has been copied.
    ///
    /// # Errors
    ///
    /// As [`Preferences::migrate`], plus the failure to clear the source.
    pub fn migrate_and_clear(mut self, destination: BackendKind) -> PreferenceResult<Preferences> {
        let migrated = migrate(&self, destination)?;
        self.clear()?;
        Ok(migrated)
    }
}

/// Copies all entries of `source` into a freshly opened store of kind
/// `destination`.  See [`Preferences::migrate`].
///
/// # Errors
///
/// See [`Preferences::migrate`].
pub fn migrate(source: &Preferences, destination: BackendKind) -> PreferenceResult<Preferences> {
    let from = source.kind();
    if from == destination {
        return Err(PreferenceError::SameBackend(from));
    }

    let mut target = Preferences::open_in(
        source.config().clone(),
        source.namespace().clone(),
        Some(destination),
    )?;

    let abort = |key: Option<&str>, cause: PreferenceError| PreferenceError::Migration {
        namespace: source.namespace().to_string(),
        from,
        to: destination,
        key: key.map(str::to_string),
        source: Box::new(cause),
    };

    let keys = source.keys().map_err(|e| abort(None, e))?;
    for key in &keys {
        // A key that vanished since enumeration has nothing left to copy.
        let Some(value) = source.raw(key).map_err(|e| abort(Some(key.as_str()), e))? else {
            debug!(key = %key, "key disappeared during migration; skipping");
            continue;
        };
        target.put(key, value).map_err(|e| abort(Some(key.as_str()), e))?;
    }

    info!(
        namespace = %source.namespace(),
        %from,
        to = %destination,
        entries = keys.len(),
        "preferences migrated"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::backend::MockPreferenceBackend;
    use crate::config::{PreferencesConfig, RegistryConfig};
    use crate::domain::{Namespace, Value};
    use crate::registry::{MemoryRegistry, MockNativeRegistry, RegistryError};

    struct Scratch {
        root: PathBuf,
        config: PreferencesConfig,
    }

    impl Scratch {
        fn new(registry: RegistryConfig) -> Self {
            let root = std::env::temp_dir().join(format!("autoprefs_migrate_{}", Uuid::new_v4()));
            let config = PreferencesConfig::new(root.join("work"), Some(root.join("home")), registry);
            Self { root, config }
        }

        fn memory() -> Self {
            Self::new(RegistryConfig::Memory(MemoryRegistry::new()))
        }

        fn open(&self, kind: BackendKind) -> Preferences {
            Preferences::open_in(self.config.clone(), ns(), Some(kind)).unwrap()
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    fn ns() -> Namespace {
        Namespace::new("com.example.migrate").unwrap()
    }

    #[test]
    fn test_migrate_to_same_kind_is_rejected() {
        let scratch = Scratch::memory();
        let prefs = scratch.open(BackendKind::Native);

        let err = prefs.migrate(BackendKind::Native).unwrap_err();

        assert!(matches!(err, PreferenceError::SameBackend(BackendKind::Native)));
    }

    #[test]
    fn test_migrate_preserves_stored_types() {
        // Arrange
        let scratch = Scratch::memory();
        let mut source = scratch.open(BackendKind::Native);
        source.put("i", 11_i32).unwrap();
        source.put("l", 15_i64).unwrap();
        source.put("f", 3.141_f32).unwrap();

        // Act
        let target = source.migrate(BackendKind::Local).unwrap();

        // Assert
        assert_eq!(target.raw("i").unwrap(), Some(Value::Int(11)));
        assert_eq!(target.raw("l").unwrap(), Some(Value::Long(15)));
        assert_eq!(target.raw("f").unwrap(), Some(Value::Float(3.141)));
    }

    #[test]
    fn test_migrate_overwrites_conflicting_keys_and_keeps_others() {
        // Arrange
        let scratch = Scratch::memory();
        let mut existing = scratch.open(BackendKind::Home);
        existing.put("shared", "old").unwrap();
        existing.put("home_only", true).unwrap();
        let mut source = scratch.open(BackendKind::Native);
        source.put("shared", "new").unwrap();

        // Act
        let target = source.migrate(BackendKind::Home).unwrap();

        // Assert
        assert_eq!(target.get("shared", String::new()), "new");
        assert!(target.get("home_only", false));
    }

    #[test]
    fn test_migrate_and_clear_empties_source_on_success() {
        let scratch = Scratch::memory();
        let mut source = scratch.open(BackendKind::Local);
        source.put("k", 1_i32).unwrap();

        let target = source.migrate_and_clear(BackendKind::Native).unwrap();

        assert_eq!(target.get("k", 0_i32), 1);
        let reopened = scratch.open(BackendKind::Local);
        assert!(reopened.keys().unwrap().is_empty());
    }

    #[test]
    fn test_failed_migrate_and_clear_keeps_source() {
        // Arrange: the key is too long for the native store.
        let scratch = Scratch::memory();
        let mut source = scratch.open(BackendKind::Local);
        let long_key = "k".repeat(100);
        source.put(&long_key, 1_i32).unwrap();

        // Act
        let err = source.migrate_and_clear(BackendKind::Native).unwrap_err();

        // Assert
        assert!(matches!(err, PreferenceError::Migration { .. }));
        let reopened = scratch.open(BackendKind::Local);
        assert_eq!(reopened.get(&long_key, 0_i32), 1);
    }

    #[test]
    fn test_source_read_failure_aborts_with_migration_error() {
        // Arrange
        let scratch = Scratch::memory();
        let mut backend = MockPreferenceBackend::new();
        backend.expect_kind().return_const(BackendKind::Local);
        backend
            .expect_keys()
            .returning(|| Ok(vec!["a".to_string(), "b".to_string()]));
        backend
            .expect_get()
            .returning(|key| match key {
                "a" => Ok(Some(Value::Int(1))),
                _ => Err(RegistryError::Unavailable("disk gone".into()).into()),
            });
        let source = Preferences::from_backend(ns(), scratch.config.clone(), Box::new(backend));

        // Act
        let err = source.migrate(BackendKind::Native).unwrap_err();

        // Assert
        match err {
            PreferenceError::Migration {
                key, from, to, source, ..
            } => {
                assert_eq!(key.as_deref(), Some("b"));
                assert_eq!(from, BackendKind::Local);
                assert_eq!(to, BackendKind::Native);
                assert!(matches!(*source, PreferenceError::Registry(_)));
            }
            other => panic!("expected Migration error, got {other:?}"),
        }
    }

    #[test]
    fn test_source_enumeration_failure_aborts_without_key() {
        let scratch = Scratch::memory();
        let mut backend = MockPreferenceBackend::new();
        backend.expect_kind().return_const(BackendKind::Home);
        backend
            .expect_keys()
            .returning(|| Err(RegistryError::Unavailable("locked".into()).into()));
        let source = Preferences::from_backend(ns(), scratch.config.clone(), Box::new(backend));

        let err = source.migrate(BackendKind::Native).unwrap_err();

        assert!(matches!(err, PreferenceError::Migration { key: None, .. }));
    }

    #[test]
    fn test_destination_write_failure_aborts_and_leaves_source_intact() {
        // Arrange
        let mut registry = MockNativeRegistry::new();
        registry
            .expect_describe()
            .returning(|node| format!("mock:{node}"));
        registry
            .expect_put()
            .returning(|_, _, _| Err(RegistryError::Unavailable("read-only".into())));
        let scratch = Scratch::new(RegistryConfig::Custom(Arc::new(registry)));
        let mut source = scratch.open(BackendKind::Local);
        source.put("a", 1_i32).unwrap();
        source.put("b", 2_i32).unwrap();

        // Act
        let err = source.migrate(BackendKind::Native).unwrap_err();

        // Assert
        assert!(matches!(err, PreferenceError::Migration { key: Some(_), .. }));
        assert_eq!(source.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_destination_open_failure_is_not_wrapped() {
        let scratch = Scratch::memory();
        let home_file = scratch.config.home_file(&ns()).unwrap();
        std::fs::create_dir_all(home_file.parent().unwrap()).unwrap();
        std::fs::write(&home_file, "[[[ corrupt").unwrap();
        let mut source = scratch.open(BackendKind::Native);
        source.put("k", true).unwrap();

        let err = source.migrate(BackendKind::Home).unwrap_err();

        assert!(matches!(err, PreferenceError::ConfigLoad { .. }));
        assert!(source.get("k", false));
    }
}
