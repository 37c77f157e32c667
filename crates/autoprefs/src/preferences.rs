//! The preference store facade.
//!
//! [`Preferences`] owns the backend chosen at construction and forwards every
//! call to it.  Reads come in two forms:
//!
//! - [`Preferences::get`] takes a default and never fails.  A missing key, a
//!   value of an incompatible type, and a backend read error all yield the
//!   default.
//! - [`Preferences::require`] returns [`PreferenceError::SettingNotFound`]
//!   when there is no usable value.
//!
//! # Example
//!
//! ```no_run
//! use autoprefs::{BackendKind, Namespace, Preferences};
//!
//! # fn main() -> autoprefs::PreferenceResult<()> {
//! let ns = Namespace::new("com.example.viewer")?;
//! let mut prefs = Preferences::open_with(ns, BackendKind::Home)?;
//!
//! prefs.put("testString", "Hello, World!")?;
//! prefs.put("testDouble", 3.14159_f64)?;
//!
//! assert_eq!(prefs.get("testString", "Goodnight, moon.".to_string()), "Hello, World!");
//! assert_eq!(prefs.get("testString2", "Goodnight, moon.".to_string()), "Goodnight, moon.");
//! let missing = prefs.require::<f64>("testDouble2");
//! assert!(missing.unwrap_err().is_not_found());
//! # Ok(())
//! # }
//! ```
//!
//! # Typed reads
//!
//! Writers pick the stored type through `From` (`put("n", 3_i64)` stores a
//! `long`).  Readers ask for a Rust type through [`FromValue`]; the coercion
//! table in [`crate::domain`] decides which stored types satisfy it, so an
//! `int` written by one backend still reads as `i64` after migrating through
//! another.
//!
//! # Objects
//!
//! [`Preferences::put_object`] stores the output of an [`ObjectCodec`] as an
//! opaque value.  Reading it back runs the same codec in reverse; a decode
//! failure surfaces as `SettingNotFound` with the codec error as its source,
//! or as the default for [`Preferences::get_object`].

use tracing::{debug, warn};

use crate::backend::PreferenceBackend;
use crate::codec::ObjectCodec;
use crate::config::PreferencesConfig;
use crate::domain::{BackendKind, FromValue, Namespace, Value};
use crate::error::{PreferenceError, PreferenceResult};
use crate::selector;

/// Typed preferences for one namespace, stored in one backend.
pub struct Preferences {
    namespace: Namespace,
    config: PreferencesConfig,
    backend: Box<dyn PreferenceBackend>,
}

impl Preferences {
    /// Opens the store for `namespace`, choosing the backend automatically
    /// with locations taken from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::ConfigLoad`] if the selected preference file
    /// is unreadable or corrupt, or an environment error from
    /// [`PreferencesConfig::from_env`].
    pub fn open(namespace: Namespace) -> PreferenceResult<Self> {
        Self::open_in(PreferencesConfig::from_env()?, namespace, None)
    }

    /// Opens the store for `namespace` in the given backend, with locations
    /// taken from the process environment.
    ///
    /// # Errors
    ///
    /// As [`Preferences::open`], plus [`PreferenceError::NoHomeDirectory`]
    /// when [`BackendKind::Home`] is requested without a home directory.
    pub fn open_with(namespace: Namespace, kind: BackendKind) -> PreferenceResult<Self> {
        Self::open_in(PreferencesConfig::from_env()?, namespace, Some(kind))
    }

    /// Opens the store for `namespace` using `config`.  `kind` forces a
    /// backend; `None` selects one automatically.
    ///
    /// # Errors
    ///
    /// See [`selector::open_backend`].
    pub fn open_in(
        config: PreferencesConfig,
        namespace: Namespace,
        kind: Option<BackendKind>,
    ) -> PreferenceResult<Self> {
        let backend = selector::select(&config, &namespace, kind)?;
        Ok(Self::from_backend(namespace, config, backend))
    }

    pub(crate) fn from_backend(
        namespace: Namespace,
        config: PreferencesConfig,
        backend: Box<dyn PreferenceBackend>,
    ) -> Self {
        Self {
            namespace,
            config,
            backend,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn config(&self) -> &PreferencesConfig {
        &self.config
    }

    /// File path or registry node holding this store.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// File backends write the file before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::InvalidKey`] for an empty key, a backend
    /// limit error, or the write failure.
    pub fn put(&mut self, key: &str, value: impl Into<Value>) -> PreferenceResult<()> {
        if key.is_empty() {
            return Err(PreferenceError::InvalidKey {
                key: String::new(),
                reason: "key is empty",
            });
        }
        self.backend.put(key, value.into())
    }

    /// Reads `key` as a `T`, falling back to `default`.
    pub fn get<T: FromValue>(&self, key: &str, default: T) -> T {
        match self.backend.get(key) {
            Ok(Some(value)) => match T::from_value(&value) {
                Some(typed) => typed,
                None => {
                    debug!(key, stored = %value.value_type(), "stored value has another type; using default");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "preference read failed; using default");
                default
            }
        }
    }

    /// Reads `key` as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::SettingNotFound`] if the key is absent or
    /// holds a value that cannot be read as `T`, or the backend read error.
    pub fn require<T: FromValue>(&self, key: &str) -> PreferenceResult<T> {
        let value = self
            .backend
            .get(key)?
            .ok_or_else(|| PreferenceError::not_found(key))?;
        T::from_value(&value).ok_or_else(|| PreferenceError::not_found(key))
    }

    /// The raw stored value for `key`.
    ///
    /// # Errors
    ///
    /// Returns the backend read error.
    pub fn raw(&self, key: &str) -> PreferenceResult<Option<Value>> {
        self.backend.get(key)
    }

    /// Returns `true` if a value is stored under `key`.  Read errors count as
    /// absent.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(key), Ok(Some(_)))
    }

    /// Encodes `value` with `codec` and stores it as an opaque value.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::Codec`] if encoding fails, otherwise as
    /// [`Preferences::put`].
    pub fn put_object<T, C>(&mut self, key: &str, value: &T, codec: &C) -> PreferenceResult<()>
    where
        C: ObjectCodec<T>,
    {
        let bytes = codec.encode(value)?;
        self.put(key, Value::Opaque(bytes))
    }

    /// Reads and decodes an object stored with [`Preferences::put_object`],
    /// falling back to `default` when it is missing or cannot be decoded.
    pub fn get_object<T, C>(&self, key: &str, default: T, codec: &C) -> T
    where
        C: ObjectCodec<T>,
    {
        match self.require_object(key, codec) {
            Ok(value) => value,
            Err(PreferenceError::SettingNotFound {
                source: Some(cause),
                ..
            }) => {
                warn!(key, error = %cause, "stored object could not be decoded; using default");
                default
            }
            Err(PreferenceError::SettingNotFound { source: None, .. }) => default,
            Err(e) => {
                warn!(key, error = %e, "preference read failed; using default");
                default
            }
        }
    }

    /// Reads and decodes an object stored with [`Preferences::put_object`].
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::SettingNotFound`] if the key is absent, not
    /// a byte value, or fails to decode (with the codec error as its source).
    pub fn require_object<T, C>(&self, key: &str, codec: &C) -> PreferenceResult<T>
    where
        C: ObjectCodec<T>,
    {
        let bytes = match self.backend.get(key)? {
            Some(Value::Opaque(bytes)) | Some(Value::Bytes(bytes)) => bytes,
            _ => return Err(PreferenceError::not_found(key)),
        };
        codec
            .decode(&bytes)
            .map_err(|cause| PreferenceError::SettingNotFound {
                key: key.to_string(),
                source: Some(cause),
            })
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub fn remove(&mut self, key: &str) -> PreferenceResult<bool> {
        self.backend.remove(key)
    }

    /// All stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub fn keys(&self) -> PreferenceResult<Vec<String>> {
        self.backend.keys()
    }

    /// All stored entries, sorted by key.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub fn entries(&self) -> PreferenceResult<Vec<(String, Value)>> {
        let mut entries = Vec::new();
        for key in self.backend.keys()? {
            if let Some(value) = self.backend.get(&key)? {
                entries.push((key, value));
            }
        }
        Ok(entries)
    }

    /// Deletes every entry in this namespace.  The store stays open.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub fn clear(&mut self) -> PreferenceResult<()> {
        self.backend.clear()?;
        debug!(namespace = %self.namespace, backend = %self.kind(), "preferences cleared");
        Ok(())
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("namespace", &self.namespace)
            .field("kind", &self.kind())
            .field("location", &self.location())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::backend::MockPreferenceBackend;
    use crate::codec::{BincodeCodec, CodecError};
    use crate::config::RegistryConfig;
    use crate::registry::{MemoryRegistry, RegistryError};

    fn native_prefs() -> Preferences {
        let config = PreferencesConfig::new(
            std::env::temp_dir(),
            None,
            RegistryConfig::Memory(MemoryRegistry::new()),
        );
        Preferences::open_in(
            config,
            Namespace::new("com.example.facade").unwrap(),
            Some(BackendKind::Native),
        )
        .unwrap()
    }

    fn mocked(backend: MockPreferenceBackend) -> Preferences {
        let config = PreferencesConfig::new(
            std::env::temp_dir(),
            None,
            RegistryConfig::Memory(MemoryRegistry::new()),
        );
        Preferences::from_backend(
            Namespace::new("com.example.mock").unwrap(),
            config,
            Box::new(backend),
        )
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_get_returns_stored_value() {
        let mut prefs = native_prefs();

        prefs.put("testBool", true).unwrap();

        assert!(prefs.get("testBool", false));
        assert!(!prefs.get("testBool2", false));
    }

    #[test]
    fn test_get_with_incompatible_type_returns_default() {
        let mut prefs = native_prefs();
        prefs.put("name", "Alice").unwrap();

        assert_eq!(prefs.get("name", 7_i32), 7);
    }

    #[test]
    fn test_require_reports_missing_and_mistyped_keys() {
        let mut prefs = native_prefs();
        prefs.put("name", "Alice").unwrap();

        assert!(prefs.require::<i32>("missing").unwrap_err().is_not_found());
        assert!(prefs.require::<bool>("name").unwrap_err().is_not_found());
        assert_eq!(prefs.require::<String>("name").unwrap(), "Alice");
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let mut prefs = native_prefs();

        let err = prefs.put("", 1_i32).unwrap_err();

        assert!(matches!(err, PreferenceError::InvalidKey { .. }));
    }

    #[test]
    fn test_object_round_trip_on_native_store() {
        let mut prefs = native_prefs();
        let point = Point { x: 3, y: -4 };

        prefs.put_object("origin", &point, &BincodeCodec).unwrap();

        assert_eq!(
            prefs.get_object("origin", Point { x: 0, y: 0 }, &BincodeCodec),
            point
        );
        assert_eq!(prefs.require_object::<Point, _>("origin", &BincodeCodec).unwrap(), point);
    }

    #[test]
    fn test_undecodable_object_falls_back_to_default() {
        // Arrange: a single byte is too short for two i32 fields.
        let mut prefs = native_prefs();
        prefs.put("origin", vec![1_u8]).unwrap();
        let fallback = Point { x: 0, y: 0 };

        // Act
        let defaulted = prefs.get_object("origin", fallback.clone(), &BincodeCodec);
        let required = prefs.require_object::<Point, _>("origin", &BincodeCodec);

        // Assert
        assert_eq!(defaulted, fallback);
        match required {
            Err(PreferenceError::SettingNotFound {
                key,
                source: Some(CodecError::Decode(_)),
            }) => assert_eq!(key, "origin"),
            other => panic!("expected SettingNotFound with decode cause, got {other:?}"),
        }
    }

    #[test]
    fn test_object_read_of_scalar_is_not_found() {
        let mut prefs = native_prefs();
        prefs.put("origin", 5_i64).unwrap();

        let err = prefs
            .require_object::<Point, _>("origin", &BincodeCodec)
            .unwrap_err();

        assert!(matches!(err, PreferenceError::SettingNotFound { source: None, .. }));
    }

    #[test]
    fn test_backend_read_error_falls_back_to_default() {
        // Arrange
        let mut backend = MockPreferenceBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(RegistryError::Unavailable("offline".into()).into()));
        let prefs = mocked(backend);

        // Act / Assert
        assert_eq!(prefs.get("k", 2.5_f64), 2.5);
        assert!(!prefs.contains("k"));
        assert!(matches!(
            prefs.require::<f64>("k"),
            Err(PreferenceError::Registry(_))
        ));
    }

    #[test]
    fn test_entries_are_sorted_by_key() {
        let mut prefs = native_prefs();
        prefs.put("b", 2_i32).unwrap();
        prefs.put("a", 1_i32).unwrap();

        let entries = prefs.entries().unwrap();

        assert_eq!(
            entries,
            vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(2))
            ]
        );
    }

    #[test]
    fn test_clear_empties_store_and_keeps_it_usable() {
        let mut prefs = native_prefs();
        prefs.put("k", 1_i32).unwrap();

        prefs.clear().unwrap();
        prefs.clear().unwrap();

        assert_eq!(prefs.get("k", 9_i32), 9);
        prefs.put("k", 2_i32).unwrap();
        assert_eq!(prefs.get("k", 9_i32), 2);
    }

    #[test]
    fn test_remove_deletes_single_key() {
        let mut prefs = native_prefs();
        prefs.put("a", 1_i32).unwrap();
        prefs.put("b", 2_i32).unwrap();

        assert!(prefs.remove("a").unwrap());

        assert!(!prefs.contains("a"));
        assert!(prefs.contains("b"));
    }
}
