//! Error types for preference stores.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;
use crate::domain::BackendKind;
use crate::registry::RegistryError;

/// Convenience alias used throughout the crate.
pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Why an existing preference file could not be opened.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// The file exists but could not be read (permissions, not a file, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file was read but is not a valid preference document.
    #[error("malformed preference document: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Error type for every fallible preference operation.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// A backing file exists but cannot be opened or parsed.
    #[error("failed to load preferences from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: LoadFailure,
    },

    /// The key is absent, holds an incompatible type, or could not be decoded.
    #[error("no setting was found for the key '{key}'")]
    SettingNotFound {
        key: String,
        #[source]
        source: Option<CodecError>,
    },

    /// Copying entries into another backend failed part-way through.
    ///
    /// `key` is the entry being copied when the failure happened, or `None`
    /// when the source keys could not be enumerated.
    #[error("failed to migrate '{namespace}' from {from} to {to}: {source}")]
    Migration {
        namespace: String,
        from: BackendKind,
        to: BackendKind,
        key: Option<String>,
        #[source]
        source: Box<PreferenceError>,
    },

    /// Writing a preference file back to disk failed.
    #[error("I/O error saving preferences to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory document could not be rendered as TOML.
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The native settings registry reported a failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An object could not be encoded for storage.
    #[error("failed to encode value: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: &'static str,
    },

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The value exceeds what the active backend can hold for one entry.
    #[error("value for key '{key}' is {len} bytes, the limit is {max}")]
    ValueTooLarge { key: String, len: usize, max: usize },

    #[error("could not determine the user's home directory")]
    NoHomeDirectory,

    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("could not determine the current working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// Migration was asked to copy a store onto its own backend.
    #[error("preferences are already stored in the {0} backend")]
    SameBackend(BackendKind),
}

impl PreferenceError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::SettingNotFound {
            key: key.to_string(),
            source: None,
        }
    }

    /// Returns `true` for [`PreferenceError::SettingNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SettingNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_setting_not_found_message_names_the_key() {
        let err = PreferenceError::not_found("window.width");

        assert_eq!(
            err.to_string(),
            "no setting was found for the key 'window.width'"
        );
        assert!(err.is_not_found());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_setting_not_found_exposes_codec_cause() {
        let err = PreferenceError::SettingNotFound {
            key: "blob".to_string(),
            source: Some(CodecError::Decode("unexpected end of input".into())),
        };

        let cause = err.source().expect("codec error is the source");
        assert!(cause.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_migration_error_wraps_underlying_cause() {
        let err = PreferenceError::Migration {
            namespace: "com.example".to_string(),
            from: BackendKind::Local,
            to: BackendKind::Native,
            key: Some("k".to_string()),
            source: Box::new(PreferenceError::ValueTooLarge {
                key: "k".to_string(),
                len: 9000,
                max: 8192,
            }),
        };

        assert!(err.to_string().contains("from local to native"));
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }
}
