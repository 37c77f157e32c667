//! TOML-file backend for the local and home preference files.
//!
//! The whole document is loaded when the backend opens and rewritten after
//! every mutation.  A file that does not exist yet starts out empty and is
//! created by the first write.
//!
//! ```toml
//! version = 1
//!
//! [entries]
//! "window.width" = { int = 1280 }
//! recent = { string = "a.txt, b.txt" }
//! ```
//!
//! # Type tags
//!
//! `Value` is serialized with serde's default externally tagged enum layout:
//! each entry is a one-key table whose key names the type (`bool`, `int`,
//! `long`, `float`, `double`, `string`, `bytes`, `opaque`).  A value therefore
//! reads back as the type it was written with, even where TOML itself has one
//! type for both (`int`/`long`, `float`/`double`, `bytes`/`opaque`).  Strings
//! are stored verbatim: separators such as `,` are never split into lists.
//!
//! An unknown tag, or a payload that does not fit its tag, makes the whole
//! document fail to load with [`PreferenceError::ConfigLoad`].
//!
//! # Document version
//!
//! `version` is written on every save.  It is annotated with
//! `#[serde(default = "default_version")]`, so a hand-written file without it
//! loads as the current version; `entries` defaults to an empty table the same
//! way, and an empty file is an empty store.
//!
//! # Saving
//!
//! Every `put`, `remove`, and `clear` goes to disk before it returns.  A
//! mutation is applied to a copy of the document; the copy replaces the
//! in-memory state only once the file write succeeds.  After a failed save
//! the store reads exactly as it did before the call.  `clear` deletes the
//! file instead of writing an empty document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::PreferenceBackend;
use crate::domain::{BackendKind, Value};
use crate::error::{LoadFailure, PreferenceError, PreferenceResult};

/// Current on-disk document version.
pub const DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PreferenceDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

impl Default for PreferenceDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// A preference store kept in one TOML file.
#[derive(Debug)]
pub struct FileBackend {
    kind: BackendKind,
    path: PathBuf,
    document: PreferenceDocument,
}

impl FileBackend {
    /// Opens the file at `path`, or starts empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::ConfigLoad`] if the file exists but cannot
    /// be read or is not a valid preference document.
    pub fn open(kind: BackendKind, path: impl Into<PathBuf>) -> PreferenceResult<Self> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| PreferenceError::ConfigLoad {
                path: path.clone(),
                source: LoadFailure::Parse(e),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "preference file absent; starting empty");
                PreferenceDocument::default()
            }
            Err(e) => {
                return Err(PreferenceError::ConfigLoad {
                    path,
                    source: LoadFailure::Io(e),
                })
            }
        };

        Ok(Self {
            kind,
            path,
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.document.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.entries.is_empty()
    }

    /// Writes `document` to disk, then adopts it as the in-memory state.
    ///
    /// On failure the in-memory state is left as it was, so readers never
    /// see an entry that is not on disk.
    fn commit(&mut self, document: PreferenceDocument) -> PreferenceResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| PreferenceError::Persist {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(&document)?;
        std::fs::write(&self.path, content).map_err(|source| PreferenceError::Persist {
            path: self.path.clone(),
            source,
        })?;
        self.document = document;
        trace!(path = %self.path.display(), entries = self.len(), "preference file saved");
        Ok(())
    }
}

impl PreferenceBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn get(&self, key: &str) -> PreferenceResult<Option<Value>> {
        Ok(self.document.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> PreferenceResult<()> {
        let mut next = self.document.clone();
        next.entries.insert(key.to_string(), value);
        self.commit(next)
    }

    fn remove(&mut self, key: &str) -> PreferenceResult<bool> {
        if !self.document.entries.contains_key(key) {
            return Ok(false);
        }
        let mut next = self.document.clone();
        next.entries.remove(key);
        self.commit(next)?;
        Ok(true)
    }

    fn keys(&self) -> PreferenceResult<Vec<String>> {
        Ok(self.document.entries.keys().cloned().collect())
    }

    fn clear(&mut self) -> PreferenceResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(PreferenceError::Persist {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        self.document.entries.clear();
        Ok(())
    }
}
