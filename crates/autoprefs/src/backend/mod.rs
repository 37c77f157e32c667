//! Storage backends behind the [`crate::Preferences`] facade.
//!
//! Each backend is selected once at construction and then held as a
//! `Box<dyn PreferenceBackend>`; the facade never checks the kind again.
//!
//! - [`FileBackend`] serves both [`BackendKind::Local`] and
//!   [`BackendKind::Home`]; only the path differs.
//! - [`NativeBackend`] serves [`BackendKind::Native`] through a
//!   [`crate::NativeRegistry`].

mod file;
mod native;

use crate::domain::{BackendKind, Value};
use crate::error::PreferenceResult;

pub use file::{FileBackend, DOCUMENT_VERSION};
pub use native::{NativeBackend, MAX_BYTES_LENGTH, MAX_KEY_LENGTH, MAX_VALUE_LENGTH};

/// Raw entry access common to every backend.
///
/// Values go in and come out untyped; coercion to the caller's type happens
/// in the facade.
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceBackend: Send {
    fn kind(&self) -> BackendKind;

    /// File path or registry node serving this store, for diagnostics.
    fn location(&self) -> String;

    /// Reads the stored value for `key`, or `None` if there is none.
    fn get(&self, key: &str) -> PreferenceResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value, and persists
    /// the change before returning.
    fn put(&mut self, key: &str, value: Value) -> PreferenceResult<()>;

    /// Removes `key`, returning whether it was present.
    fn remove(&mut self, key: &str) -> PreferenceResult<bool>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> PreferenceResult<Vec<String>>;

    /// Removes every entry.  Calling it on an empty store is a no-op.
    fn clear(&mut self) -> PreferenceResult<()>;
}
