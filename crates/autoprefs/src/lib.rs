//! # autoprefs
//!
//! Durable, typed key/value preferences for a single application, stored in
//! whichever backend is available:
//!
//! - **Local file** – `<namespace>.toml` in the current working directory.
//! - **Home file** – `<namespace>.toml` in the user's home directory.
//! - **Native store** – the per-user settings registry, one node per
//!   namespace.
//!
//! [`Preferences::open`] probes for a local file, then a home file, and falls
//! back to the native store.  [`Preferences::open_with`] forces a backend.
//! Either way the caller sees the same typed `put` / `get` surface, and
//! [`Preferences::migrate`] copies a whole preference set into another backend.
//!
//! ```no_run
//! use autoprefs::{BackendKind, Namespace, Preferences};
//!
//! # fn main() -> autoprefs::PreferenceResult<()> {
//! let mut prefs = Preferences::open(Namespace::new("com.example.viewer")?)?;
//! prefs.put("window.width", 1280_i32)?;
//! let width: i32 = prefs.get("window.width", 800);
//!
//! let moved = prefs.migrate(BackendKind::Home)?;
//! assert_eq!(moved.get("window.width", 0_i32), width);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **`domain`** – namespaces, backend kinds, and the [`Value`] model with its
//!   coercion rules.
//! - **`backend`** – the [`PreferenceBackend`] trait and its file and native
//!   implementations.
//! - **`registry`** – the native settings registry the native backend talks to.
//! - **`selector`** – existence-based backend selection.
//! - **`preferences`** / **`migrate`** – the facade and the migration protocol.

pub mod backend;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod migrate;
pub mod preferences;
pub mod registry;
pub mod selector;

pub use backend::PreferenceBackend;
pub use codec::{BincodeCodec, CodecError, ObjectCodec};
pub use config::{PreferencesConfig, RegistryConfig};
pub use domain::{BackendKind, FromValue, Namespace, Value, ValueType};
pub use error::{LoadFailure, PreferenceError, PreferenceResult};
pub use preferences::Preferences;
pub use registry::{FsRegistry, MemoryRegistry, NativeRegistry, NodePath, RegistryError};
