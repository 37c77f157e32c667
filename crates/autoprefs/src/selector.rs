//! Backend selection.
//!
//! Without an explicit kind, the first existing candidate wins:
//!
//! 1. `<local_dir>/<namespace>.toml`  → [`BackendKind::Local`]
//! 2. `<home_dir>/<namespace>.toml`   → [`BackendKind::Home`]
//! 3. otherwise                       → [`BackendKind::Native`]
//!
//! The winning candidate is then opened like an explicit request.  If it turns
//! out to be unreadable or corrupt, that error is returned; lower-priority
//! candidates are never tried in its place.
//!
//! # Existence, not contents
//!
//! Probing only asks whether a file is there.  An empty or freshly cleared
//! local file still wins over a populated home file, and a corrupt one is
//! reported rather than skipped.  Deleting the file (which is what
//! [`crate::Preferences::clear`] does for file stores) is how a namespace
//! falls back to the next candidate.
//!
//! # Explicit kinds
//!
//! | requested | location                                   | missing location |
//! |-----------|--------------------------------------------|------------------|
//! | `Local`   | `<local_dir>/<namespace>.toml`             | empty store      |
//! | `Home`    | `<home_dir>/<namespace>.toml`              | empty store, or [`PreferenceError::NoHomeDirectory`] without a home dir |
//! | `Native`  | registry node `/<segment>/<segment>/…`     | empty node       |
//!
//! An explicit `Local` always means the working-directory path, whether or
//! not a home file exists.  Nothing is created on disk until the first write.

use tracing::{debug, info};

use crate::backend::{FileBackend, NativeBackend, PreferenceBackend};
use crate::config::PreferencesConfig;
use crate::domain::{BackendKind, Namespace};
use crate::error::{PreferenceError, PreferenceResult};
use crate::registry::NodePath;

/// Picks the backend kind for `namespace` by probing for existing files.
///
/// The native store is the universal fallback, so probing never fails.
pub fn probe(config: &PreferencesConfig, namespace: &Namespace) -> BackendKind {
    let local = config.local_file(namespace);
    if local.exists() {
        debug!(path = %local.display(), "found local preference file");
        return BackendKind::Local;
    }

    match config.home_file(namespace) {
        Some(home) if home.exists() => {
            debug!(path = %home.display(), "found home preference file");
            BackendKind::Home
        }
        Some(_) => {
            debug!(%namespace, "no preference file found; using native store");
            BackendKind::Native
        }
        None => {
            debug!(%namespace, "home directory unknown; skipping home probe");
            BackendKind::Native
        }
    }
}

/// Opens the backend of the given kind for `namespace`.
///
/// File kinds open the file if it exists and start empty otherwise.
///
/// # Errors
///
/// Returns [`PreferenceError::ConfigLoad`] for an unreadable or corrupt file,
/// and [`PreferenceError::NoHomeDirectory`] for [`BackendKind::Home`] when no
/// home directory is configured.
pub fn open_backend(
    config: &PreferencesConfig,
    namespace: &Namespace,
    kind: BackendKind,
) -> PreferenceResult<Box<dyn PreferenceBackend>> {
    let backend: Box<dyn PreferenceBackend> = match kind {
        BackendKind::Local => Box::new(FileBackend::open(kind, config.local_file(namespace))?),
        BackendKind::Home => {
            let path = config
                .home_file(namespace)
                .ok_or(PreferenceError::NoHomeDirectory)?;
            Box::new(FileBackend::open(kind, path)?)
        }
        BackendKind::Native => Box::new(NativeBackend::new(
            NodePath::from(namespace),
            config.registry.open(),
        )),
    };
    Ok(backend)
}

/// Selects and opens a backend: `requested` if given, otherwise the result
/// of [`probe`].
///
/// # Errors
///
/// See [`open_backend`].
pub fn select(
    config: &PreferencesConfig,
    namespace: &Namespace,
    requested: Option<BackendKind>,
) -> PreferenceResult<Box<dyn PreferenceBackend>> {
    let kind = match requested {
        Some(kind) => kind,
        None => probe(config, namespace),
    };

    let backend = open_backend(config, namespace, kind)?;
    info!(
        %namespace,
        backend = %kind,
        location = %backend.location(),
        explicit = requested.is_some(),
        "preference store opened"
    );
    Ok(backend)
}
