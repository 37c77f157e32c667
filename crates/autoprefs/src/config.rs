//! Where each backend keeps its data.
//!
//! [`PreferencesConfig::from_env`] resolves the three locations from the
//! process environment:
//!
//! | backend | location                                                      |
//! |---------|---------------------------------------------------------------|
//! | local   | current working directory                                     |
//! | home    | `HOME` (`USERPROFILE` on Windows)                              |
//! | native  | Windows: `%APPDATA%\autoprefs\registry`                        |
//! |         | Linux:   `$XDG_CONFIG_HOME/autoprefs/registry` or `~/.config/…`|
//! |         | macOS:   `~/Library/Preferences/autoprefs/registry`            |
//!
//! Tests and embedders build the config directly and point every location at
//! a scratch directory (or an in-memory registry) instead.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{BackendKind, Namespace};
use crate::error::{PreferenceError, PreferenceResult};
use crate::registry::{FsRegistry, MemoryRegistry, NativeRegistry};

/// Directory name used under the platform configuration directory.
pub const APP_DIR_NAME: &str = "autoprefs";

/// Which registry serves [`BackendKind::Native`].
#[derive(Clone)]
pub enum RegistryConfig {
    /// An [`FsRegistry`] rooted at the given directory.
    Filesystem(PathBuf),
    /// A shared in-process [`MemoryRegistry`].
    Memory(MemoryRegistry),
    /// Any other registry implementation.
    Custom(Arc<dyn NativeRegistry>),
}

impl RegistryConfig {
    pub(crate) fn open(&self) -> Arc<dyn NativeRegistry> {
        match self {
            RegistryConfig::Filesystem(root) => Arc::new(FsRegistry::new(root)),
            RegistryConfig::Memory(registry) => Arc::new(registry.clone()),
            RegistryConfig::Custom(registry) => Arc::clone(registry),
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryConfig::Filesystem(root) => f.debug_tuple("Filesystem").field(root).finish(),
            RegistryConfig::Memory(_) => f.write_str("Memory"),
            RegistryConfig::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Locations used to open preference stores.
#[derive(Debug, Clone)]
pub struct PreferencesConfig {
    /// Directory searched for, and holding, local preference files.
    pub local_dir: PathBuf,
    /// Directory holding home preference files; `None` if unknown.
    pub home_dir: Option<PathBuf>,
    /// Registry used by the native backend.
    pub registry: RegistryConfig,
}

impl PreferencesConfig {
    pub fn new(local_dir: impl Into<PathBuf>, home_dir: Option<PathBuf>, registry: RegistryConfig) -> Self {
        Self {
            local_dir: local_dir.into(),
            home_dir,
            registry,
        }
    }

    /// Resolves every location from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::WorkingDirectory`] if the current directory
    /// cannot be read, or [`PreferenceError::NoPlatformConfigDir`] if the
    /// native registry root cannot be determined.
    pub fn from_env() -> PreferenceResult<Self> {
        let local_dir = std::env::current_dir().map_err(PreferenceError::WorkingDirectory)?;
        let root = default_registry_root().ok_or(PreferenceError::NoPlatformConfigDir)?;
        Ok(Self::new(local_dir, home_dir(), RegistryConfig::Filesystem(root)))
    }

    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// Path of the local preference file for `namespace`.
    pub fn local_file(&self, namespace: &Namespace) -> PathBuf {
        self.local_dir.join(namespace.file_name())
    }

    /// Path of the home preference file for `namespace`, if the home
    /// directory is known.
    pub fn home_file(&self, namespace: &Namespace) -> Option<PathBuf> {
        self.home_dir
            .as_deref()
            .map(|dir| dir.join(namespace.file_name()))
    }

    /// Path of the preference file `kind` would use, or `None` for the native
    /// kind and for [`BackendKind::Home`] without a home directory.
    pub fn file_for(&self, kind: BackendKind, namespace: &Namespace) -> Option<PathBuf> {
        match kind {
            BackendKind::Local => Some(self.local_file(namespace)),
            BackendKind::Home => self.home_file(namespace),
            BackendKind::Native => None,
        }
    }
}

/// The user's home directory, from `HOME` (or `USERPROFILE` on Windows).
pub fn home_dir() -> Option<PathBuf> {
    let var = std::env::var_os("HOME");

    #[cfg(target_os = "windows")]
    let var = var.or_else(|| std::env::var_os("USERPROFILE"));

    var.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Default root of the file-system native registry for this platform.
pub fn default_registry_root() -> Option<PathBuf> {
    platform_config_dir().map(|dir| dir.join(APP_DIR_NAME).join("registry"))
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(target_os = "macos")]
    {
        home_dir().map(|h| h.join("Library").join("Preferences"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".config")))
    }
}
