//! The three physical storage mechanisms a preference store can live in.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which backend serves a preference store.
///
/// Fixed for the lifetime of a [`crate::Preferences`]; moving to another kind
/// goes through [`crate::Preferences::migrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// `<namespace>.toml` in the current working directory.
    Local,
    /// `<namespace>.toml` in the user's home directory.
    Home,
    /// The per-user native settings registry.
    Native,
}

impl BackendKind {
    /// All kinds, in automatic-selection priority order.
    pub const ALL: [BackendKind; 3] = [BackendKind::Local, BackendKind::Home, BackendKind::Native];

    /// Returns `true` for the two file-backed kinds.
    pub fn is_file(self) -> bool {
        matches!(self, BackendKind::Local | BackendKind::Home)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Home => "home",
            BackendKind::Native => "native",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backend kind '{0}' (expected local, home, or native)")]
pub struct ParseBackendKindError(pub String);

impl FromStr for BackendKind {
    type Err = ParseBackendKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "home" => Ok(BackendKind::Home),
            // "system" is the name the registry goes by on most platforms.
            "native" | "system" => Ok(BackendKind::Native),
            _ => Err(ParseBackendKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_every_display_form() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string().parse::<BackendKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_accepts_system_alias() {
        assert_eq!("HOME".parse::<BackendKind>(), Ok(BackendKind::Home));
        assert_eq!("System".parse::<BackendKind>(), Ok(BackendKind::Native));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = "registry".parse::<BackendKind>().unwrap_err();
        assert_eq!(err, ParseBackendKindError("registry".to_string()));
    }

    #[test]
    fn test_only_local_and_home_are_file_kinds() {
        assert!(BackendKind::Local.is_file());
        assert!(BackendKind::Home.is_file());
        assert!(!BackendKind::Native.is_file());
    }
}
