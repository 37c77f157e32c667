//! Namespaces: the name a preference set is stored under.
//!
//! A namespace is a dot-separated path such as `com.example.viewer`.  It picks
//! the file name for the file backends (`com.example.viewer.toml`) and the node
//! path inside the native registry (`com/example/viewer`), so every segment
//! must be safe to use as a single path component.

use std::fmt;
use std::str::FromStr;

use crate::error::{PreferenceError, PreferenceResult};

/// Extension used for the file backends.
pub const FILE_EXTENSION: &str = "toml";

/// Longest namespace accepted, leaving room for the extension in a file name.
pub const MAX_NAMESPACE_LENGTH: usize = 200;

/// Longest single segment, matching the registry's node-name limit.
pub const MAX_SEGMENT_LENGTH: usize = 80;

/// Fallback used by [`Namespace::for_type`] when a type has no module path.
const ROOT_NAMESPACE: &str = "default";

/// A validated preference namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Validates and wraps `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::InvalidNamespace`] when `name` is empty, too
    /// long, has an empty segment, or contains characters other than ASCII
    /// alphanumerics, `_`, `-` and the `.` separator.
    pub fn new(name: impl Into<String>) -> PreferenceResult<Self> {
        let name = name.into();
        match validate(&name) {
            Ok(()) => Ok(Self(name)),
            Err(reason) => Err(PreferenceError::InvalidNamespace {
                namespace: name,
                reason,
            }),
        }
    }

    /// Derives a namespace from the module that defines `T`.
    ///
    /// `my_app::settings::Window` maps to `my_app.settings`, so every type in
    /// one module shares a preference set.  Characters that are not valid in a
    /// namespace are replaced with `_`.
    pub fn for_type<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let path = full.split('<').next().unwrap_or(full);
        let module = path.rsplit_once("::").map_or("", |(module, _)| module);

        let segments: Vec<String> = module
            .split("::")
            .map(|segment| {
                segment
                    .chars()
                    .map(|c| if is_segment_char(c) { c } else { '_' })
                    .take(MAX_SEGMENT_LENGTH)
                    .collect::<String>()
            })
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut name = segments.join(".");
        name.truncate(MAX_NAMESPACE_LENGTH);
        let name = name.trim_end_matches('.').to_string();
        if name.is_empty() {
            Self(ROOT_NAMESPACE.to_string())
        } else {
            Self(name)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The file name used by the file backends, e.g. `com.example.toml`.
    pub fn file_name(&self) -> String {
        format!("{}.{FILE_EXTENSION}", self.0)
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn validate(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("namespace is empty");
    }
    if name.len() > MAX_NAMESPACE_LENGTH {
        return Err("namespace is longer than 200 bytes");
    }
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err("namespace has an empty segment");
        }
        if segment.len() > MAX_SEGMENT_LENGTH {
            return Err("namespace segment is longer than 80 bytes");
        }
        if !segment.chars().all(is_segment_char) {
            return Err("only ASCII letters, digits, '_', '-' and '.' are allowed");
        }
    }
    Ok(())
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Namespace {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn test_new_accepts_dotted_package_style_name() {
        let ns = Namespace::new("com.ethanruffing.preference_abstraction").unwrap();

        assert_eq!(ns.as_str(), "com.ethanruffing.preference_abstraction");
        assert_eq!(
            ns.segments().collect::<Vec<_>>(),
            vec!["com", "ethanruffing", "preference_abstraction"]
        );
        assert_eq!(ns.file_name(), "com.ethanruffing.preference_abstraction.toml");
    }

    #[test]
    fn test_new_rejects_empty_name() {
        let err = Namespace::new("").unwrap_err();
        assert!(matches!(err, PreferenceError::InvalidNamespace { .. }));
    }

    #[test]
    fn test_new_rejects_empty_segment() {
        assert!(Namespace::new("com..example").is_err());
        assert!(Namespace::new(".leading").is_err());
        assert!(Namespace::new("trailing.").is_err());
    }

    #[test]
    fn test_new_rejects_path_separators() {
        assert!(Namespace::new("../escape").is_err());
        assert!(Namespace::new("a/b").is_err());
        assert!(Namespace::new("a\\b").is_err());
    }

    #[test]
    fn test_new_rejects_overlong_segment() {
        let long = "x".repeat(MAX_SEGMENT_LENGTH + 1);
        assert!(Namespace::new(long).is_err());
    }

    #[test]
    fn test_for_type_uses_enclosing_module_path() {
        let ns = Namespace::for_type::<Marker>();
        assert_eq!(ns.as_str(), "autoprefs.domain.namespace.tests");
    }

    #[test]
    fn test_for_type_ignores_generic_arguments() {
        let ns = Namespace::for_type::<Vec<Marker>>();
        assert_eq!(ns.as_str(), "alloc.vec");
    }

    #[test]
    fn test_for_type_falls_back_for_primitives() {
        assert_eq!(Namespace::for_type::<i32>().as_str(), "default");
    }

    #[test]
    fn test_for_type_always_produces_a_valid_namespace() {
        let ns = Namespace::for_type::<&'static str>();
        assert!(Namespace::new(ns.as_str()).is_ok());
    }

    #[test]
    fn test_from_str_validates() {
        assert!("com.example".parse::<Namespace>().is_ok());
        assert!("com example".parse::<Namespace>().is_err());
    }
}
