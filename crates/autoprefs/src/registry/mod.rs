//! The per-user native settings registry.
//!
//! The registry is hierarchical: every namespace owns one node, addressed by
//! a [`NodePath`] built from the namespace segments.  A node holds typed
//! entries for booleans, 32/64-bit integers and floats, strings, byte
//! sequences, and opaque encoded objects, each with its type tag intact.
//!
//! Two implementations ship with the crate:
//!
//! - [`FsRegistry`] keeps one binary node file per namespace under the
//!   platform's per-user configuration directory.  Every call reads or writes
//!   the node file, so separate handles observe each other's writes.
//! - [`MemoryRegistry`] keeps nodes in a shared in-process map.

mod fs;
mod memory;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{Namespace, Value};

pub use fs::{FsRegistry, NODE_FILE_NAME};
pub use memory::MemoryRegistry;

/// Errors reported by a [`NativeRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reading or writing a node failed.
    #[error("I/O error accessing registry node at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A node exists but its contents cannot be decoded.
    #[error("corrupt registry node at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    /// A node could not be encoded for writing.
    #[error("failed to encode registry node: {0}")]
    Encode(#[source] bincode::Error),

    /// The registry cannot serve requests at all.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Location of one namespace's node inside the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The node as a relative directory path (`a/b/c`).
    pub fn to_relative_path(&self) -> PathBuf {
        self.0.iter().collect()
    }
}

impl From<&Namespace> for NodePath {
    fn from(namespace: &Namespace) -> Self {
        Self(namespace.segments().map(str::to_string).collect())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// Typed access to registry nodes.
///
/// Implementations return every [`Value`] with the tag it was written with.
#[cfg_attr(test, mockall::automock)]
pub trait NativeRegistry: Send + Sync {
    /// Reads one entry.
    fn get(&self, node: &NodePath, key: &str) -> Result<Option<Value>, RegistryError>;

    /// Writes one entry, creating the node if needed.
    fn put(&self, node: &NodePath, key: &str, value: Value) -> Result<(), RegistryError>;

    /// Removes one entry, returning whether it existed.
    fn remove(&self, node: &NodePath, key: &str) -> Result<bool, RegistryError>;

    /// Lists the keys of a node in sorted order.  A missing node has no keys.
    fn keys(&self, node: &NodePath) -> Result<Vec<String>, RegistryError>;

    /// Removes every entry of a node.
    fn clear(&self, node: &NodePath) -> Result<(), RegistryError>;

    /// Human-readable location of `node`, for diagnostics.
    fn describe(&self, node: &NodePath) -> String;
}
