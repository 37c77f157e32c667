//! File-system registry: one `bincode` node file per namespace.
//!
//! ```text
//! <root>/
//! └── com/
//!     └── example/
//!         └── viewer/
//!             └── prefs.bin     # BTreeMap<String, Value>
//! ```
//!
//! Nodes are read on every access and rewritten on every mutation.  An empty
//! node is removed from disk rather than written as an empty map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{NativeRegistry, NodePath, RegistryError};
use crate::domain::Value;

/// Name of the file holding a node's entries.
pub const NODE_FILE_NAME: &str = "prefs.bin";

type Node = BTreeMap<String, Value>;

/// A [`NativeRegistry`] rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsRegistry {
    root: PathBuf,
}

impl FsRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the file backing `node`.
    pub fn node_file(&self, node: &NodePath) -> PathBuf {
        self.root.join(node.to_relative_path()).join(NODE_FILE_NAME)
    }

    fn load(&self, node: &NodePath) -> Result<Node, RegistryError> {
        let path = self.node_file(node);
        match std::fs::read(&path) {
            Ok(bytes) => {
                bincode::deserialize(&bytes).map_err(|source| RegistryError::Corrupt { path, source })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Node::new()),
            Err(source) => Err(RegistryError::Io { path, source }),
        }
    }

    fn store(&self, node: &NodePath, entries: &Node) -> Result<(), RegistryError> {
        let path = self.node_file(node);

        if entries.is_empty() {
            return match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(RegistryError::Io { path, source }),
            };
        }

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| RegistryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let bytes = bincode::serialize(entries).map_err(RegistryError::Encode)?;
        std::fs::write(&path, bytes).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;
        trace!(node = %node, entries = entries.len(), "registry node written");
        Ok(())
    }
}

impl NativeRegistry for FsRegistry {
    fn get(&self, node: &NodePath, key: &str) -> Result<Option<Value>, RegistryError> {
        Ok(self.load(node)?.remove(key))
    }

    fn put(&self, node: &NodePath, key: &str, value: Value) -> Result<(), RegistryError> {
        let mut entries = self.load(node)?;
        entries.insert(key.to_string(), value);
        self.store(node, &entries)
    }

    fn remove(&self, node: &NodePath, key: &str) -> Result<bool, RegistryError> {
        let mut entries = self.load(node)?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.store(node, &entries)?;
        Ok(true)
    }

    fn keys(&self, node: &NodePath) -> Result<Vec<String>, RegistryError> {
        Ok(self.load(node)?.into_keys().collect())
    }

    fn clear(&self, node: &NodePath) -> Result<(), RegistryError> {
        self.store(node, &Node::new())
    }

    fn describe(&self, node: &NodePath) -> String {
        self.node_file(node).display().to_string()
    }
}
