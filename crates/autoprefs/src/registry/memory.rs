//! In-process registry.
//!
//! Clones share the same nodes, so a store and the store produced by
//! migrating into it see one registry, the same way two handles on the
//! real per-user registry would.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{NativeRegistry, NodePath, RegistryError};
use crate::domain::Value;

type Nodes = HashMap<NodePath, BTreeMap<String, Value>>;

/// A [`NativeRegistry`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    nodes: Arc<Mutex<Nodes>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Nodes>, RegistryError> {
        self.nodes
            .lock()
            .map_err(|_| RegistryError::Unavailable("memory registry lock poisoned".into()))
    }
}

impl NativeRegistry for MemoryRegistry {
    fn get(&self, node: &NodePath, key: &str) -> Result<Option<Value>, RegistryError> {
        Ok(self
            .lock()?
            .get(node)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn put(&self, node: &NodePath, key: &str, value: Value) -> Result<(), RegistryError> {
        self.lock()?
            .entry(node.clone())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, node: &NodePath, key: &str) -> Result<bool, RegistryError> {
        let mut nodes = self.lock()?;
        let Some(entries) = nodes.get_mut(node) else {
            return Ok(false);
        };
        let existed = entries.remove(key).is_some();
        if entries.is_empty() {
            nodes.remove(node);
        }
        Ok(existed)
    }

    fn keys(&self, node: &NodePath) -> Result<Vec<String>, RegistryError> {
        Ok(self
            .lock()?
            .get(node)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn clear(&self, node: &NodePath) -> Result<(), RegistryError> {
        self.lock()?.remove(node);
        Ok(())
    }

    fn describe(&self, node: &NodePath) -> String {
        format!("memory:{node}")
    }
}
