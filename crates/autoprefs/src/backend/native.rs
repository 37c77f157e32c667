//! Native-store backend: one registry node per namespace.
//!
//! The registry imposes the usual per-user preferences limits: keys of at
//! most [`MAX_KEY_LENGTH`] bytes, string values of at most
//! [`MAX_VALUE_LENGTH`] bytes, and byte values of at most
//! [`MAX_BYTES_LENGTH`] bytes (the binary form of a maximal text value).
//!
//! Opaque values count against the byte limit but keep their own tag, so an
//! object written here reads back (and migrates onward) as [`Value::Opaque`].

use std::sync::Arc;

use super::PreferenceBackend;
use crate::domain::{BackendKind, Value};
use crate::error::{PreferenceError, PreferenceResult};
use crate::registry::{NativeRegistry, NodePath};

pub const MAX_KEY_LENGTH: usize = 80;
pub const MAX_VALUE_LENGTH: usize = 8 * 1024;
pub const MAX_BYTES_LENGTH: usize = MAX_VALUE_LENGTH * 3 / 4;

/// A preference store kept in a [`NativeRegistry`] node.
pub struct NativeBackend {
    node: NodePath,
    registry: Arc<dyn NativeRegistry>,
}

impl NativeBackend {
    pub fn new(node: NodePath, registry: Arc<dyn NativeRegistry>) -> Self {
        Self { node, registry }
    }

    pub fn node(&self) -> &NodePath {
        &self.node
    }
}

fn check_limits(key: &str, value: &Value) -> PreferenceResult<()> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(PreferenceError::InvalidKey {
            key: key.to_string(),
            reason: "native store keys are limited to 80 bytes",
        });
    }
    let max = match value {
        Value::String(_) => MAX_VALUE_LENGTH,
        Value::Bytes(_) | Value::Opaque(_) => MAX_BYTES_LENGTH,
        _ => return Ok(()),
    };
    let len = value.payload_len();
    if len > max {
        return Err(PreferenceError::ValueTooLarge {
            key: key.to_string(),
            len,
            max,
        });
    }
    Ok(())
}

impl PreferenceBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn location(&self) -> String {
        self.registry.describe(&self.node)
    }

    fn get(&self, key: &str) -> PreferenceResult<Option<Value>> {
        Ok(self.registry.get(&self.node, key)?)
    }

    fn put(&mut self, key: &str, value: Value) -> PreferenceResult<()> {
        check_limits(key, &value)?;
        Ok(self.registry.put(&self.node, key, value)?)
    }

    fn remove(&mut self, key: &str) -> PreferenceResult<bool> {
        Ok(self.registry.remove(&self.node, key)?)
    }

    fn keys(&self) -> PreferenceResult<Vec<String>> {
        Ok(self.registry.keys(&self.node)?)
    }

    fn clear(&mut self) -> PreferenceResult<()> {
        Ok(self.registry.clear(&self.node)?)
    }
}
