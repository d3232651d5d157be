//! Process-wide configuration map addressed by dotted paths.
//!
//! Values live in a single JSON tree. `Hook.controller_properties.Nodes`
//! addresses the `Nodes` key of the `controller_properties` object inside
//! the `Hook` object. Writes create intermediate objects as needed.

use std::sync::LazyLock;

use parking_lot::RwLock;
use serde_json::{Map, Value};

static GLOBAL: LazyLock<Configure> = LazyLock::new(Configure::new);

/// Dotted-path JSON configuration store.
#[derive(Debug, Default)]
pub struct Configure {
    root: RwLock<Value>,
}

impl Configure {
    /// Create an empty configuration map.
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// The process-wide instance.
    pub fn global() -> &'static Configure {
        &GLOBAL
    }

    /// Read the value at `path`, cloned out of the tree.
    pub fn read(&self, path: &str) -> Option<Value> {
        let root = self.root.read();
        lookup(&root, path).cloned()
    }

    /// Whether a non-null value exists at `path`.
    pub fn check(&self, path: &str) -> bool {
        let root = self.root.read();
        lookup(&root, path).is_some_and(|v| !v.is_null())
    }

    /// Replace the value at `path`.
    pub fn write(&self, path: &str, value: Value) {
        let mut root = self.root.write();
        *slot(&mut root, path) = value;
    }

    /// Remove the value at `path`. Returns the removed value.
    pub fn delete(&self, path: &str) -> Option<Value> {
        let mut root = self.root.write();
        let (parent_path, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (Some(parent), key),
            None => (None, path),
        };
        let parent = match parent_path {
            Some(p) => lookup_mut(&mut root, p)?,
            None => &mut *root,
        };
        parent.as_object_mut()?.remove(key)
    }

    /// Deep-merge `value` into the value at `path`.
    ///
    /// Objects merge key by key; anything else replaces the existing value.
    pub fn merge(&self, path: &str, value: Value) {
        let mut root = self.root.write();
        deep_merge(slot(&mut root, path), value);
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |node, key| node.as_object()?.get(key))
}

fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    segments(path).try_fold(root, |node, key| node.as_object_mut()?.get_mut(key))
}

/// Walk to `path`, turning non-objects along the way into empty objects.
fn slot<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut node = root;
    for key in segments(path) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map.entry(key.to_string()).or_insert(Value::Null),
            other => other,
        };
    }
    node
}

/// Recursive merge where `incoming` wins on conflicts.
pub(crate) fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}
