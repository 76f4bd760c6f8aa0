//! JSON persistence for [`PropertyTree`].
//!
//! Document layout:
//!
//! - A childless node is a JSON string holding its data.
//! - A node whose child keys are all distinct is a JSON object, keys in
//!   insertion order.
//! - A node with repeated child keys is a JSON array of single-entry objects,
//!   one per child, so duplicates and their order survive.
//!
//! Data stored on a node that also has children is not written.
//!
//! When reading, numbers and booleans are accepted as leaves (stored in their
//! JSON text form) and `null` reads as an empty leaf, so hand-written
//! documents do not need to quote every scalar.

use std::collections::HashSet;
use std::path::Path;

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::tree::PropertyTree;
use crate::TreeError;

// ---------------------------------------------------------------------------
// WriteSettings
// ---------------------------------------------------------------------------

/// Output options for [`write_file`] and [`to_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSettings {
    /// Indent the document for humans. Compact output otherwise.
    pub pretty: bool,
}

impl Default for WriteSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}

// ---------------------------------------------------------------------------
// Serialize / Deserialize
// ---------------------------------------------------------------------------

struct Entry<'t> {
    key: &'t str,
    node: &'t PropertyTree,
}

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.node)?;
        map.end()
    }
}

impl PropertyTree {
    fn has_unique_keys(&self) -> bool {
        let mut seen = HashSet::new();
        self.children().all(|(key, _)| seen.insert(key))
    }
}

impl Serialize for PropertyTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_leaf() {
            return serializer.serialize_str(self.data());
        }
        if self.has_unique_keys() {
            let mut map = serializer.serialize_map(Some(self.child_count()))?;
            for (key, child) in self.children() {
                map.serialize_entry(key, child)?;
            }
            return map.end();
        }
        let mut seq = serializer.serialize_seq(Some(self.child_count()))?;
        for (key, node) in self.children() {
            seq.serialize_element(&Entry { key, node })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for PropertyTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PropertyTree::try_from(value).map_err(D::Error::custom)
    }
}

impl TryFrom<Value> for PropertyTree {
    type Error = TreeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(PropertyTree::new()),
            Value::Bool(b) => Ok(PropertyTree::leaf(b.to_string())),
            Value::Number(n) => Ok(PropertyTree::leaf(n.to_string())),
            Value::String(s) => Ok(PropertyTree::leaf(s)),
            Value::Object(map) => {
                let mut tree = PropertyTree::new();
                for (key, child) in map {
                    tree.push_child(key, PropertyTree::try_from(child)?);
                }
                Ok(tree)
            }
            Value::Array(entries) => {
                let mut tree = PropertyTree::new();
                for entry in entries {
                    let map = match entry {
                        Value::Object(map) => map,
                        other => {
                            return Err(TreeError::Malformed {
                                details: format!("array entries must be objects, found {other}"),
                            })
                        }
                    };
                    for (key, child) in map {
                        tree.push_child(key, PropertyTree::try_from(child)?);
                    }
                }
                Ok(tree)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Text and file I/O
// ---------------------------------------------------------------------------

/// Render `tree` as a JSON document.
pub fn to_string(tree: &PropertyTree, settings: &WriteSettings) -> Result<String, TreeError> {
    let text = if settings.pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };
    Ok(text)
}

/// Parse a JSON document into a tree.
pub fn from_str(text: &str) -> Result<PropertyTree, TreeError> {
    let value: Value = serde_json::from_str(text)?;
    PropertyTree::try_from(value)
}

/// Write `tree` to `path`, replacing any existing file.
pub fn write_file(
    path: impl AsRef<Path>,
    tree: &PropertyTree,
    settings: &WriteSettings,
) -> Result<(), TreeError> {
    let path = path.as_ref();
    let text = to_string(tree, settings)?;
    std::fs::write(path, text).map_err(|source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), children = tree.child_count(), "wrote property tree");
    Ok(())
}

/// Read a tree previously written by [`write_file`] (or any document using
/// the layout described in the module docs).
pub fn read_file(path: impl AsRef<Path>) -> Result<PropertyTree, TreeError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = from_str(&text)?;
    tracing::debug!(path = %path.display(), children = tree.child_count(), "read property tree");
    Ok(tree)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
