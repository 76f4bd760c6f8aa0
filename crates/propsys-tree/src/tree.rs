//! The in-memory property tree.
//!
//! See the crate root for the path syntax. Lookups always resolve to the
//! *first* child with a matching key; [`PropertyTree::add_child`] and
//! [`PropertyTree::push_child`] are the only operations that create
//! duplicate keys.

use std::fmt;
use std::str::FromStr;

use crate::TreeError;

/// Splits a `.`-separated path into its keys. Empty segments are skipped, so
/// `""` yields nothing and addresses the node itself.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|key| !key.is_empty())
}

// ---------------------------------------------------------------------------
// PropertyTree
// ---------------------------------------------------------------------------

/// A node holding one data string and an ordered list of `(key, subtree)`
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTree {
    data: String,
    children: Vec<(String, PropertyTree)>,
}

impl PropertyTree {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a childless node holding `data`.
    pub fn leaf(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            children: Vec::new(),
        }
    }

    /// The raw data string of this node.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Replace the raw data string of this node.
    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    /// Store `value` at `path`, creating intermediate nodes as needed.
    ///
    /// If a node already exists at `path` its data is overwritten; no sibling
    /// is created. Returns the node that received the value.
    pub fn put<T: fmt::Display>(&mut self, path: &str, value: T) -> &mut PropertyTree {
        let node = self.walk_or_create(path);
        node.data = value.to_string();
        node
    }

    /// Read the data at `path` parsed as `T`.
    ///
    /// Fails with [`TreeError::NotFound`] when no node exists at `path` and
    /// with [`TreeError::BadData`] when the node has children or its data
    /// does not parse.
    pub fn get<T: FromStr>(&self, path: &str) -> Result<T, TreeError> {
        let node = self.get_child(path)?;
        if !node.is_leaf() {
            return Err(TreeError::BadData {
                path: path.to_owned(),
                value: format!("<node with {} children>", node.child_count()),
                expected: std::any::type_name::<T>(),
            });
        }
        node.data.parse::<T>().map_err(|_| TreeError::BadData {
            path: path.to_owned(),
            value: node.data.clone(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Attach `child` under `path`. The parent of the last key is created if
    /// missing; the last key itself is always appended, so attaching twice at
    /// the same path yields two siblings.
    pub fn add_child(&mut self, path: &str, child: PropertyTree) -> &mut PropertyTree {
        let (parent_path, key) = path.rsplit_once('.').unwrap_or(("", path));
        self.walk_or_create(parent_path).push_child(key, child)
    }

    /// Append `child` directly under this node with `key` taken verbatim
    /// (no path splitting).
    pub fn push_child(&mut self, key: impl Into<String>, child: PropertyTree) -> &mut PropertyTree {
        let index = self.children.len();
        self.children.push((key.into(), child));
        &mut self.children[index].1
    }

    /// The node at `path`, or [`TreeError::NotFound`].
    pub fn get_child(&self, path: &str) -> Result<&PropertyTree, TreeError> {
        self.find(path).ok_or_else(|| TreeError::NotFound {
            path: path.to_owned(),
        })
    }

    /// Mutable access to the node at `path`, or [`TreeError::NotFound`].
    pub fn get_child_mut(&mut self, path: &str) -> Result<&mut PropertyTree, TreeError> {
        let mut node = self;
        for key in segments(path) {
            node = match node.children.iter_mut().find(|(k, _)| k == key) {
                Some((_, child)) => child,
                None => {
                    return Err(TreeError::NotFound {
                        path: path.to_owned(),
                    })
                }
            };
        }
        Ok(node)
    }

    /// The node at `path`, if any.
    pub fn find(&self, path: &str) -> Option<&PropertyTree> {
        segments(path).try_fold(self, |node, key| {
            node.children
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, child)| child)
        })
    }

    /// Direct children as `(key, subtree)` pairs in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &PropertyTree)> {
        self.children
            .iter()
            .map(|(key, child)| (key.as_str(), child))
    }

    /// Direct children stored under `key`, in insertion order.
    pub fn children_named<'t>(&'t self, key: &'t str) -> impl Iterator<Item = &'t PropertyTree> {
        self.children
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, child)| child)
    }

    /// Number of direct children stored under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.children_named(key).count()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn walk_or_create(&mut self, path: &str) -> &mut PropertyTree {
        let mut node = self;
        for key in segments(path) {
            node = node.child_or_insert(key);
        }
        node
    }

    fn child_or_insert(&mut self, key: &str) -> &mut PropertyTree {
        let index = match self.children.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.children.push((key.to_owned(), PropertyTree::new()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
