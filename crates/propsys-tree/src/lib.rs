//! Propsys Tree -- a path-addressable property tree with file persistence.
//!
//! A [`PropertyTree`] node holds one string of data and an ordered list of
//! keyed children. Keys may repeat: attaching a subtree under a key that is
//! already present adds a sibling instead of replacing it. Scalars are stored
//! in their `Display` form and parsed back with `FromStr`.
//!
//! Paths are `.`-separated key sequences relative to the node they are
//! resolved against; the empty path addresses the node itself.
//!
//! # Quick Start
//!
//! ```
//! use propsys_tree::prelude::*;
//!
//! let mut position = PropertyTree::new();
//! position.put("x", 1.5_f32);
//! position.put("y", 0.0_f32);
//!
//! let mut actor = PropertyTree::new();
//! actor.put("Name", "Termogoyf");
//! actor.put("Health", 100);
//! actor.add_child("Position", position);
//!
//! assert_eq!(actor.get::<i32>("Health").unwrap(), 100);
//! assert_eq!(actor.get::<f32>("Position.x").unwrap(), 1.5);
//!
//! let text = to_string(&actor, &WriteSettings::default()).unwrap();
//! assert_eq!(from_str(&text).unwrap(), actor);
//! ```

#![deny(unsafe_code)]

pub mod persist;
pub mod tree;

use std::path::PathBuf;

pub use persist::{from_str, read_file, to_string, write_file, WriteSettings};
pub use tree::PropertyTree;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by tree lookups and tree persistence.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// No node exists at the requested path.
    #[error("no node at path '{path}'")]
    NotFound { path: String },

    /// A node exists but its data cannot be parsed as the requested type.
    #[error("value '{value}' at path '{path}' cannot be read as {expected}")]
    BadData {
        path: String,
        value: String,
        expected: &'static str,
    },

    /// A parsed document does not describe a tree.
    #[error("malformed tree document: {details}")]
    Malformed { details: String },

    /// Reading or writing a tree file failed.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document text is not valid JSON.
    #[error("failed to parse tree document: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::persist::{from_str, read_file, to_string, write_file, WriteSettings};
    pub use crate::tree::PropertyTree;
    pub use crate::TreeError;
}
