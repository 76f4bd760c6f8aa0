//! Propsys Core -- reflected fields, tree visitors, and an object registry.
//!
//! Objects describe their persisted state as a [`FieldCollection`]: an
//! ordered list of named, tagged [`Field`]s that borrow the object's own
//! members. Two visitors walk that list against a
//! [`PropertyTree`](propsys_tree::PropertyTree): [`TreeWriter`] copies field
//! values into the tree, [`TreeReader`] copies them back. The
//! [`ObjectSystem`] owns the live objects, creates them through named
//! factories, and saves or loads the whole population at once.
//!
//! # Quick Start
//!
//! ```
//! use propsys_core::prelude::*;
//! use propsys_core::actors::Actor;
//!
//! let mut objects = ObjectSystem::new();
//! objects.register_type::<Actor>().unwrap();
//!
//! let actor = objects.create::<Actor>().unwrap();
//! actor.name = "Termogoyf".to_owned();
//! actor.health = 100;
//! actor.position = Vector3::new(100.0, 50.0, 0.0);
//!
//! let tree = objects.save_tree().unwrap();
//!
//! let mut restored = ObjectSystem::new();
//! restored.register_type::<Actor>().unwrap();
//! assert_eq!(restored.load_tree(&tree).unwrap(), 1);
//!
//! let id = restored.ids()[0];
//! let actor = restored.get::<Actor>(id).unwrap();
//! assert_eq!(actor.name, "Termogoyf");
//! assert_eq!(actor.health, 100);
//! assert_eq!(actor.position, Vector3::new(100.0, 50.0, 0.0));
//! ```

#![deny(unsafe_code)]

pub mod actors;
pub mod collection;
pub mod field;
pub mod object;
pub mod reader;
pub mod system;
pub mod vector;
pub mod writer;

pub use collection::FieldCollection;
pub use field::{Field, FieldKind, FieldTag, FieldVisitor};
pub use object::{Object, ObjectId, ObjectType, Reflect};
pub use reader::TreeReader;
pub use system::{Factory, ObjectSystem};
pub use vector::Vector3;
pub use writer::TreeWriter;

use propsys_tree::TreeError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by field access, tree visitors, and the object system.
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    /// A field expected on load is absent from the tree.
    #[error("field '{path}' is missing from the persisted tree")]
    MissingField { path: String },

    /// A field is present on load but its value has the wrong shape.
    #[error("field '{path}' holds '{value}', which cannot be read as {expected}")]
    TypeMismatch {
        path: String,
        value: String,
        expected: &'static str,
    },

    /// A factory was registered twice under the same type name.
    #[error("a factory for type '{type_name}' is already registered")]
    DuplicateType { type_name: String },

    /// The object is not (or no longer) registered.
    #[error("object {id} is not registered")]
    ObjectNotFound { id: ObjectId },

    /// A field was accessed as a kind other than its tag.
    #[error("field '{field}' is tagged {actual:?} but was accessed as {expected:?}")]
    TagMismatch {
        field: String,
        expected: FieldTag,
        actual: FieldTag,
    },

    /// A loaded object carries an ID that is already in use.
    #[error("loaded object id {id} is already in use")]
    DuplicateId { id: ObjectId },

    /// A field name that cannot be persisted faithfully.
    #[error("field '{field}' cannot be persisted: {reason}")]
    InvalidFieldName { field: String, reason: &'static str },

    /// Every `u32` object ID has already been issued or loaded.
    #[error("object id space is exhausted")]
    IdSpaceExhausted,

    /// The backing tree store failed (file I/O or document parsing).
    #[error(transparent)]
    Store(#[from] TreeError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::collection::FieldCollection;
    pub use crate::field::{Field, FieldKind, FieldTag, FieldVisitor};
    pub use crate::object::{Object, ObjectId, ObjectType, Reflect};
    pub use crate::reader::TreeReader;
    pub use crate::system::{Factory, ObjectSystem};
    pub use crate::vector::Vector3;
    pub use crate::writer::TreeWriter;
    pub use crate::ReflectError;
    pub use propsys_tree::{PropertyTree, WriteSettings};
}
