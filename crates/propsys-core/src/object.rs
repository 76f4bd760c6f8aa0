//! Object identity and the traits persisted objects implement.
//!
//! - [`Reflect`]: anything that can describe itself as a [`FieldCollection`].
//!   Sub-structures implement it so they can be nested with
//!   [`Field::reflect`](crate::Field::reflect).
//! - [`Object`]: a reflected value with an [`ObjectId`] and a type name,
//!   owned by an [`ObjectSystem`](crate::ObjectSystem).
//! - [`ObjectType`]: the static side of an object type (its persisted type
//!   name and blank constructor), used to register factories and for typed
//!   creation.
//!
//! Fields are built on demand by [`Reflect::fields`] and borrow the value
//! they describe, so they cannot outlive it.

use std::any::Any;
use std::fmt;

use crate::collection::FieldCollection;

// ---------------------------------------------------------------------------
// ObjectId
// ---------------------------------------------------------------------------

/// Numeric identity of an object. Persisted as a `UInt` field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId(pub u32);

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A value that exposes its persisted state as an ordered field list.
pub trait Reflect {
    /// Build the field list. Registration order is serialization order.
    fn fields(&mut self) -> FieldCollection<'_>;
}

/// Upcasts to [`Any`] for typed access to boxed objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A persisted object owned by an [`ObjectSystem`](crate::ObjectSystem).
///
/// By convention the first field an object registers is its own `id`
/// (a `UInt` named `"id"`), so the identity is saved and restored with the
/// rest of its state.
pub trait Object: Reflect + AsAny {
    /// The persisted type name; the key used to find this object's factory
    /// on load.
    fn type_name(&self) -> &str;

    fn id(&self) -> ObjectId;
}

/// The static side of an object type.
pub trait ObjectType: Object + Sized {
    /// Persisted type name. Must match what [`Object::type_name`] returns.
    const TYPE_NAME: &'static str;

    /// Construct a blank object carrying `id`.
    fn construct(id: ObjectId) -> Self;
}

impl dyn Object {
    /// Whether the boxed object is a `T`.
    pub fn is<T: Object>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
