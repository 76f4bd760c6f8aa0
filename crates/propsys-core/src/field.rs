//! Named, tagged handles onto an object's persisted members.
//!
//! A [`Field`] borrows exactly one member of its owner for the lifetime
//! `'a`, or holds a nested [`FieldCollection`] built from a sub-structure of
//! the owner. Its [`FieldTag`] is derived from what it holds, so the tag and
//! the target can never disagree. Typed access goes through
//! [`Field::get_value`] / [`Field::set_value`], which fail closed when the
//! requested type does not match the tag.
//!
//! [`Field::accept`] is the single dispatch point: it calls exactly one
//! [`FieldVisitor`] handler for the field's tag.

use std::borrow::Cow;

use crate::collection::FieldCollection;
use crate::object::Reflect;
use crate::vector::Vector3;
use crate::ReflectError;

// ---------------------------------------------------------------------------
// FieldTag
// ---------------------------------------------------------------------------

/// The closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    String,
    Int,
    UInt,
    Vector3,
    Collection,
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Target<'a> {
    String(&'a mut String),
    Int(&'a mut i32),
    UInt(&'a mut u32),
    Vector3(&'a mut Vector3),
    Collection(FieldCollection<'a>),
}

/// A named handle onto one member of an object.
///
/// The name is the key the field is persisted under. It must be non-empty,
/// and a scalar field must not share its name with a `Vector3` or
/// `Collection` field of the same collection; the tree visitors reject both
/// with [`ReflectError::InvalidFieldName`]. Dots in a name nest the value one
/// level deeper per segment.
#[derive(Debug)]
pub struct Field<'a> {
    name: Cow<'a, str>,
    target: Target<'a>,
}

impl<'a> Field<'a> {
    pub fn string(name: impl Into<Cow<'a, str>>, value: &'a mut String) -> Self {
        Self::with_target(name, Target::String(value))
    }

    pub fn int(name: impl Into<Cow<'a, str>>, value: &'a mut i32) -> Self {
        Self::with_target(name, Target::Int(value))
    }

    pub fn uint(name: impl Into<Cow<'a, str>>, value: &'a mut u32) -> Self {
        Self::with_target(name, Target::UInt(value))
    }

    pub fn vector3(name: impl Into<Cow<'a, str>>, value: &'a mut Vector3) -> Self {
        Self::with_target(name, Target::Vector3(value))
    }

    /// A [`FieldTag::Collection`] field holding `fields`.
    pub fn collection(name: impl Into<Cow<'a, str>>, fields: FieldCollection<'a>) -> Self {
        Self::with_target(name, Target::Collection(fields))
    }

    /// A [`FieldTag::Collection`] field over the fields of a reflected
    /// sub-structure.
    pub fn reflect<R: Reflect + ?Sized>(name: impl Into<Cow<'a, str>>, value: &'a mut R) -> Self {
        Self::collection(name, value.fields())
    }

    fn with_target(name: impl Into<Cow<'a, str>>, target: Target<'a>) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tree key this field is stored under.
    ///
    /// An empty name would address the parent node itself, so it is refused
    /// with [`ReflectError::InvalidFieldName`].
    pub(crate) fn key(&self) -> Result<&str, ReflectError> {
        if self.name.is_empty() {
            return Err(ReflectError::InvalidFieldName {
                field: String::new(),
                reason: "name is empty",
            });
        }
        Ok(&self.name)
    }

    pub fn tag(&self) -> FieldTag {
        match self.target {
            Target::String(_) => FieldTag::String,
            Target::Int(_) => FieldTag::Int,
            Target::UInt(_) => FieldTag::UInt,
            Target::Vector3(_) => FieldTag::Vector3,
            Target::Collection(_) => FieldTag::Collection,
        }
    }

    /// Read the current value as `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the field's tag. Use
    /// [`try_get_value`](Self::try_get_value) to get a
    /// [`ReflectError::TagMismatch`] instead.
    pub fn get_value<T: FieldKind>(&self) -> T {
        match self.try_get_value() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_get_value<T: FieldKind>(&self) -> Result<T, ReflectError> {
        T::extract(self).ok_or_else(|| self.mismatch(T::TAG))
    }

    /// Write `value` through to the borrowed member.
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the field's tag.
    pub fn set_value<T: FieldKind>(&mut self, value: T) {
        if let Err(err) = self.try_set_value(value) {
            panic!("{err}");
        }
    }

    pub fn try_set_value<T: FieldKind>(&mut self, value: T) -> Result<(), ReflectError> {
        if T::store(self, value) {
            Ok(())
        } else {
            Err(self.mismatch(T::TAG))
        }
    }

    /// The nested collection of a [`FieldTag::Collection`] field.
    ///
    /// # Panics
    ///
    /// Panics if the field is not a collection.
    pub fn nested(&self) -> &FieldCollection<'a> {
        match self.try_nested() {
            Ok(fields) => fields,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_nested(&self) -> Result<&FieldCollection<'a>, ReflectError> {
        match &self.target {
            Target::Collection(fields) => Ok(fields),
            _ => Err(self.mismatch(FieldTag::Collection)),
        }
    }

    pub fn try_nested_mut(&mut self) -> Result<&mut FieldCollection<'a>, ReflectError> {
        let actual = self.tag();
        match &mut self.target {
            Target::Collection(fields) => Ok(fields),
            _ => Err(ReflectError::TagMismatch {
                field: self.name.to_string(),
                expected: FieldTag::Collection,
                actual,
            }),
        }
    }

    /// Rebind a [`FieldTag::Collection`] field to a different collection.
    ///
    /// # Panics
    ///
    /// Panics if the field is not a collection.
    pub fn set_nested(&mut self, fields: FieldCollection<'a>) {
        if let Err(err) = self.try_set_nested(fields) {
            panic!("{err}");
        }
    }

    pub fn try_set_nested(&mut self, fields: FieldCollection<'a>) -> Result<(), ReflectError> {
        match &mut self.target {
            Target::Collection(slot) => {
                *slot = fields;
                Ok(())
            }
            _ => Err(self.mismatch(FieldTag::Collection)),
        }
    }

    /// Call the one handler of `visitor` that matches this field's tag.
    pub fn accept<V: FieldVisitor + ?Sized>(&mut self, visitor: &mut V) -> Result<(), ReflectError> {
        match self.tag() {
            FieldTag::String => visitor.visit_string(self),
            FieldTag::Int => visitor.visit_int(self),
            FieldTag::UInt => visitor.visit_uint(self),
            FieldTag::Vector3 => visitor.visit_vector3(self),
            FieldTag::Collection => visitor.visit_collection(self),
        }
    }

    fn mismatch(&self, expected: FieldTag) -> ReflectError {
        ReflectError::TagMismatch {
            field: self.name.to_string(),
            expected,
            actual: self.tag(),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
}

/// A scalar type a [`Field`] can hold: `String`, `i32`, `u32` or
/// [`Vector3`]. Sealed; the set of kinds is closed.
pub trait FieldKind: sealed::Sealed + Sized {
    /// The tag of fields holding this type.
    const TAG: FieldTag;

    #[doc(hidden)]
    fn extract(field: &Field<'_>) -> Option<Self>;

    #[doc(hidden)]
    fn store(field: &mut Field<'_>, value: Self) -> bool;
}

macro_rules! impl_field_kind {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl FieldKind for $ty {
            const TAG: FieldTag = FieldTag::$variant;

            fn extract(field: &Field<'_>) -> Option<Self> {
                match &field.target {
                    Target::$variant(value) => Some((**value).clone()),
                    _ => None,
                }
            }

            fn store(field: &mut Field<'_>, value: Self) -> bool {
                match &mut field.target {
                    Target::$variant(slot) => {
                        **slot = value;
                        true
                    }
                    _ => false,
                }
            }
        }
    };
}

impl_field_kind!(String, String);
impl_field_kind!(i32, Int);
impl_field_kind!(u32, UInt);
impl_field_kind!(Vector3, Vector3);

// ---------------------------------------------------------------------------
// FieldVisitor
// ---------------------------------------------------------------------------

/// One handler per [`FieldTag`]. Implemented by
/// [`TreeWriter`](crate::TreeWriter) and [`TreeReader`](crate::TreeReader).
pub trait FieldVisitor {
    fn visit_string(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError>;
    fn visit_int(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError>;
    fn visit_uint(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError>;
    fn visit_vector3(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError>;
    fn visit_collection(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
