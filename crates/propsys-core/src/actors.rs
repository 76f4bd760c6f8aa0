//! Ready-made object types.
//!
//! [`Actor`] is the classic named, positioned object with health. [`Beacon`]
//! carries a nested [`Marker`] sub-structure, persisted as a collection field.

use crate::collection::FieldCollection;
use crate::field::Field;
use crate::object::{Object, ObjectId, ObjectType, Reflect};
use crate::vector::Vector3;

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Persisted as `id`, `Name`, `Health`, `Position`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Actor {
    pub id: ObjectId,
    pub name: String,
    pub health: i32,
    pub position: Vector3,
}

impl Reflect for Actor {
    fn fields(&mut self) -> FieldCollection<'_> {
        FieldCollection::new()
            .with(Field::uint("id", &mut self.id.0))
            .with(Field::string("Name", &mut self.name))
            .with(Field::int("Health", &mut self.health))
            .with(Field::vector3("Position", &mut self.position))
    }
}

impl Object for Actor {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl ObjectType for Actor {
    const TYPE_NAME: &'static str = "Actor";

    fn construct(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Beacon
// ---------------------------------------------------------------------------

/// Display settings of a [`Beacon`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marker {
    pub color: u32,
    pub radius: i32,
    pub caption: String,
}

impl Reflect for Marker {
    fn fields(&mut self) -> FieldCollection<'_> {
        FieldCollection::new()
            .with(Field::uint("Color", &mut self.color))
            .with(Field::int("Radius", &mut self.radius))
            .with(Field::string("Caption", &mut self.caption))
    }
}

/// Persisted as `id`, `Label`, `Origin`, and a nested `Marker` collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Beacon {
    pub id: ObjectId,
    pub label: String,
    pub origin: Vector3,
    pub marker: Marker,
}

impl Reflect for Beacon {
    fn fields(&mut self) -> FieldCollection<'_> {
        FieldCollection::new()
            .with(Field::uint("id", &mut self.id.0))
            .with(Field::string("Label", &mut self.label))
            .with(Field::vector3("Origin", &mut self.origin))
            .with(Field::reflect("Marker", &mut self.marker))
    }
}

impl Object for Beacon {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl ObjectType for Beacon {
    const TYPE_NAME: &'static str = "Beacon";

    fn construct(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
