//! Serialize fields into a [`PropertyTree`].

use propsys_tree::PropertyTree;

use crate::field::{Field, FieldVisitor};
use crate::vector::Vector3;
use crate::ReflectError;

/// Writes each visited field under its name in a destination node.
///
/// - `String`, `Int`, `UInt`: one leaf via [`PropertyTree::put`].
/// - `Vector3`: a child with leaves `x`, `y`, `z`, attached with
///   [`PropertyTree::add_child`] (so repeated names become siblings).
/// - `Collection`: a child filled by a nested writer, attached the same way.
pub struct TreeWriter<'t> {
    node: &'t mut PropertyTree,
}

impl<'t> TreeWriter<'t> {
    pub fn new(node: &'t mut PropertyTree) -> Self {
        Self { node }
    }

    /// Visit every field yielded by `fields`, in order.
    pub fn drain<'c, 'a: 'c, I>(&mut self, fields: I) -> Result<(), ReflectError>
    where
        I: IntoIterator<Item = &'c mut Field<'a>>,
    {
        for field in fields {
            field.accept(self)?;
        }
        Ok(())
    }

    fn put_scalar<T: std::fmt::Display>(
        &mut self,
        field: &Field<'_>,
        value: T,
    ) -> Result<(), ReflectError> {
        let key = field.key()?;
        if self.node.find(key).is_some_and(|existing| !existing.is_leaf()) {
            return Err(ReflectError::InvalidFieldName {
                field: key.to_owned(),
                reason: "a nested value is already stored under this name",
            });
        }
        self.node.put(key, value);
        Ok(())
    }
}

impl FieldVisitor for TreeWriter<'_> {
    fn visit_string(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: String = field.try_get_value()?;
        self.put_scalar(field, value)
    }

    fn visit_int(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: i32 = field.try_get_value()?;
        self.put_scalar(field, value)
    }

    fn visit_uint(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: u32 = field.try_get_value()?;
        self.put_scalar(field, value)
    }

    fn visit_vector3(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: Vector3 = field.try_get_value()?;
        let key = field.key()?;
        let mut child = PropertyTree::new();
        child.put("x", value.x);
        child.put("y", value.y);
        child.put("z", value.z);
        self.node.add_child(key, child);
        Ok(())
    }

    fn visit_collection(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let key = field.key()?.to_owned();
        let mut child = PropertyTree::new();
        TreeWriter::new(&mut child).drain(field.try_nested_mut()?)?;
        self.node.add_child(&key, child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::FieldCollection;

    #[test]
    fn scalars_become_leaves() {
        let mut id = 3_u32;
        let mut name = "Termogoyf".to_owned();
        let mut health = -20;
        let mut fields = FieldCollection::new()
            .with(Field::uint("id", &mut id))
            .with(Field::string("Name", &mut name))
            .with(Field::int("Health", &mut health));

        let mut node = PropertyTree::new();
        TreeWriter::new(&mut node).drain(&mut fields).unwrap();

        assert_eq!(node.get::<u32>("id").unwrap(), 3);
        assert_eq!(node.get::<String>("Name").unwrap(), "Termogoyf");
        assert_eq!(node.get::<i32>("Health").unwrap(), -20);
        let keys: Vec<&str> = node.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "Name", "Health"]);
    }

    #[test]
    fn vector_becomes_xyz_child() {
        let mut pos = Vector3::new(100.0, 50.0, 0.0);
        let mut fields = FieldCollection::new().with(Field::vector3("Position", &mut pos));

        let mut node = PropertyTree::new();
        TreeWriter::new(&mut node).drain(fields.iter_mut()).unwrap();

        let child = node.get_child("Position").unwrap();
        let keys: Vec<&str> = child.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
        assert_eq!(node.get::<f32>("Position.x").unwrap(), 100.0);
        assert_eq!(node.get::<f32>("Position.y").unwrap(), 50.0);
        assert_eq!(node.get::<f32>("Position.z").unwrap(), 0.0);
    }

    #[test]
    fn collection_recurses() {
        let mut armor = 7_u32;
        let mut title = "Warden".to_owned();
        let mut origin = Vector3::new(1.0, 2.0, 3.0);
        let inner = FieldCollection::new()
            .with(Field::uint("Armor", &mut armor))
            .with(Field::vector3("Origin", &mut origin));
        let mut fields = FieldCollection::new()
            .with(Field::string("Title", &mut title))
            .with(Field::collection("Stats", inner));

        let mut node = PropertyTree::new();
        TreeWriter::new(&mut node).drain(&mut fields).unwrap();

        assert_eq!(node.get::<u32>("Stats.Armor").unwrap(), 7);
        assert_eq!(node.get::<f32>("Stats.Origin.z").unwrap(), 3.0);
    }

    #[test]
    fn repeated_vector_names_become_siblings() {
        let mut a = Vector3::new(1.0, 0.0, 0.0);
        let mut b = Vector3::new(2.0, 0.0, 0.0);
        let mut fields = FieldCollection::new()
            .with(Field::vector3("Waypoint", &mut a))
            .with(Field::vector3("Waypoint", &mut b));

        let mut node = PropertyTree::new();
        TreeWriter::new(&mut node).drain(&mut fields).unwrap();

        assert_eq!(node.count("Waypoint"), 2);
        let xs: Vec<f32> = node
            .children_named("Waypoint")
            .map(|c| c.get::<f32>("x").unwrap())
            .collect();
        assert_eq!(xs, vec![1.0, 2.0]);
    }

    #[test]
    fn empty_name_is_refused() {
        let mut health = 1;
        let mut pos = Vector3::ZERO;
        for mut field in [Field::int("", &mut health), Field::vector3("", &mut pos)] {
            let mut node = PropertyTree::new();
            match field.accept(&mut TreeWriter::new(&mut node)) {
                Err(ReflectError::InvalidFieldName { field, .. }) => assert_eq!(field, ""),
                other => panic!("expected InvalidFieldName, got {other:?}"),
            }
            assert_eq!(node, PropertyTree::new());
        }
    }

    #[test]
    fn scalar_cannot_land_on_a_nested_value() {
        let mut pos = Vector3::new(1.0, 2.0, 3.0);
        let mut label = "north".to_owned();
        let mut fields = FieldCollection::new()
            .with(Field::vector3("Spot", &mut pos))
            .with(Field::string("Spot", &mut label));

        let mut node = PropertyTree::new();
        match TreeWriter::new(&mut node).drain(&mut fields) {
            Err(ReflectError::InvalidFieldName { field, .. }) => assert_eq!(field, "Spot"),
            other => panic!("expected InvalidFieldName, got {other:?}"),
        }
        assert_eq!(node.get_child("Spot").unwrap().data(), "");
    }

    #[test]
    fn writing_does_not_modify_fields() {
        let mut health = 42;
        let mut fields = FieldCollection::new().with(Field::int("Health", &mut health));
        let mut node = PropertyTree::new();
        TreeWriter::new(&mut node).drain(&mut fields).unwrap();
        drop(fields);
        assert_eq!(health, 42);
    }
}
