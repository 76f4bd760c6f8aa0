//! Deserialize fields from a [`PropertyTree`].

use std::str::FromStr;

use propsys_tree::{PropertyTree, TreeError};

use crate::field::{Field, FieldVisitor};
use crate::vector::Vector3;
use crate::ReflectError;

/// Reads each visited field from the node stored under its name and writes
/// the value through the field.
///
/// The first failure aborts the drain: fields after it are left untouched
/// and the error is returned to the caller. Error paths are reported
/// relative to the node the outermost reader was created on, e.g.
/// `Stats.Origin.x`.
pub struct TreeReader<'t> {
    node: &'t PropertyTree,
    scope: String,
}

impl<'t> TreeReader<'t> {
    pub fn new(node: &'t PropertyTree) -> Self {
        Self {
            node,
            scope: String::new(),
        }
    }

    fn nested(node: &'t PropertyTree, scope: String) -> Self {
        Self { node, scope }
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

    fn scoped(&self, name: &str) -> String {
        if self.scope.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{name}", self.scope)
        }
    }

    fn lift(&self, name: &str, err: TreeError) -> ReflectError {
        match err {
            TreeError::NotFound { .. } => ReflectError::MissingField {
                path: self.scoped(name),
            },
            TreeError::BadData {
                value, expected, ..
            } => ReflectError::TypeMismatch {
                path: self.scoped(name),
                value,
                expected,
            },
            other => ReflectError::Store(other),
        }
    }

    fn read<T: FromStr>(&self, name: &str) -> Result<T, ReflectError> {
        self.node.get::<T>(name).map_err(|err| self.lift(name, err))
    }

    fn child(&self, name: &str) -> Result<TreeReader<'t>, ReflectError> {
        let node = self.node.get_child(name).map_err(|err| self.lift(name, err))?;
        Ok(TreeReader::nested(node, self.scoped(name)))
    }
}

impl FieldVisitor for TreeReader<'_> {
    fn visit_string(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: String = self.read(field.key()?)?;
        field.try_set_value(value)
    }

    fn visit_int(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: i32 = self.read(field.key()?)?;
        field.try_set_value(value)
    }

    fn visit_uint(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let value: u32 = self.read(field.key()?)?;
        field.try_set_value(value)
    }

    fn visit_vector3(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let child = self.child(field.key()?)?;
        let value = Vector3::new(child.read("x")?, child.read("y")?, child.read("z")?);
        field.try_set_value(value)
    }

    fn visit_collection(&mut self, field: &mut Field<'_>) -> Result<(), ReflectError> {
        let mut child = self.child(field.key()?)?;
        child.drain(field.try_nested_mut()?)
    }
}
