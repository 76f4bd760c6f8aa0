//! Ordered collections of [`Field`]s.
//!
//! Registration order is serialization order. Iterators are created fresh on
//! every call, so a collection can be walked any number of times.

use crate::field::Field;

/// An ordered, owned list of fields borrowing from one owner.
#[derive(Debug, Default)]
pub struct FieldCollection<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> FieldCollection<'a> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append `field`. Names are not deduplicated.
    pub fn register(&mut self, field: Field<'a>) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, field: Field<'a>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<'a>> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Field<'a>> {
        self.fields.iter_mut()
    }

    /// The first field registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Field<'a>> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field<'a>> {
        self.fields.iter_mut().find(|field| field.name() == name)
    }

    /// Field names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'c, 'a> IntoIterator for &'c FieldCollection<'a> {
    type Item = &'c Field<'a>;
    type IntoIter = std::slice::Iter<'c, Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'c, 'a> IntoIterator for &'c mut FieldCollection<'a> {
    type Item = &'c mut Field<'a>;
    type IntoIter = std::slice::IterMut<'c, Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a> Extend<Field<'a>> for FieldCollection<'a> {
    fn extend<I: IntoIterator<Item = Field<'a>>>(&mut self, iter: I) {
        self.fields.extend(iter);
    }
}

impl<'a> FromIterator<Field<'a>> for FieldCollection<'a> {
    fn from_iter<I: IntoIterator<Item = Field<'a>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
