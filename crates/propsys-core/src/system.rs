//! The object registry: factories, live objects, and whole-population
//! save/load.
//!
//! An [`ObjectSystem`] owns every object it creates. Objects are created
//! through factories registered under their persisted type name and receive
//! IDs from a monotonic counter that never hands out the same value twice,
//! even after [`ObjectSystem::delete`]. Once `u32::MAX` has been issued (or
//! loaded) the counter is exhausted: creation returns `None` and loading fails
//! with [`ReflectError::IdSpaceExhausted`].
//!
//! # Persisted layout
//!
//! [`ObjectSystem::save_tree`] produces a root with one child per live object
//! (in ascending ID order), keyed by the object's type name. Objects of the
//! same type become repeated siblings. Each child holds the object's fields,
//! written by a [`TreeWriter`].
//!
//! # Loading
//!
//! [`ObjectSystem::load_tree`] walks the root's children in document order.
//! A child whose key has no factory is skipped with a warning. Otherwise a
//! blank object is constructed with a freshly reserved ID, filled by a
//! [`TreeReader`], and, if it registers an `id` field, takes the persisted ID.
//! Loading is all-or-nothing: on any error no object is added and the ID
//! counter is left as it was.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use propsys_tree::{PropertyTree, WriteSettings};

use crate::object::{Object, ObjectId, ObjectType};
use crate::reader::TreeReader;
use crate::writer::TreeWriter;
use crate::ReflectError;

/// Hand out the ID `next_id` points at and advance it.
fn reserve_id(next_id: &mut u64) -> Result<ObjectId, ReflectError> {
    let id = u32::try_from(*next_id).map_err(|_| ReflectError::IdSpaceExhausted)?;
    *next_id += 1;
    Ok(ObjectId(id))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

type Constructor = Box<dyn Fn(ObjectId) -> Box<dyn Object>>;

/// A named constructor producing blank objects of one type.
pub struct Factory {
    type_name: String,
    construct: Constructor,
}

impl Factory {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Build a blank object carrying `id`.
    pub fn construct(&self, id: ObjectId) -> Box<dyn Object> {
        (self.construct)(id)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ObjectSystem
// ---------------------------------------------------------------------------

/// Owner of all live objects, the factory table, and the ID counter.
pub struct ObjectSystem {
    objects: BTreeMap<ObjectId, Box<dyn Object>>,
    factories: HashMap<String, Factory>,
    /// Next ID to issue; past `u32::MAX` once every ID has been used.
    next_id: u64,
    settings: WriteSettings,
}

impl ObjectSystem {
    /// Create an empty system that writes files with default settings.
    pub fn new() -> Self {
        Self::with_settings(WriteSettings::default())
    }

    pub fn with_settings(settings: WriteSettings) -> Self {
        Self {
            objects: BTreeMap::new(),
            factories: HashMap::new(),
            next_id: 0,
            settings,
        }
    }

    // -- factories ----------------------------------------------------------

    /// Register `construct` as the factory for `type_name`.
    ///
    /// Fails with [`ReflectError::DuplicateType`] if the name is taken; the
    /// existing factory is kept.
    pub fn register_factory<F>(
        &mut self,
        type_name: impl Into<String>,
        construct: F,
    ) -> Result<(), ReflectError>
    where
        F: Fn(ObjectId) -> Box<dyn Object> + 'static,
    {
        let type_name = type_name.into();
        if self.factories.contains_key(&type_name) {
            return Err(ReflectError::DuplicateType { type_name });
        }
        tracing::debug!(type_name = %type_name, "registered object factory");
        self.factories.insert(
            type_name.clone(),
            Factory {
                type_name,
                construct: Box::new(construct),
            },
        );
        Ok(())
    }

    /// Register the factory for `T` under [`ObjectType::TYPE_NAME`].
    pub fn register_type<T: ObjectType>(&mut self) -> Result<(), ReflectError> {
        self.register_factory(T::TYPE_NAME, |id| Box::new(T::construct(id)) as Box<dyn Object>)
    }

    pub fn factory(&self, type_name: &str) -> Option<&Factory> {
        self.factories.get(type_name)
    }

    /// Registered type names, sorted.
    pub fn factory_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    // -- lifecycle ----------------------------------------------------------

    /// Create a `T` through the factory registered under `T::TYPE_NAME`.
    ///
    /// Returns `None` when no such factory exists, when the factory does not
    /// produce a `T`, or when the ID space is exhausted; no ID is consumed in
    /// any of these cases.
    pub fn create<T: ObjectType>(&mut self) -> Option<&mut T> {
        let factory = self.factories.get(T::TYPE_NAME)?;
        let id = self.peek_id(T::TYPE_NAME)?;
        let object = factory.construct(id);
        if !object.is::<T>() {
            tracing::warn!(
                type_name = T::TYPE_NAME,
                "factory produced an object of a different type -- not created"
            );
            return None;
        }
        self.insert_created(id, object)?.downcast_mut::<T>()
    }

    /// Create an object through the factory registered under `type_name`.
    /// Returns `None` when no such factory exists or the ID space is
    /// exhausted.
    pub fn create_by_name(&mut self, type_name: &str) -> Option<ObjectId> {
        let factory = self.factories.get(type_name)?;
        let id = self.peek_id(type_name)?;
        let object = factory.construct(id);
        self.insert_created(id, object)?;
        Some(id)
    }

    fn peek_id(&self, type_name: &str) -> Option<ObjectId> {
        let mut next_id = self.next_id;
        match reserve_id(&mut next_id) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(type_name, error = %err, "object not created");
                None
            }
        }
    }

    fn insert_created(
        &mut self,
        id: ObjectId,
        object: Box<dyn Object>,
    ) -> Option<&mut (dyn Object + 'static)> {
        match self.objects.entry(id) {
            Entry::Vacant(slot) => {
                self.next_id = u64::from(id.0) + 1;
                tracing::debug!(id = %id, type_name = object.type_name(), "created object");
                Some(slot.insert(object).as_mut())
            }
            Entry::Occupied(_) => {
                tracing::warn!(id = %id, type_name = object.type_name(), "id already live -- not created");
                None
            }
        }
    }

    /// Remove the object registered under `id` and hand it back.
    ///
    /// Fails with [`ReflectError::ObjectNotFound`] if `id` is not live. The
    /// ID is never reissued.
    pub fn delete(&mut self, id: ObjectId) -> Result<Box<dyn Object>, ReflectError> {
        let object = self
            .objects
            .remove(&id)
            .ok_or(ReflectError::ObjectNotFound { id })?;
        tracing::debug!(id = %id, type_name = object.type_name(), "deleted object");
        Ok(object)
    }

    // -- queries ------------------------------------------------------------

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get_dyn(&self, id: ObjectId) -> Option<&(dyn Object + 'static)> {
        self.objects.get(&id).map(|object| object.as_ref())
    }

    pub fn get_dyn_mut(&mut self, id: ObjectId) -> Option<&mut (dyn Object + 'static)> {
        self.objects.get_mut(&id).map(|object| object.as_mut())
    }

    /// The object under `id`, if it is live and a `T`.
    pub fn get<T: Object>(&self, id: ObjectId) -> Option<&T> {
        self.get_dyn(id)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Object>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.get_dyn_mut(id)?.downcast_mut::<T>()
    }

    /// Live object IDs in ascending order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    /// IDs of live objects whose type name is `type_name`, ascending.
    pub fn ids_of_type(&self, type_name: &str) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, object)| object.type_name() == type_name)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Live objects in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Object + 'static)> {
        self.objects.values().map(|object| object.as_ref())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The ID the next created object will receive, or `None` once the ID
    /// space is exhausted.
    pub fn next_id(&self) -> Option<ObjectId> {
        u32::try_from(self.next_id).ok().map(ObjectId)
    }

    // -- persistence --------------------------------------------------------

    /// Serialize every live object into a fresh root node.
    ///
    /// Takes `&mut self` because [`Reflect::fields`](crate::Reflect::fields)
    /// borrows each object mutably to build its field list. The writer only
    /// reads through those fields; no object is modified.
    pub fn save_tree(&mut self) -> Result<PropertyTree, ReflectError> {
        let mut root = PropertyTree::new();
        for object in self.objects.values_mut() {
            let type_name = object.type_name().to_owned();
            let mut node = PropertyTree::new();
            TreeWriter::new(&mut node).drain(&mut object.fields())?;
            root.push_child(type_name, node);
        }
        tracing::debug!(objects = self.objects.len(), "saved object tree");
        Ok(root)
    }

    /// [`save_tree`](Self::save_tree), then write the result to `path`.
    pub fn save_all(&mut self, path: impl AsRef<Path>) -> Result<(), ReflectError> {
        let root = self.save_tree()?;
        propsys_tree::write_file(path, &root, &self.settings)?;
        Ok(())
    }

    /// Materialize one object per recognised child of `root`.
    ///
    /// Returns the number of objects added. Every recognised child reserves
    /// an ID before its persisted `id` is restored, so a load fails with
    /// [`ReflectError::IdSpaceExhausted`] once `u32::MAX` has been issued or
    /// loaded.
    pub fn load_tree(&mut self, root: &PropertyTree) -> Result<usize, ReflectError> {
        let mut staged: BTreeMap<ObjectId, Box<dyn Object>> = BTreeMap::new();
        let mut next_id = self.next_id;

        for (type_name, node) in root.children() {
            let Some(factory) = self.factories.get(type_name) else {
                tracing::warn!(type_name, "no factory registered for persisted type -- skipping");
                continue;
            };

            let mut object = factory.construct(reserve_id(&mut next_id)?);
            if let Err(err) = TreeReader::new(node).drain(&mut object.fields()) {
                tracing::warn!(type_name, error = %err, "failed to load object");
                return Err(err);
            }

            let id = object.id();
            if self.objects.contains_key(&id) || staged.contains_key(&id) {
                return Err(ReflectError::DuplicateId { id });
            }
            next_id = next_id.max(u64::from(id.0) + 1);
            staged.insert(id, object);
        }

        let loaded = staged.len();
        self.objects.extend(staged);
        self.next_id = next_id;
        tracing::debug!(loaded, total = self.objects.len(), "loaded object tree");
        Ok(loaded)
    }

    /// Read the tree stored at `path` and [`load_tree`](Self::load_tree) it.
    pub fn load_all(&mut self, path: impl AsRef<Path>) -> Result<usize, ReflectError> {
        let root = propsys_tree::read_file(path)?;
        self.load_tree(&root)
    }

    /// BLAKE3 hex digest of the compact serialization of
    /// [`save_tree`](Self::save_tree). Equal persisted state hashes equal.
    ///
    /// Needs `&mut self` for the same reason as `save_tree`.
    pub fn state_hash(&mut self) -> Result<String, ReflectError> {
        let root = self.save_tree()?;
        let text = propsys_tree::to_string(&root, &WriteSettings { pretty: false })?;
        Ok(blake3::hash(text.as_bytes()).to_hex().to_string())
    }
}

impl Default for ObjectSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSystem")
            .field("objects", &self.objects.len())
            .field("factories", &self.factory_names())
            .field("next_id", &self.next_id)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
