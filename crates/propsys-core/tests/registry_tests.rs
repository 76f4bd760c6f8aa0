//! Integration tests for ObjectSystem save/load round trips.

use std::path::PathBuf;

use propsys_core::actors::{Actor, Beacon, Marker};
use propsys_core::prelude::*;

// -- helpers ----------------------------------------------------------------

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("propsys-core-{}-{name}.json", std::process::id()))
}

fn setup_system() -> ObjectSystem {
    let mut objects = ObjectSystem::new();
    objects.register_type::<Actor>().unwrap();
    objects.register_type::<Beacon>().unwrap();
    objects
}

fn spawn_termogoyf(objects: &mut ObjectSystem) -> ObjectId {
    let actor = objects.create::<Actor>().unwrap();
    actor.name = "Termogoyf".to_owned();
    actor.health = 100;
    actor.position = Vector3::new(100.0, 50.0, 0.0);
    actor.id
}

/// A persisted Actor node as another tool might have written it.
fn actor_node(id: u32, name: &str) -> PropertyTree {
    let mut node = PropertyTree::new();
    node.put("id", id);
    node.put("Name", name);
    node.put("Health", 10);
    node.put("Position.x", 0.0_f32);
    node.put("Position.y", 0.0_f32);
    node.put("Position.z", 0.0_f32);
    node
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn termogoyf_survives_file_roundtrip() {
    let path = scratch_path("termogoyf");
    let mut objects = setup_system();
    let id = spawn_termogoyf(&mut objects);
    objects.save_all(&path).unwrap();

    let mut restored = setup_system();
    let loaded = restored.load_all(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, 1);
    let actor = restored.get::<Actor>(id).unwrap();
    assert_eq!(actor.name, "Termogoyf");
    assert_eq!(actor.health, 100);
    assert_eq!(actor.position, Vector3::new(100.0, 50.0, 0.0));
}

#[test]
fn blank_object_is_filled_from_saved_subtree() {
    let mut objects = setup_system();
    spawn_termogoyf(&mut objects);
    let root = objects.save_tree().unwrap();
    let (type_name, node) = root.children().next().unwrap();
    assert_eq!(type_name, "Actor");

    let mut blank = objects.factory("Actor").unwrap().construct(ObjectId(0));
    TreeReader::new(node).drain(&mut blank.fields()).unwrap();

    let actor = blank.downcast_ref::<Actor>().unwrap();
    assert_eq!(actor.name, "Termogoyf");
    assert_eq!(actor.health, 100);
    assert_eq!(actor.position, Vector3::new(100.0, 50.0, 0.0));
}

#[test]
fn persisted_document_lists_fields_in_registration_order() {
    let mut objects = setup_system();
    spawn_termogoyf(&mut objects);
    let root = objects.save_tree().unwrap();

    let actor = root.get_child("Actor").unwrap();
    let keys: Vec<&str> = actor.children().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["id", "Name", "Health", "Position"]);
    let axes: Vec<&str> = actor
        .get_child("Position")
        .unwrap()
        .children()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(axes, vec!["x", "y", "z"]);

    // Order also survives the file format.
    let text = propsys_tree::to_string(&root, &WriteSettings::default()).unwrap();
    let reparsed = propsys_tree::from_str(&text).unwrap();
    assert_eq!(reparsed, root);
}

#[test]
fn same_type_objects_become_siblings() {
    let mut objects = setup_system();
    for i in 0..4 {
        objects.create::<Actor>().unwrap().health = i;
    }
    let root = objects.save_tree().unwrap();
    assert_eq!(root.count("Actor"), 4);

    let mut restored = setup_system();
    assert_eq!(restored.load_tree(&root).unwrap(), 4);
    let healths: Vec<i32> = restored
        .ids_of_type("Actor")
        .into_iter()
        .map(|id| restored.get::<Actor>(id).unwrap().health)
        .collect();
    assert_eq!(healths, vec![0, 1, 2, 3]);
}

#[test]
fn unknown_types_are_skipped() {
    let mut root = PropertyTree::new();
    root.push_child("Actor", actor_node(0, "first"));
    root.push_child("Monster", actor_node(1, "ignored"));
    root.push_child("Actor", actor_node(2, "second"));

    let mut objects = ObjectSystem::new();
    objects.register_type::<Actor>().unwrap();
    assert_eq!(objects.load_tree(&root).unwrap(), 2);
    assert_eq!(objects.len(), 2);
    for object in objects.iter() {
        assert_eq!(object.type_name(), "Actor");
    }
    let names: Vec<String> = objects
        .ids()
        .into_iter()
        .map(|id| objects.get::<Actor>(id).unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn malformed_record_fails_whole_load() {
    let mut broken = actor_node(1, "broken");
    broken.get_child_mut("Position").unwrap().put("z", "deep");

    let mut root = PropertyTree::new();
    root.push_child("Actor", actor_node(0, "fine"));
    root.push_child("Actor", broken);

    let mut objects = setup_system();
    match objects.load_tree(&root) {
        Err(ReflectError::TypeMismatch { path, value, .. }) => {
            assert_eq!(path, "Position.z");
            assert_eq!(value, "deep");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert!(objects.is_empty());
}

#[test]
fn missing_field_fails_load() {
    let mut node = PropertyTree::new();
    node.put("id", 0_u32);
    node.put("Name", "no health");

    let mut root = PropertyTree::new();
    root.push_child("Actor", node);

    let mut objects = setup_system();
    match objects.load_tree(&root) {
        Err(ReflectError::MissingField { path }) => assert_eq!(path, "Health"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn nested_collection_roundtrip() {
    let mut objects = setup_system();
    let beacon = objects.create::<Beacon>().unwrap();
    beacon.label = "north".to_owned();
    beacon.origin = Vector3::new(-1.0, 0.25, 8.0);
    beacon.marker = Marker {
        color: 0xff8800,
        radius: -4,
        caption: "here be dragons".to_owned(),
    };
    let expected = beacon.clone();

    let root = objects.save_tree().unwrap();
    assert_eq!(root.get::<i32>("Beacon.Marker.Radius").unwrap(), -4);

    let mut restored = setup_system();
    restored.load_tree(&root).unwrap();
    assert_eq!(restored.get::<Beacon>(expected.id).unwrap(), &expected);
}

#[test]
fn ids_increase_across_deletes() {
    let mut objects = setup_system();
    let mut issued = Vec::new();
    for round in 0..10 {
        let id = objects.create::<Actor>().unwrap().id;
        issued.push(id);
        if round % 3 == 0 {
            objects.delete(id).unwrap();
        }
    }
    assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn delete_unknown_handle_leaves_population_intact() {
    let mut objects = setup_system();
    let kept = spawn_termogoyf(&mut objects);
    let gone = objects.create::<Beacon>().unwrap().id;
    objects.delete(gone).unwrap();

    assert!(matches!(
        objects.delete(gone),
        Err(ReflectError::ObjectNotFound { .. })
    ));
    assert!(matches!(
        objects.delete(ObjectId(1234)),
        Err(ReflectError::ObjectNotFound { .. })
    ));
    assert_eq!(objects.ids(), vec![kept]);
}

#[test]
fn loading_into_populated_system_keeps_counter_ahead() {
    let mut source = setup_system();
    for _ in 0..3 {
        source.create::<Actor>().unwrap();
    }
    let root = source.save_tree().unwrap();

    // The target already reserved IDs 0..=9 and deleted them, so the
    // persisted IDs 0..=2 are free again but must not be reissued later.
    let mut target = setup_system();
    for _ in 0..10 {
        let id = target.create::<Actor>().unwrap().id;
        target.delete(id).unwrap();
    }
    assert_eq!(target.load_tree(&root).unwrap(), 3);
    let fresh = target.create::<Actor>().unwrap().id;
    assert!(fresh > ObjectId(9));
}

#[test]
fn largest_persisted_id_is_never_reissued() {
    let mut root = PropertyTree::new();
    root.push_child("Actor", actor_node(u32::MAX, "last"));

    let mut objects = setup_system();
    assert_eq!(objects.load_tree(&root).unwrap(), 1);
    assert_eq!(objects.next_id(), None);

    // Creation is refused instead of wrapping back to a live ID.
    assert!(objects.create::<Actor>().is_none());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects.get::<Actor>(ObjectId(u32::MAX)).unwrap().name, "last");

    // A second load fails cleanly and leaves the population alone.
    let mut more = PropertyTree::new();
    more.push_child("Actor", actor_node(0, "late"));
    assert!(matches!(
        objects.load_tree(&more),
        Err(ReflectError::IdSpaceExhausted)
    ));
    assert_eq!(objects.ids(), vec![ObjectId(u32::MAX)]);
}

#[test]
fn subtree_stored_under_scalar_field_fails_load() {
    let document = r#"{
        "Actor": {
            "id": "0",
            "Name": { "first": "Ter", "last": "mo" },
            "Health": "10",
            "Position": { "x": "0", "y": "0", "z": "0" }
        }
    }"#;
    let root = propsys_tree::from_str(document).unwrap();

    let mut objects = setup_system();
    match objects.load_tree(&root) {
        Err(ReflectError::TypeMismatch { path, .. }) => assert_eq!(path, "Name"),
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert!(objects.is_empty());
}

#[test]
fn load_missing_file_is_store_error() {
    let mut objects = setup_system();
    assert!(matches!(
        objects.load_all(scratch_path("absent")),
        Err(ReflectError::Store(_))
    ));
}

#[test]
fn equal_populations_hash_equal() {
    let mut a = setup_system();
    let mut b = setup_system();
    spawn_termogoyf(&mut a);
    spawn_termogoyf(&mut b);
    assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());

    let root = a.save_tree().unwrap();
    let mut c = setup_system();
    c.load_tree(&root).unwrap();
    assert_eq!(c.state_hash().unwrap(), a.state_hash().unwrap());
}
