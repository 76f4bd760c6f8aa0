//! Saves a small population of objects to a document, loads it into a fresh
//! system, and checks that the two agree.
//!
//! Usage: `propsys-demo [PATH]` (defaults to `objects.json`). Set `RUST_LOG`
//! to see what the object system is doing, e.g. `RUST_LOG=propsys_core=debug`.

use anyhow::{ensure, Context};

use propsys_core::actors::{Actor, Beacon, Marker};
use propsys_core::prelude::*;

fn setup_system() -> Result<ObjectSystem, anyhow::Error> {
    let mut objects = ObjectSystem::new();
    objects.register_type::<Actor>()?;
    objects.register_type::<Beacon>()?;
    Ok(objects)
}

fn populate(objects: &mut ObjectSystem) -> Result<(), anyhow::Error> {
    let actor = objects
        .create::<Actor>()
        .context("no factory for Actor")?;
    actor.name = "Termogoyf".to_owned();
    actor.health = 100;
    actor.position = Vector3::new(100.0, 50.0, 0.0);

    let actor = objects
        .create::<Actor>()
        .context("no factory for Actor")?;
    actor.name = "Wisp".to_owned();
    actor.health = 35;
    actor.position = Vector3::new(-12.5, 4.0, 7.25);

    let beacon = objects
        .create::<Beacon>()
        .context("no factory for Beacon")?;
    beacon.label = "camp".to_owned();
    beacon.origin = Vector3::new(0.0, 0.0, 0.0);
    beacon.marker = Marker {
        color: 0x33cc66,
        radius: 8,
        caption: "rest here".to_owned(),
    };
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "objects.json".to_owned());

    let mut objects = setup_system()?;
    populate(&mut objects)?;
    objects
        .save_all(&path)
        .with_context(|| format!("saving objects to {path}"))?;
    let saved_hash = objects.state_hash()?;
    tracing::info!(path = %path, objects = objects.len(), hash = %saved_hash, "saved");

    let mut restored = setup_system()?;
    let loaded = restored
        .load_all(&path)
        .with_context(|| format!("loading objects from {path}"))?;
    let loaded_hash = restored.state_hash()?;
    tracing::info!(path = %path, objects = loaded, hash = %loaded_hash, "loaded");

    for object in restored.iter() {
        if let Some(actor) = object.downcast_ref::<Actor>() {
            tracing::info!(
                id = %actor.id,
                name = %actor.name,
                health = actor.health,
                "actor at ({}, {}, {})",
                actor.position.x,
                actor.position.y,
                actor.position.z
            );
        } else if let Some(beacon) = object.downcast_ref::<Beacon>() {
            tracing::info!(id = %beacon.id, label = %beacon.label, caption = %beacon.marker.caption, "beacon");
        }
    }

    ensure!(
        saved_hash == loaded_hash,
        "restored population differs from the saved one ({saved_hash} vs {loaded_hash})"
    );
    Ok(())
}
