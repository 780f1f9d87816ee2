//! Scenario S6: removing an entity with high memory salience drives the
//! world's emotional climate toward grief.

use lexicrucible::memory::buffer::{MemoryEvent, MemoryKind};
use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn removing_a_salient_entity_raises_grief_and_lowers_vitality() {
    let mut world = WorldBuilder::new(9).build();
    let mut material = MaterialSpec::minimal("spark");
    // Capacity 1 so the fresh spawn-memory event is evicted once the
    // scenario's own 0.8-salience event is added, keeping the death
    // salience exactly 0.8.
    material.ontology.memory_size = Some(1);
    world.register_material(material);
    let id = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();
    world
        .entity_mut(id)
        .unwrap()
        .memory
        .as_mut()
        .unwrap()
        .add(MemoryEvent::new(0.0, MemoryKind::Interaction, "world", "a loss", 0.8));

    world.remove_entity(id);

    let climate = world.climate();
    assert!((climate.grief - 0.24).abs() < 1e-9);
    assert!((climate.vitality - 0.34).abs() < 1e-9);
    assert!(world.entity(id).is_none());
}
