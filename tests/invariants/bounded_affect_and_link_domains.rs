//! Invariant 1: every tick, every entity's emotion, opacity, cognitive
//! links, and relationship bonds stay within their documented domains.

use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn domains_hold_after_many_ticks_of_interacting_entities() {
    let mut world = WorldBuilder::new(44).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let a = world.spawn("spark", Some(100.0), Some(100.0)).unwrap();
    let b = world.spawn("spark", Some(105.0), Some(100.0)).unwrap();
    world.link(a, b, 0.9, true);
    world.reinforce_relationship(a, b, 0.8, 0.8);

    for _ in 0..50 {
        world.tick(0.5).unwrap();
    }
    world.check_invariants().unwrap();

    for entity in world.entities() {
        if let Some(emotion) = entity.emotion {
            assert!(emotion.is_valid());
        }
        assert!((0.0..=1.0).contains(&entity.opacity));
        for link in entity.cognitive_links.values() {
            assert!((0.0..=1.0).contains(&link.strength));
        }
        for bond in entity.relationships.values() {
            assert!((0.0..=1.0).contains(&bond.familiarity));
        }
    }
}
