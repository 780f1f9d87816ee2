//! Invariant 10: cognitive links below `CognitiveLink::PRUNE_THRESHOLD`
//! never linger in an entity's link table past the tick that decays them.

use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn a_weak_link_is_pruned_once_decay_drops_it_below_threshold() {
    let mut world = WorldBuilder::new(21).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let a = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();
    let b = world.spawn("spark", Some(500.0), Some(500.0)).unwrap();
    world.link(a, b, 0.11, false);

    for _ in 0..200 {
        world.tick(1.0).unwrap();
    }

    let entity = world.entity(a).unwrap();
    assert!(entity
        .cognitive_links
        .values()
        .all(|link| link.strength >= lexicrucible::cognitive::CognitiveLink::PRUNE_THRESHOLD));
    assert!(!entity.cognitive_links.contains_key(&b));
}
