//! Invariant 2: `grid.query(e.x, e.y, 0)` contains `e` after every tick,
//! for every live entity. Exercised indirectly through `check_invariants`,
//! which poisons the world if the spatial index ever drifts from an
//! entity's recorded position.

use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn moving_entities_stay_findable_in_the_spatial_index() {
    let mut world = WorldBuilder::new(17).build();
    world.register_material(MaterialSpec::minimal("spark"));
    for i in 0..6 {
        world
            .spawn("spark", Some(20.0 * f64::from(i)), Some(10.0 * f64::from(i)))
            .unwrap();
    }

    for _ in 0..30 {
        world.tick(0.3).unwrap();
        world.check_invariants().unwrap();
    }

    assert!(!world.is_poisoned());
}
