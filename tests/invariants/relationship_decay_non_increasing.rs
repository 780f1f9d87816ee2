//! Invariant 9: absent a new interaction, a bond's trust and familiarity
//! never increase from one tick to the next.

use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn an_untouched_bond_only_ever_decays() {
    let mut world = WorldBuilder::new(55).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let a = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();
    let b = world.spawn("spark", Some(500.0), Some(500.0)).unwrap();
    world.reinforce_relationship(a, b, 0.9, 0.9);

    let mut prev_trust = world.entity(a).unwrap().relationships.get(&b).unwrap().trust;
    let mut prev_familiarity = world
        .entity(a)
        .unwrap()
        .relationships
        .get(&b)
        .unwrap()
        .familiarity;

    for _ in 0..30 {
        world.tick(1.0).unwrap();
        let Some(bond) = world.entity(a).unwrap().relationships.get(&b) else {
            break;
        };
        assert!(bond.trust <= prev_trust + 1e-12);
        assert!(bond.familiarity <= prev_familiarity + 1e-12);
        prev_trust = bond.trust;
        prev_familiarity = bond.familiarity;
    }
}
