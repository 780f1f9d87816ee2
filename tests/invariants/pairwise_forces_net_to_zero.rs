//! Invariant 3: pairwise forces are equal-and-opposite — summing the
//! impulses applied to an isolated two-body pair over one tick nets to
//! zero momentum, up to floating-point error.

use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn isolated_pair_impulse_sums_to_zero_momentum() {
    let mut world = WorldBuilder::new(31).build();
    let mut material = MaterialSpec::minimal("spark");
    material.physics.friction = Some(0.0);
    world.register_material(material);
    let a = world.spawn("spark", Some(100.0), Some(100.0)).unwrap();
    let b = world.spawn("spark", Some(110.0), Some(100.0)).unwrap();

    world.tick(1.0).unwrap();

    let va = world.entity(a).unwrap();
    let vb = world.entity(b).unwrap();
    assert!((va.vx + vb.vx).abs() < 1e-9);
    assert!((va.vy + vb.vy).abs() < 1e-9);
}
