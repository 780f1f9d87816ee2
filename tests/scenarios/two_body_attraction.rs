//! Scenario S1: two nearby entities pull toward each other and the
//! resulting impulses net to zero momentum.

use lexicrucible::world::{WorldBuilder, WorldConfig};
use lexicrucible::MaterialSpec;

#[test]
fn two_bodies_within_proximity_radius_accelerate_toward_each_other() {
    let mut world = WorldBuilder::new(123)
        .with_engine(lexicrucible::engine::EngineConfig {
            proximity_hook_radius: 80.0,
            ..WorldConfig::default().engine
        })
        .build();
    world.register_material(MaterialSpec::minimal("spark"));
    let a = world.spawn("spark", Some(100.0), Some(100.0)).unwrap();
    let b = world.spawn("spark", Some(110.0), Some(100.0)).unwrap();

    world.tick(1.0).unwrap();

    let va = world.entity(a).unwrap();
    let vb = world.entity(b).unwrap();
    assert!(va.vx.abs() > 0.0 || va.vy.abs() > 0.0);
    assert!(vb.vx.abs() > 0.0 || vb.vy.abs() > 0.0);
    assert!((va.vx + vb.vx).abs() < 1e-9);
    assert!((va.vy + vb.vy).abs() < 1e-9);
}
