//! Scenario S2: an entity moving toward the world's minimum x bound
//! bounces off it with damped, reversed velocity.

use lexicrucible::engine::{Bounds, BoundsPolicy, EngineConfig};
use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn entity_bounces_off_minimum_x_bound() {
    let engine = EngineConfig {
        bounds_policy: BoundsPolicy::Bounce,
        bounds: Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 100.0,
        },
        ..EngineConfig::default()
    };
    let mut world = WorldBuilder::new(7).with_engine(engine).build();
    let mut material = MaterialSpec::minimal("spark");
    material.physics.bounce = Some(0.85);
    material.physics.friction = Some(0.0);
    world.register_material(material);
    let id = world.spawn("spark", Some(5.0), Some(5.0)).unwrap();
    world.entity_mut(id).unwrap().vx = -10.0;
    world.entity_mut(id).unwrap().vy = 0.0;

    world.tick(1.0).unwrap();

    let entity = world.entity(id).unwrap();
    assert_eq!(entity.x, 0.0);
    assert!((entity.vx - 8.5).abs() < 1e-9);
}
