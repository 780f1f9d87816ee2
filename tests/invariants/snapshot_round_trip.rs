//! Invariant 6: `restore(snapshot(W))` produces a world whose own next
//! snapshot is identical to the one that seeded the restore.

use lexicrucible::world::{World, WorldBuilder};
use lexicrucible::MaterialSpec;

#[test]
fn restoring_a_snapshot_reproduces_it_exactly() {
    let mut world = WorldBuilder::new(64).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let a = world.spawn("spark", Some(12.0), Some(34.0)).unwrap();
    let b = world.spawn("spark", Some(56.0), Some(78.0)).unwrap();
    world.link(a, b, 0.6, true);
    world.reinforce_relationship(a, b, 0.3, 0.4);
    for _ in 0..10 {
        world.tick(0.25).unwrap();
    }

    let before = world.snapshot();
    let before_json = serde_json::to_string(&before).unwrap();

    let (restored, report) = World::restore(world.config().clone(), before);
    assert!(report.skipped.is_empty());

    let after_json = serde_json::to_string(&restored.snapshot()).unwrap();
    assert_eq!(before_json, after_json);
}
