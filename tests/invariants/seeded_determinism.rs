//! Invariant 7: two worlds built from the same seed and driven through the
//! same call sequence produce identical snapshots.

use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

fn build_and_run(seed: u64) -> lexicrucible::snapshot::Snapshot {
    let mut world = WorldBuilder::new(seed).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let a = world.spawn("spark", None, None).unwrap();
    let b = world.spawn("spark", None, None).unwrap();
    world.link(a, b, 0.5, true);
    world.reinforce_relationship(a, b, 0.4, 0.4);
    for _ in 0..20 {
        world.tick(0.2).unwrap();
    }
    world.snapshot()
}

#[test]
fn identical_seeds_and_call_sequences_yield_identical_snapshots() {
    let first = build_and_run(2024);
    let second = build_and_run(2024);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn different_seeds_diverge() {
    let first = build_and_run(2024);
    let second = build_and_run(99);
    assert_ne!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
