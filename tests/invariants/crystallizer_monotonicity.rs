//! Invariant 8: a lexicon term's weight never increases across an
//! analysis pass where its usage count hasn't changed.

use lexicrucible::lexicon::CrystallizerConfig;
use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn an_idle_term_only_ever_loses_weight() {
    let config = CrystallizerConfig {
        analyze_every: 1,
        min_usage: 3,
        decay_idle_threshold: 1.0,
        ..CrystallizerConfig::default()
    };
    let mut world = WorldBuilder::new(3).with_crystallizer(config).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let speaker = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();

    for _ in 0..3 {
        world.record_speech(speaker, "old phrase", None);
    }
    world.tick(1.0).unwrap();
    let weight_before = world.lexicon().get("old phrase").unwrap().weight;

    // No further speech; several idle ticks well past the idle threshold.
    for _ in 0..5 {
        world.tick(5.0).unwrap();
    }
    let weight_after = world
        .lexicon()
        .get("old phrase")
        .map(|term| term.weight)
        .unwrap_or(0.0);
    assert!(weight_after <= weight_before);
}
