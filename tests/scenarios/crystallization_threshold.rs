//! Scenario S5: a phrase spoken at least `minUsage` times crystallizes
//! into exactly one lexicon entry.

use lexicrucible::lexicon::CrystallizerConfig;
use lexicrucible::world::WorldBuilder;
use lexicrucible::MaterialSpec;

#[test]
fn repeated_phrase_promotes_to_a_single_lexicon_entry() {
    let config = CrystallizerConfig {
        analyze_every: 1,
        min_usage: 3,
        ..CrystallizerConfig::default()
    };
    let mut world = WorldBuilder::new(1).with_crystallizer(config).build();
    world.register_material(MaterialSpec::minimal("spark"));
    let speaker = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();

    for _ in 0..3 {
        world.record_speech(speaker, "hello friend", None);
    }
    world.tick(1.0).unwrap();

    let term = world.lexicon().get("hello friend").expect("term promoted");
    assert_eq!(term.usage_count, 3);
    assert_eq!(term.category, lexicrucible::TermCategory::Greeting);
    assert_eq!(world.lexicon().len(), 1);
}
