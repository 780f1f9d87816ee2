//! The stub generator produces deterministic speech from an entity's
//! current emotion and memory, recorded into the transcript.

use lexicrucible::world::WorldBuilder;
use lexicrucible::{MaterialSpec, StubGenerator};

#[test]
fn generated_speech_is_recorded_and_reproducible() {
    let mut generator = StubGenerator;

    let mut world_a = WorldBuilder::new(5).build();
    world_a.register_material(MaterialSpec::minimal("spark"));
    let a = world_a.spawn("spark", Some(0.0), Some(0.0)).unwrap();
    world_a.generate_speech(a, "the clearing", &mut generator).unwrap();

    let mut world_b = WorldBuilder::new(5).build();
    world_b.register_material(MaterialSpec::minimal("spark"));
    let b = world_b.spawn("spark", Some(0.0), Some(0.0)).unwrap();
    world_b.generate_speech(b, "the clearing", &mut generator).unwrap();

    let text_a = &world_a.transcript().recent(1)[0].text;
    let text_b = &world_b.transcript().recent(1)[0].text;
    assert_eq!(text_a, text_b);
}
