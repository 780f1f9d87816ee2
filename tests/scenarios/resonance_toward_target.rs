//! Scenario S4: an entity's emotion resonates halfway toward a peer's.

use lexicrucible::Pad;

#[test]
fn resonating_at_half_strength_lands_at_the_midpoint() {
    let mut mine = Pad::new(0.0, 0.5, 0.5);
    let theirs = Pad::new(0.8, 0.7, 0.6);
    mine.resonate(theirs, 0.5);
    assert!((mine.valence - 0.4).abs() < 1e-6);
    assert!((mine.arousal - 0.6).abs() < 1e-6);
    assert!((mine.dominance - 0.55).abs() < 1e-6);
}
