//! Invariant 4: `MemoryLog::merge` is idempotent — merging the same
//! foreign log twice is indistinguishable from merging it once.

use lexicrucible::memory::buffer::{MemoryEvent, MemoryKind};
use lexicrucible::memory::MemoryLog;
use lexicrucible::EntityId;

fn event(t: f64) -> MemoryEvent {
    MemoryEvent::new(t, MemoryKind::Observation, "world", "saw something", 0.4)
}

#[test]
fn merging_twice_equals_merging_once() {
    let owner = EntityId::new();
    let peer = EntityId::new();
    let mut log = MemoryLog::new(owner);
    let mut other = MemoryLog::new(peer);
    other.append(event(0.0));
    other.append(event(1.0));

    log.merge(&other);
    let once: Vec<&String> = log.event_ids();

    log.merge(&other);
    let twice: Vec<&String> = log.event_ids();

    assert_eq!(once, twice);
    assert_eq!(log.len(), 2);
}
