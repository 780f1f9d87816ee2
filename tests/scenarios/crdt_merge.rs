//! Scenario S3: CRDT memory-log merge is idempotent and reaches a
//! deterministic union of events regardless of how many times it runs.

use lexicrucible::memory::buffer::{MemoryEvent, MemoryKind};
use lexicrucible::memory::MemoryLog;
use lexicrucible::EntityId;

fn event(t: f64) -> MemoryEvent {
    MemoryEvent::new(t, MemoryKind::Interaction, "peer", "hi", 0.5)
}

#[test]
fn merging_twice_converges_to_the_same_union() {
    let a_id = EntityId::new();
    let b_id = EntityId::new();
    let mut a = MemoryLog::new(a_id);
    a.append(event(0.0));
    let mut b = MemoryLog::new(b_id);
    b.append(event(1.0));
    b.append(event(2.0));

    a.merge(&b);
    a.merge(&b);

    assert_eq!(a.len(), 3);
    assert_eq!(a.clock().get(&a_id).copied(), Some(1));
    assert_eq!(a.clock().get(&b_id).copied(), Some(2));
}
