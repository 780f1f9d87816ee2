//! Invariant 5: `MemoryLog::merge` is commutative in outcome — the
//! resulting event set is the same regardless of merge order.

use lexicrucible::memory::buffer::{MemoryEvent, MemoryKind};
use lexicrucible::memory::MemoryLog;
use lexicrucible::EntityId;

fn event(t: f64) -> MemoryEvent {
    MemoryEvent::new(t, MemoryKind::Observation, "world", "saw something", 0.4)
}

#[test]
fn left_to_right_and_right_to_left_merges_agree() {
    let ids: Vec<EntityId> = (0..3).map(|_| EntityId::new()).collect();
    let mut l = MemoryLog::new(ids[0]);
    l.append(event(0.0));
    let mut m = MemoryLog::new(ids[1]);
    m.append(event(1.0));
    let mut n = MemoryLog::new(ids[2]);
    n.append(event(2.0));

    // (L ∪ M) ∪ N
    let mut lm_then_n = l.clone();
    lm_then_n.merge(&m);
    lm_then_n.merge(&n);

    // L ∪ (M ∪ N)
    let mut mn = m.clone();
    mn.merge(&n);
    let mut l_then_mn = l.clone();
    l_then_mn.merge(&mn);

    let mut a: Vec<&String> = lm_then_n.event_ids();
    let mut b: Vec<&String> = l_then_mn.event_ids();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}
