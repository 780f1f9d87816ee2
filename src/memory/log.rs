//! Vector-clock replicated memory log (§4.3 "Vector-clock log").
//!
//! `MemoryLog::merge` is a pure, commutative, idempotent operation on the
//! receiver: merging the same foreign log twice is a no-op, and the order
//! in which logs are merged does not affect the final event set
//! (testable properties 4 and 5).

use crate::memory::buffer::MemoryEvent;
use crate::types::EntityId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single logged event together with the id it was assigned on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// `"<owner>:<seq>"`, stable across merges.
    pub event_id: String,
    /// The owning entity's sequence number for this event.
    pub sequence: u64,
    /// The underlying memory event.
    pub event: MemoryEvent,
}

/// A vector-clock-indexed, mergeable log of memory events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLog {
    owner: Option<EntityId>,
    clock: IndexMap<EntityId, u64>,
    events: IndexMap<String, LoggedEvent>,
}

impl MemoryLog {
    /// Creates an empty log owned by `owner`.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        MemoryLog {
            owner: Some(owner),
            clock: IndexMap::new(),
            events: IndexMap::new(),
        }
    }

    /// The owning entity, if this log was constructed with one.
    #[must_use]
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Appends a new event under the owner's own sequence, returning the
    /// assigned event id.
    ///
    /// # Panics
    ///
    /// Panics if the log has no owner (constructed via `Default`).
    pub fn append(&mut self, event: MemoryEvent) -> String {
        let owner = self.owner.expect("MemoryLog::append requires an owner");
        let seq = self.clock.get(&owner).copied().unwrap_or(0) + 1;
        self.clock.insert(owner, seq);
        let event_id = format!("{owner}:{seq}");
        self.events.insert(
            event_id.clone(),
            LoggedEvent {
                event_id: event_id.clone(),
                sequence: seq,
                event,
            },
        );
        event_id
    }

    /// True iff the local clock for `owner` has already observed `seq`.
    #[must_use]
    pub fn has_seen(&self, owner: EntityId, seq: u64) -> bool {
        self.clock.get(&owner).copied().unwrap_or(0) >= seq
    }

    /// Merges a foreign log into this one.
    ///
    /// For every `(owner, seq)` pair recorded in `other`'s clock, imports
    /// every event from that owner whose sequence exceeds what this log
    /// has already observed. Idempotent and commutative in the resulting
    /// event set.
    pub fn merge(&mut self, other: &MemoryLog) {
        for (&owner, &other_seq) in &other.clock {
            let local_seq = self.clock.get(&owner).copied().unwrap_or(0);
            if other_seq > local_seq {
                self.clock.insert(owner, other_seq);
            }
        }
        for (event_id, logged) in &other.events {
            self.events
                .entry(event_id.clone())
                .or_insert_with(|| logged.clone());
        }
    }

    /// Drops events older than `window_seconds` relative to `now_seconds`.
    pub fn prune(&mut self, window_seconds: f64, now_seconds: f64) {
        let cutoff = now_seconds - window_seconds;
        self.events.retain(|_, logged| logged.event.timestamp >= cutoff);
    }

    /// The number of distinct events currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True iff no events are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All event ids currently held, in insertion order.
    #[must_use]
    pub fn event_ids(&self) -> Vec<&String> {
        self.events.keys().collect()
    }

    /// The current vector clock, for snapshotting.
    #[must_use]
    pub fn clock(&self) -> &IndexMap<EntityId, u64> {
        &self.clock
    }
}
