//! Memory events and the bounded ring buffer that holds them (§4.3).

use crate::types::EntityId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The kind of experience a memory event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Recorded at entity creation.
    Spawn,
    /// A direct interaction with another entity.
    Interaction,
    /// A passive observation of the world.
    Observation,
    /// An emotion-state change worth remembering.
    Emotion,
    /// A field came into existence nearby.
    FieldSpawn,
    /// The entity's current intent changed.
    IntentChange,
    /// A declarative fact, e.g. asserted by a collaborator.
    Fact,
    /// An application-defined kind not covered above.
    Custom,
}

/// A single non-content value attached to a memory event, aggregated across
/// a crystal's contributing memories by the memory crystallizer (§4.9):
/// numeric values by running mean, text values by most-common.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// A numeric contribution, aggregated by mean.
    Number(f64),
    /// A non-numeric contribution, aggregated by most-common.
    Text(String),
}

/// A single recorded experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// World-time seconds at which the event was recorded.
    pub timestamp: f64,
    /// What kind of event this is.
    pub kind: MemoryKind,
    /// Who or what the event is about (a peer id, field name, etc).
    pub subject: String,
    /// Free-text content.
    pub content: String,
    /// How salient the memory is, in `[0, 1]`.
    pub salience: f64,
    /// Non-content values contributed to crystal aggregation, e.g. signal
    /// hop counts or an observation's numeric reading. Empty by default.
    pub metadata: IndexMap<String, MetadataValue>,
}

impl MemoryEvent {
    /// Builds a new memory event, clamping salience to `[0, 1]`.
    #[must_use]
    pub fn new(
        timestamp: f64,
        kind: MemoryKind,
        subject: impl Into<String>,
        content: impl Into<String>,
        salience: f64,
    ) -> Self {
        MemoryEvent {
            timestamp,
            kind,
            subject: subject.into(),
            content: content.into(),
            salience: salience.clamp(0.0, 1.0),
            metadata: IndexMap::new(),
        }
    }

    /// Attaches a metadata value, replacing any prior value under `key`.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A filter over recalled memories. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    /// Restrict to this kind.
    pub kind: Option<MemoryKind>,
    /// Restrict to this subject.
    pub subject: Option<String>,
    /// Restrict to events at or after this world-time.
    pub since: Option<f64>,
}

impl MemoryFilter {
    fn matches(&self, event: &MemoryEvent) -> bool {
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(ref subject) = self.subject {
            if &event.subject != subject {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.timestamp < since {
                return false;
            }
        }
        true
    }
}

/// A bounded FIFO of memory events (§4.3).
///
/// When full, `add` drops the entry with the lowest salience (ties broken
/// by oldest-first) rather than unconditionally evicting the oldest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryBuffer {
    capacity: usize,
    events: Vec<MemoryEvent>,
}

impl MemoryBuffer {
    /// Creates an empty buffer with the given capacity (spec default 500).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        MemoryBuffer {
            capacity: capacity.max(1),
            events: Vec::new(),
        }
    }

    /// The configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True iff no events are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Appends an event, evicting the lowest-salience (oldest-first tie)
    /// entry if the buffer is at capacity.
    pub fn add(&mut self, event: MemoryEvent) {
        if self.events.len() >= self.capacity {
            if let Some(victim) = self.weakest_index() {
                self.events.remove(victim);
            }
        }
        self.events.push(event);
    }

    fn weakest_index(&self) -> Option<usize> {
        self.events
            .iter()
            .enumerate()
            .min_by(|(ia, a), (ib, b)| {
                a.salience
                    .partial_cmp(&b.salience)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ia.cmp(ib))
            })
            .map(|(i, _)| i)
    }

    /// Returns matching events, newest-first.
    #[must_use]
    pub fn recall(&self, filter: &MemoryFilter) -> Vec<&MemoryEvent> {
        self.events
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .collect()
    }

    /// Returns all events, newest-first.
    #[must_use]
    pub fn recall_all(&self) -> Vec<&MemoryEvent> {
        self.events.iter().rev().collect()
    }

    /// Raw slice of stored events in insertion order, for snapshotting.
    #[must_use]
    pub fn events(&self) -> &[MemoryEvent] {
        &self.events
    }
}

/// Records a memory event tagged with the originating peer, used by
/// cognitive-link signal reception (§4.7) and similar cross-entity writes.
#[must_use]
pub fn from_peer(timestamp: f64, peer: EntityId, content: impl Into<String>, salience: f64) -> MemoryEvent {
    MemoryEvent::new(timestamp, MemoryKind::Interaction, peer.to_string(), content, salience)
}
