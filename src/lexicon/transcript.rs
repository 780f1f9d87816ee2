//! Bounded circular buffer of recorded utterances (§4.8).

use crate::emotion::Pad;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};

/// A single recorded utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Monotonically increasing id, unique within a transcript's lifetime.
    pub id: u64,
    /// Who spoke.
    pub speaker: EntityId,
    /// Who was addressed, if anyone.
    pub listener: Option<EntityId>,
    /// The spoken text, unnormalized.
    pub text: String,
    /// World-time the utterance was recorded.
    pub timestamp: f64,
    /// The speaker's emotional state at the time, if known.
    pub emotion: Option<Pad>,
}

/// A bounded FIFO of utterances (§4.8), default capacity 1000.
///
/// Overflow is silent policy (§7 `Overflow`): the oldest utterance is
/// dropped to make room, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    capacity: usize,
    utterances: Vec<Utterance>,
    next_id: u64,
}

impl Transcript {
    /// Creates an empty transcript with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Transcript {
            capacity: capacity.max(1),
            utterances: Vec::new(),
            next_id: 0,
        }
    }

    /// The configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of stored utterances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    /// True iff no utterances are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Records an utterance, evicting the oldest if at capacity.
    pub fn record(
        &mut self,
        speaker: EntityId,
        listener: Option<EntityId>,
        text: impl Into<String>,
        timestamp: f64,
        emotion: Option<Pad>,
    ) -> u64 {
        if self.utterances.len() >= self.capacity {
            self.utterances.remove(0);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.utterances.push(Utterance {
            id,
            speaker,
            listener,
            text: text.into(),
            timestamp,
            emotion,
        });
        id
    }

    /// The `n` most recent utterances, newest-first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<&Utterance> {
        self.utterances.iter().rev().take(n).collect()
    }

    /// All utterances spoken by `speaker`, newest-first.
    #[must_use]
    pub fn by_speaker(&self, speaker: EntityId) -> Vec<&Utterance> {
        self.utterances
            .iter()
            .rev()
            .filter(|u| u.speaker == speaker)
            .collect()
    }

    /// All utterances exchanged between `a` and `b` in either direction,
    /// newest-first.
    #[must_use]
    pub fn by_conversation(&self, a: EntityId, b: EntityId) -> Vec<&Utterance> {
        self.utterances
            .iter()
            .rev()
            .filter(|u| {
                (u.speaker == a && u.listener == Some(b)) || (u.speaker == b && u.listener == Some(a))
            })
            .collect()
    }

    /// All utterances at or after `timestamp`, newest-first.
    #[must_use]
    pub fn since(&self, timestamp: f64) -> Vec<&Utterance> {
        self.utterances
            .iter()
            .rev()
            .filter(|u| u.timestamp >= timestamp)
            .collect()
    }

    /// Raw slice in recording order, for snapshotting and crystallizer scans.
    #[must_use]
    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }
}
