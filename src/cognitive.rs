//! Cognitive link and multi-hop resonance propagation (§4.7).

use crate::emotion::Pad;
use crate::types::EntityId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// A directed weighted connection from one entity to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLink {
    /// Connection strength in `[0, 1]`; links below 0.1 are pruned.
    pub strength: f64,
    /// Whether reinforcement also creates the reverse link.
    pub bidirectional: bool,
    /// World-time the link was last reinforced.
    pub last_reinforced: f64,
}

impl CognitiveLink {
    /// The strength threshold below which a link is pruned.
    pub const PRUNE_THRESHOLD: f64 = 0.1;

    /// Creates a new link formed at `now`.
    #[must_use]
    pub fn new(strength: f64, bidirectional: bool, now: f64) -> Self {
        CognitiveLink {
            strength: strength.clamp(0.0, 1.0),
            bidirectional,
            last_reinforced: now,
        }
    }

    /// Bumps strength by `amount` (default 0.1) and resets the reinforcement clock.
    pub fn reinforce(&mut self, amount: f64, now: f64) {
        self.strength = (self.strength + amount).clamp(0.0, 1.0);
        self.last_reinforced = now;
    }

    /// Applies one tick of multiplicative decay: `strength *= 1 - decay_rate`.
    pub fn decay(&mut self, decay_rate: f64) {
        self.strength = (self.strength * (1.0 - decay_rate)).clamp(0.0, 1.0);
    }

    /// True iff the link has decayed below the prune threshold.
    #[must_use]
    pub fn should_prune(&self) -> bool {
        self.strength < Self::PRUNE_THRESHOLD
    }
}

/// A peer-keyed table of outgoing cognitive links for one entity.
pub type LinkTable = IndexMap<EntityId, CognitiveLink>;

/// Removes every link in `links` that has decayed below the prune threshold.
pub fn prune_decayed(links: &mut LinkTable) {
    links.retain(|_, link| !link.should_prune());
}

/// The kind of payload a cognitive signal carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SignalPayload {
    /// A memory to append at the receiver, with free-text content.
    Memory(String),
    /// An emotional state to resonate toward.
    Emotion(Pad),
    /// An application-defined payload.
    Custom(String),
}

/// A signal propagated through the cognitive-link graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveSignal {
    /// A unique id for this propagation, used for per-traversal dedup.
    pub signal_id: String,
    /// The originating entity.
    pub source: EntityId,
    /// World-time of origination.
    pub timestamp: f64,
    /// The payload carried.
    pub payload: SignalPayload,
    /// Initial strength in `[0, 1]`.
    pub strength: f64,
}

/// One delivery of a signal to a receiver, with its attenuated strength.
#[derive(Debug, Clone)]
pub struct SignalDelivery {
    /// Who received the signal.
    pub receiver: EntityId,
    /// The signal, unchanged.
    pub signal: CognitiveSignal,
    /// Strength after attenuation along the path taken.
    pub arrived_strength: f64,
    /// Number of hops from the source.
    pub hops: u32,
}

/// Propagates `signal` breadth-first through `graph` (entity id -> outgoing
/// links), returning every delivery made before strength fell below
/// `min_strength` or `max_hops` was reached. Deduplicates per
/// `(signal_id, receiver)` so no entity receives the same signal twice in
/// one traversal.
#[must_use]
pub fn propagate(
    signal: &CognitiveSignal,
    graph: &IndexMap<EntityId, LinkTable>,
    decay_rate: f64,
    min_strength: f64,
    max_hops: u32,
) -> Vec<SignalDelivery> {
    let mut deliveries = Vec::new();
    let mut seen: HashSet<(String, EntityId)> = HashSet::new();
    let mut queue: VecDeque<(EntityId, f64, u32)> = VecDeque::new();
    queue.push_back((signal.source, signal.strength, 0));
    seen.insert((signal.signal_id.clone(), signal.source));

    while let Some((current, strength, hops)) = queue.pop_front() {
        if hops >= max_hops {
            continue;
        }
        let Some(links) = graph.get(&current) else {
            continue;
        };
        for (&peer, link) in links {
            let arrived = strength * link.strength * (1.0 - decay_rate);
            if arrived < min_strength {
                continue;
            }
            let key = (signal.signal_id.clone(), peer);
            if seen.contains(&key) {
                continue;
            }
            seen.insert(key);
            deliveries.push(SignalDelivery {
                receiver: peer,
                signal: signal.clone(),
                arrived_strength: arrived,
                hops: hops + 1,
            });
            queue.push_back((peer, arrived, hops + 1));
        }
    }

    deliveries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_decayed_removes_weak_links() {
        let mut links = LinkTable::new();
        links.insert(EntityId::new(), CognitiveLink::new(0.05, false, 0.0));
        links.insert(EntityId::new(), CognitiveLink::new(0.5, false, 0.0));
        prune_decayed(&mut links);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn decay_reduces_strength_multiplicatively() {
        let mut link = CognitiveLink::new(1.0, false, 0.0);
        link.decay(0.1);
        assert!((link.strength - 0.9).abs() < 1e-9);
    }

    #[test]
    fn propagate_stops_below_min_strength() {
        let a = EntityId::new();
        let b = EntityId::new();
        let c = EntityId::new();
        let mut graph: IndexMap<EntityId, LinkTable> = IndexMap::new();
        let mut a_links = LinkTable::new();
        a_links.insert(b, CognitiveLink::new(0.05, false, 0.0));
        graph.insert(a, a_links);
        let mut b_links = LinkTable::new();
        b_links.insert(c, CognitiveLink::new(0.9, false, 0.0));
        graph.insert(b, b_links);

        let signal = CognitiveSignal {
            signal_id: "s1".to_string(),
            source: a,
            timestamp: 0.0,
            payload: SignalPayload::Custom("ping".to_string()),
            strength: 1.0,
        };
        let deliveries = propagate(&signal, &graph, 0.0, 0.1, 5);
        // a -> b arrives at 0.05, below min_strength 0.1, so b never forwards to c.
        assert!(deliveries.is_empty());
    }

    #[test]
    fn propagate_respects_max_hops() {
        let a = EntityId::new();
        let b = EntityId::new();
        let c = EntityId::new();
        let mut graph: IndexMap<EntityId, LinkTable> = IndexMap::new();
        let mut a_links = LinkTable::new();
        a_links.insert(b, CognitiveLink::new(0.9, false, 0.0));
        graph.insert(a, a_links);
        let mut b_links = LinkTable::new();
        b_links.insert(c, CognitiveLink::new(0.9, false, 0.0));
        graph.insert(b, b_links);

        let signal = CognitiveSignal {
            signal_id: "s2".to_string(),
            source: a,
            timestamp: 0.0,
            payload: SignalPayload::Custom("ping".to_string()),
            strength: 1.0,
        };
        let deliveries = propagate(&signal, &graph, 0.0, 0.01, 1);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].receiver, b);
    }

    #[test]
    fn propagate_dedups_per_signal_and_receiver() {
        let a = EntityId::new();
        let b = EntityId::new();
        let c = EntityId::new();
        let mut graph: IndexMap<EntityId, LinkTable> = IndexMap::new();
        let mut a_links = LinkTable::new();
        a_links.insert(b, CognitiveLink::new(0.9, false, 0.0));
        a_links.insert(c, CognitiveLink::new(0.9, false, 0.0));
        graph.insert(a, a_links);
        let mut b_links = LinkTable::new();
        b_links.insert(c, CognitiveLink::new(0.9, false, 0.0));
        graph.insert(b, b_links);

        let signal = CognitiveSignal {
            signal_id: "s3".to_string(),
            source: a,
            timestamp: 0.0,
            payload: SignalPayload::Custom("ping".to_string()),
            strength: 1.0,
        };
        let deliveries = propagate(&signal, &graph, 0.0, 0.01, 5);
        let c_deliveries = deliveries.iter().filter(|d| d.receiver == c).count();
        assert_eq!(c_deliveries, 1);
    }
}
