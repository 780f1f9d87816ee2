//! Memory crystallizer (§4.9): promotes recurrent `(subject, type)` memory
//! groups into consolidated crystals.
//!
//! Distinct from the lexicon crystallizer (§4.8): this component is keyed
//! by `(subject, type)` groups of memory events, never by transcript
//! phrases, and the two share no code path (§9 Open Question).

use crate::memory::buffer::{MemoryEvent, MemoryKind, MetadataValue};
use crate::types::CrystalId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A consolidated summary of a recurrent `(subject, type)` memory group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCrystal {
    /// Stable crystal id.
    pub id: CrystalId,
    /// `"occasional_<type>"` (3-4), `"repeated_<type>"` (5-9), or
    /// `"frequent_<type>"` (>=10).
    pub pattern: String,
    /// The subject the crystal is about.
    pub subject: String,
    /// The memory kind the crystal summarizes.
    pub kind: MemoryKind,
    /// Aggregate strength in `(0, 1]`.
    pub strength: f64,
    /// World-time of the first contributing memory.
    pub first_seen: f64,
    /// World-time of the most recent reinforcement.
    pub last_reinforced: f64,
    /// Number of contributing memories.
    pub count: usize,
    /// A short human-readable essence derived from the content.
    pub essence: String,
    /// Aggregated non-content metadata.
    pub metadata: IndexMap<String, MetadataValue>,
}

/// Configuration for the memory crystallizer.
#[derive(Debug, Clone)]
pub struct MemoryCrystallizerConfig {
    /// Minimum group size to crystallize. Default 3.
    pub min_occurrences: usize,
    /// Minimum aggregate strength to crystallize. Default 0.3.
    pub min_strength: f64,
    /// Maximum crystals retained; weakest is dropped beyond this. Default 200.
    pub max_crystals: usize,
}

impl Default for MemoryCrystallizerConfig {
    fn default() -> Self {
        MemoryCrystallizerConfig {
            min_occurrences: 3,
            min_strength: 0.3,
            max_crystals: 200,
        }
    }
}

fn pattern_for_count(kind: MemoryKind, count: usize) -> String {
    let label = format!("{kind:?}").to_lowercase();
    if count >= 10 {
        format!("frequent_{label}")
    } else if count >= 5 {
        format!("repeated_{label}")
    } else {
        format!("occasional_{label}")
    }
}

fn aggregate_strength(events: &[&MemoryEvent]) -> f64 {
    let mean_salience = events.iter().map(|e| e.salience).sum::<f64>() / events.len() as f64;
    mean_salience * (1.0 + events.len() as f64).ln()
}

/// Aggregates every metadata key seen across `events`: numeric values by
/// mean, non-numeric values by most-common (ties keep the first-seen
/// value, for determinism). A key contributed only as numbers aggregates
/// as a number; otherwise its non-numeric contributions are aggregated
/// and any numeric contributions under that key are ignored.
fn aggregate_metadata(events: &[&MemoryEvent]) -> IndexMap<String, MetadataValue> {
    let mut by_key: IndexMap<&str, Vec<&MetadataValue>> = IndexMap::new();
    for event in events {
        for (key, value) in &event.metadata {
            by_key.entry(key.as_str()).or_default().push(value);
        }
    }

    let mut aggregated = IndexMap::new();
    for (key, values) in by_key {
        let numbers: Vec<f64> = values
            .iter()
            .filter_map(|v| match v {
                MetadataValue::Number(n) => Some(*n),
                MetadataValue::Text(_) => None,
            })
            .collect();
        if numbers.len() == values.len() {
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            aggregated.insert(key.to_string(), MetadataValue::Number(mean));
            continue;
        }

        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for value in &values {
            if let MetadataValue::Text(text) = value {
                *counts.entry(text.as_str()).or_insert(0) += 1;
            }
        }
        let most_common = counts.into_iter().fold(None, |best: Option<(&str, usize)>, (text, count)| {
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((text, count)),
            }
        });
        if let Some((text, _)) = most_common {
            aggregated.insert(key.to_string(), MetadataValue::Text(text.to_string()));
        }
    }
    aggregated
}

/// Groups memories by `(subject, type)` and crystallizes groups meeting
/// the configured thresholds, reinforcing existing crystals in `store`.
pub fn crystallize(
    events: &[MemoryEvent],
    store: &mut IndexMap<CrystalId, MemoryCrystal>,
    now: f64,
    config: &MemoryCrystallizerConfig,
) {
    let mut groups: HashMap<(String, MemoryKind), Vec<&MemoryEvent>> = HashMap::new();
    for event in events {
        groups
            .entry((event.subject.clone(), event.kind))
            .or_default()
            .push(event);
    }

    for ((subject, kind), group) in groups {
        if group.len() < config.min_occurrences {
            continue;
        }
        let strength = aggregate_strength(&group).min(1.0).max(f64::MIN_POSITIVE);
        if strength < config.min_strength {
            continue;
        }

        let essence = group
            .iter()
            .max_by(|a, b| a.salience.partial_cmp(&b.salience).unwrap())
            .map(|e| e.content.clone())
            .unwrap_or_default();

        let existing_id = store
            .iter()
            .find(|(_, c)| c.subject == subject && c.kind == kind)
            .map(|(id, _)| *id);

        if let Some(id) = existing_id {
            let crystal = store.get_mut(&id).expect("looked up by key");
            crystal.count = group.len();
            crystal.strength = strength;
            crystal.pattern = pattern_for_count(kind, group.len());
            crystal.last_reinforced = now;
            crystal.essence = essence;
            crystal.metadata = aggregate_metadata(&group);
        } else {
            let crystal = MemoryCrystal {
                id: CrystalId::new(),
                pattern: pattern_for_count(kind, group.len()),
                subject,
                kind,
                strength,
                first_seen: group.iter().map(|e| e.timestamp).fold(f64::INFINITY, f64::min),
                last_reinforced: now,
                count: group.len(),
                essence,
                metadata: aggregate_metadata(&group),
            };
            store.insert(crystal.id, crystal);
        }
    }

    while store.len() > config.max_crystals {
        if let Some(weakest) = store
            .iter()
            .min_by(|(_, a), (_, b)| a.strength.partial_cmp(&b.strength).unwrap())
            .map(|(id, _)| *id)
        {
            store.shift_remove(&weakest);
        } else {
            break;
        }
    }
}
