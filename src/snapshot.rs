//! Two-pass deterministic snapshot and restore (component P, §4.12).
//!
//! Pass one copies every serializable collection a `Snapshot` carries
//! straight back into a `World` (`World::restore`). Pass two, `reconcile`,
//! repairs whatever cross-references a partial or hand-edited snapshot
//! left dangling: a relationship, cognitive link, or intent pointed at an
//! entity that is no longer present. The spatial index is rebuilt from
//! restored entity positions rather than carried in the snapshot at all,
//! since it is reconstructible and `SpatialGrid` has no stable external
//! representation worth serializing.

use crate::climate::Climate;
use crate::entity::Entity;
use crate::field::Field;
use crate::intent::{Intent, IntentStack};
use crate::lexicon::{Lexicon, Transcript};
use crate::material::MaterialSpec;
use crate::memory::crystal::MemoryCrystal;
use crate::needs::ResourceField;
use crate::rng::DeterministicRng;
use crate::types::{CrystalId, EntityId, FieldId, ResourceFieldId};
use crate::world::RestoreWarning;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A complete, serializable capture of a `World`'s state (§4.12).
///
/// Round-trips through `serde_json` or any other serde format. Absent by
/// design: the spatial index (rebuilt from entity positions at restore)
/// and `WorldConfig` (re-supplied by the caller, since a restored world
/// may deliberately run under different tuning than when it was saved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The world's stable id.
    pub id: Uuid,
    /// World-time in seconds.
    pub clock: f64,
    /// Ticks advanced so far.
    pub tick_count: u64,
    /// The exact RNG state and draw count, for replay-identical resumption.
    pub rng: DeterministicRng,
    /// Every live entity, in insertion order.
    pub entities: IndexMap<EntityId, Entity>,
    /// Every live transient field.
    pub fields: IndexMap<FieldId, Field>,
    /// Every registered resource field.
    pub resource_fields: IndexMap<ResourceFieldId, ResourceField>,
    /// Every registered material.
    pub materials: IndexMap<String, MaterialSpec>,
    /// The speech transcript.
    pub transcript: Transcript,
    /// The crystallized lexicon.
    pub lexicon: Lexicon,
    /// Every memory crystal.
    pub memory_crystals: IndexMap<CrystalId, MemoryCrystal>,
    /// The emotional climate.
    pub climate: Climate,
}

/// Clears `intent`'s target if it points outside `known`, reporting
/// whether a change was made.
fn clear_dangling_target(intent: &mut Intent, known: &HashSet<EntityId>) -> bool {
    if let Some(target) = intent.target {
        if !known.contains(&target) {
            intent.target = None;
            return true;
        }
    }
    false
}

/// Repairs cross-references a snapshot's entities may hold that no
/// longer resolve, returning one warning per repair made (§7
/// `MissingReference`).
///
/// Checked per entity: its `material_id` against `materials`, each
/// relationship and cognitive-link peer against `entities`, and each
/// intent's target against `entities`. An unregistered material is left
/// in place and only reported, since the engine already falls back to a
/// minimal material for any material id it cannot resolve; dangling peer
/// references are dropped outright, since nothing downstream tolerates
/// them.
pub(crate) fn reconcile(
    entities: &mut IndexMap<EntityId, Entity>,
    materials: &IndexMap<String, MaterialSpec>,
) -> Vec<RestoreWarning> {
    let known_ids: HashSet<EntityId> = entities.keys().copied().collect();
    let mut warnings = Vec::new();

    for (&id, entity) in entities.iter_mut() {
        if !materials.contains_key(&entity.material_id) {
            warnings.push(RestoreWarning {
                message: format!(
                    "entity {id} references unregistered material '{}'",
                    entity.material_id
                ),
            });
        }

        let dangling_bonds: Vec<EntityId> = entity
            .relationships
            .keys()
            .copied()
            .filter(|peer| !known_ids.contains(peer))
            .collect();
        for peer in dangling_bonds {
            entity.relationships.shift_remove(&peer);
            warnings.push(RestoreWarning {
                message: format!("entity {id} relationship to missing entity {peer} dropped"),
            });
        }

        let dangling_links: Vec<EntityId> = entity
            .cognitive_links
            .keys()
            .copied()
            .filter(|peer| !known_ids.contains(peer))
            .collect();
        for peer in dangling_links {
            entity.cognitive_links.shift_remove(&peer);
            warnings.push(RestoreWarning {
                message: format!("entity {id} cognitive link to missing entity {peer} dropped"),
            });
        }

        if let Some(stack) = entity.intent.as_mut() {
            let mut repaired: Vec<Intent> = stack.entries().to_vec();
            let mut changed = false;
            for intent in &mut repaired {
                changed |= clear_dangling_target(intent, &known_ids);
            }
            if changed {
                let mut fresh = IntentStack::new();
                for intent in repaired {
                    fresh.push(intent);
                }
                *stack = fresh;
                warnings.push(RestoreWarning {
                    message: format!("entity {id} intent target missing, cleared"),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityBuilder;
    use crate::relationship::Bond;

    fn spawn_entity(x: f64) -> Entity {
        let material = MaterialSpec::minimal("spark");
        EntityBuilder::new().position(x, 0.0).build(&material, 0.0).unwrap()
    }

    #[test]
    fn reconcile_drops_relationship_to_missing_peer_and_reports_material() {
        let mut entities = IndexMap::new();
        let mut entity = spawn_entity(0.0);
        let ghost = EntityId::new();
        entity.relationships.insert(ghost, Bond::new(0.0));
        let id = entity.id;
        entities.insert(id, entity);

        let warnings = reconcile(&mut entities, &IndexMap::new());
        assert!(entities[&id].relationships.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn reconcile_keeps_relationship_to_present_peer() {
        let mut a = spawn_entity(0.0);
        let b = spawn_entity(10.0);
        let (id_a, id_b) = (a.id, b.id);
        a.relationships.insert(id_b, Bond::new(0.0));

        let mut entities = IndexMap::new();
        entities.insert(id_a, a);
        entities.insert(id_b, b);

        let mut materials = IndexMap::new();
        materials.insert("spark".to_string(), MaterialSpec::minimal("spark"));
        let warnings = reconcile(&mut entities, &materials);
        assert!(warnings.is_empty());
        assert!(entities[&id_a].relationships.contains_key(&id_b));
    }

    #[test]
    fn reconcile_clears_dangling_intent_target() {
        let material = MaterialSpec::minimal("spark");
        let mut entity = EntityBuilder::new().with_intent().build(&material, 0.0).unwrap();
        let ghost = EntityId::new();
        entity
            .intent
            .as_mut()
            .unwrap()
            .push(Intent::new(crate::intent::Goal::Approach, 0.5, 1.0, 0.0).with_target(ghost));
        let id = entity.id;

        let mut entities = IndexMap::new();
        entities.insert(id, entity);
        let mut materials = IndexMap::new();
        materials.insert("spark".to_string(), material);

        let warnings = reconcile(&mut entities, &materials);
        assert_eq!(warnings.len(), 1);
        assert!(entities[&id].intent.as_ref().unwrap().current().unwrap().target.is_none());
    }
}
