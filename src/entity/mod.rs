//! The entity data model (§3.1) and its builder.

mod builder;
mod timer;

pub use builder::{EntityBuildError, EntityBuilder};
pub use timer::Timer;

use crate::cognitive::LinkTable;
use crate::emotion::Pad;
use crate::intent::IntentStack;
use crate::memory::{MemoryBuffer, MemoryLog};
use crate::needs::Need;
use crate::relationship::Bond;
use crate::types::{EntityId, TriggerContext};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A living agent in the simulation.
///
/// Ontology sub-systems (`emotion`, `memory`, `intent`) are each either
/// present or absent, modeling the source's opt-in behavior without any
/// form of runtime class extension (§9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable 128-bit identifier, unique within the world.
    pub id: EntityId,
    /// The material this entity was spawned from. Read-only after spawn.
    pub material_id: String,
    /// World-space position.
    pub x: f64,
    /// World-space position.
    pub y: f64,
    /// Velocity.
    pub vx: f64,
    /// Velocity.
    pub vy: f64,
    /// Seconds since spawn; monotonically non-decreasing.
    pub age: f64,
    /// Sampled at spawn, in `[0, 1]`.
    pub entropy: f64,
    /// Sampled at spawn, in `[0, 1]`.
    pub energy: f64,
    /// Decays with the material's aging rate, in `[0, 1]`.
    pub opacity: f64,
    /// PAD emotional state, if this entity has one.
    pub emotion: Option<Pad>,
    /// Bounded ring buffer of recent memories, if enabled.
    pub memory: Option<MemoryBuffer>,
    /// CRDT-replicated memory log, if enabled.
    pub memory_log: Option<MemoryLog>,
    /// Goal stack, if enabled.
    pub intent: Option<IntentStack>,
    /// Peer-id keyed relationship bonds.
    pub relationships: IndexMap<EntityId, Bond>,
    /// Peer-id keyed outgoing cognitive links.
    pub cognitive_links: LinkTable,
    /// Resource-id keyed needs.
    pub needs: IndexMap<String, Need>,
    /// Dotted-path keyed context values.
    pub trigger_context: TriggerContext,
    /// Ordered language codes; first non-empty wins.
    pub language_preference: Vec<String>,
    /// Whether autonomous intent generation is enabled.
    pub is_autonomous: bool,
    /// Per-entity autonomous timers.
    pub timers: Vec<Timer>,
}

impl Entity {
    /// Distance to another entity's position.
    #[must_use]
    pub fn distance_to(&self, other: &Entity) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True iff position and velocity are all finite.
    #[must_use]
    pub fn is_kinematically_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }

    /// The first non-empty preferred language, if any.
    #[must_use]
    pub fn preferred_language(&self) -> Option<&str> {
        self.language_preference
            .iter()
            .map(String::as_str)
            .find(|l| !l.is_empty())
    }
}
