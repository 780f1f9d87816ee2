//! Builder for constructing entities with opt-in ontology components.
//!
//! Each sub-system (memory, emotion, intent) is modeled as present-or-absent
//! on the entity (§9 "optional mixin ontology in source") — `with_memory`
//! etc. insert the component; there is no runtime class extension.

use crate::emotion::Pad;
use crate::entity::Entity;
use crate::material::MaterialSpec;
use crate::memory::{MemoryBuffer, MemoryLog};
use crate::types::EntityId;
use std::fmt;

/// Error returned when an entity cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBuildError {
    /// Description of what made the configuration invalid.
    pub reason: String,
}

impl fmt::Display for EntityBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot build entity: {}", self.reason)
    }
}

impl std::error::Error for EntityBuildError {}

/// Fluent builder for `Entity`.
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    x: f64,
    y: f64,
    entropy: f64,
    energy: f64,
    is_autonomous: bool,
    enable_memory: bool,
    enable_memory_log: bool,
    enable_emotion: bool,
    enable_intent: bool,
    emotion_baseline: Option<Pad>,
    language_preference: Vec<String>,
}

impl EntityBuilder {
    /// Starts a new builder at the origin, with no optional components enabled.
    #[must_use]
    pub fn new() -> Self {
        EntityBuilder::default()
    }

    /// Sets the spawn position.
    #[must_use]
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Sets the entropy/energy scalars sampled at spawn.
    #[must_use]
    pub fn sampled_scalars(mut self, entropy: f64, energy: f64) -> Self {
        self.entropy = entropy.clamp(0.0, 1.0);
        self.energy = energy.clamp(0.0, 1.0);
        self
    }

    /// Enables autonomous intent generation.
    #[must_use]
    pub fn autonomous(mut self, value: bool) -> Self {
        self.is_autonomous = value;
        self
    }

    /// Enables the memory ring buffer.
    #[must_use]
    pub fn with_memory(mut self) -> Self {
        self.enable_memory = true;
        self
    }

    /// Enables the CRDT-replicated memory log.
    #[must_use]
    pub fn with_memory_log(mut self) -> Self {
        self.enable_memory_log = true;
        self
    }

    /// Enables PAD emotion, optionally with a specific baseline.
    #[must_use]
    pub fn with_emotion(mut self, baseline: Option<Pad>) -> Self {
        self.enable_emotion = true;
        self.emotion_baseline = baseline;
        self
    }

    /// Enables the intent stack.
    #[must_use]
    pub fn with_intent(mut self) -> Self {
        self.enable_intent = true;
        self
    }

    /// Sets the ordered language preference list.
    #[must_use]
    pub fn language_preference(mut self, languages: Vec<String>) -> Self {
        self.language_preference = languages;
        self
    }

    /// Builds the entity against `material`, publishing the spawn memory
    /// event (§3.3) if memory is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the spawn position is non-finite.
    pub fn build(self, material: &MaterialSpec, now: f64) -> Result<Entity, EntityBuildError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(EntityBuildError {
                reason: "spawn position must be finite".to_string(),
            });
        }

        let id = EntityId::new();
        let mut entity = Entity {
            id,
            material_id: material.id.clone(),
            x: self.x,
            y: self.y,
            vx: 0.0,
            vy: 0.0,
            age: 0.0,
            entropy: self.entropy,
            energy: self.energy,
            opacity: material.start_opacity(),
            emotion: if self.enable_emotion {
                Some(self.emotion_baseline.unwrap_or_else(|| {
                    material
                        .ontology
                        .emotion_baseline
                        .unwrap_or_else(Pad::neutral)
                }))
            } else {
                None
            },
            memory: if self.enable_memory {
                Some(MemoryBuffer::new(material.memory_size()))
            } else {
                None
            },
            memory_log: if self.enable_memory_log {
                Some(MemoryLog::new(id))
            } else {
                None
            },
            intent: if self.enable_intent {
                Some(Default::default())
            } else {
                None
            },
            relationships: Default::default(),
            cognitive_links: Default::default(),
            needs: Default::default(),
            trigger_context: Default::default(),
            language_preference: self.language_preference,
            is_autonomous: self.is_autonomous,
            timers: Vec::new(),
        };

        for need in &material.needs {
            entity.needs.insert(
                need.id.clone(),
                crate::needs::Need::new(
                    need.initial,
                    need.depletion_rate,
                    need.critical_threshold,
                    need.emotional_impact,
                ),
            );
        }

        if let Some(memory) = entity.memory.as_mut() {
            memory.add(crate::memory::MemoryEvent::new(
                now,
                crate::memory::MemoryKind::Spawn,
                "self",
                "spawned",
                1.0,
            ));
        }

        Ok(entity)
    }
}
