//! The material specification value type (§6.1), consumed pre-parsed.
//!
//! The core never parses a declarative material-definition document from
//! text; it receives an already-constructed `MaterialSpec`. Parsing and
//! validating user-authored documents is an external collaborator's job.

use crate::emotion::Pad;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A transition from a trigger-context predicate to a target emotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionTransition {
    /// The trigger-context path inspected, e.g. `"user.silence"`.
    pub key: String,
    /// The comparison operator, e.g. `">"`, `"<"`, `"=="`.
    pub op: String,
    /// The right-hand side of the comparison.
    pub value: f64,
    /// The PAD state to move toward when the predicate holds.
    pub target: Pad,
    /// How strongly to resonate toward `target` (0..=1).
    pub intensity: f64,
}

/// Visual/manifestation metadata: aging curve and a display glyph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifestation {
    /// Optional display glyph (e.g. an emoji), opaque to the core.
    pub emoji: Option<String>,
    /// Starting opacity, if aging is configured.
    pub start_opacity: Option<f64>,
    /// Opacity lost per second, if aging is configured.
    pub decay_rate: Option<f64>,
}

/// Physical properties consulted by the engine's force law and bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Physics {
    /// Entity mass; currently informational (forces are mass-free per §4.1).
    pub mass: Option<f64>,
    /// Velocity damping applied per tick. Default 0.02.
    pub friction: Option<f64>,
    /// Bounce damping at world bounds. Default 0.85.
    pub bounce: Option<f64>,
    /// Radius within which pairwise forces apply. Default 160.
    pub proximity_radius: Option<f64>,
}

/// Ontology defaults applied at spawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyDefaults {
    /// Ring-buffer capacity for memories. Default 500.
    pub memory_size: Option<usize>,
    /// Baseline PAD state the entity drifts toward.
    pub emotion_baseline: Option<Pad>,
}

/// A declarative resource-need definition, instantiated per entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedDefinition {
    /// The resource id, e.g. `"energy"` or `"water"`.
    pub id: String,
    /// Starting and maximum level.
    pub initial: f64,
    /// Level lost per second.
    pub depletion_rate: f64,
    /// Below this level the need is critical and impacts emotion.
    pub critical_threshold: f64,
    /// PAD delta applied (scaled by severity) while critical.
    pub emotional_impact: Pad,
}

/// A field's declarative spec: lifetime and effect payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field lifetime in seconds. `None` means the field never expires.
    pub duration: Option<f64>,
    /// Effect radius.
    pub radius: f64,
    /// Opaque payload data forwarded to field-effect hooks.
    pub payload: HashMap<String, f64>,
}

/// A pre-parsed material specification, consumed by the core (§6.1).
///
/// All sections beyond `id` are optional; absent sections fall back to
/// the documented defaults listed next to each field above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Stable material identifier.
    pub id: String,
    /// Document schema version, opaque to the core.
    pub schema_version: Option<String>,
    /// Short textual essence, keyed by language code when localized.
    pub essence: IndexMap<String, String>,
    /// Display/aging metadata.
    pub manifestation: Manifestation,
    /// Physical properties.
    pub physics: Physics,
    /// Ontology defaults applied at spawn.
    pub ontology: OntologyDefaults,
    /// Emotion transition table.
    pub transitions: Vec<EmotionTransition>,
    /// Need definitions instantiated per entity.
    pub needs: Vec<NeedDefinition>,
    /// Ordered language preference, first non-empty wins.
    pub language_profile: Vec<String>,
    /// Declarative field spec, consulted by `World::spawn_field`.
    pub field: Option<FieldSpec>,
}

impl MaterialSpec {
    /// Builds a minimal material with only an id; every other section
    /// falls back to its documented default.
    #[must_use]
    pub fn minimal(id: impl Into<String>) -> Self {
        MaterialSpec {
            id: id.into(),
            schema_version: None,
            essence: IndexMap::new(),
            manifestation: Manifestation::default(),
            physics: Physics::default(),
            ontology: OntologyDefaults::default(),
            transitions: Vec::new(),
            needs: Vec::new(),
            language_profile: Vec::new(),
            field: None,
        }
    }

    /// Friction, falling back to the documented default of 0.02.
    #[must_use]
    pub fn friction(&self) -> f64 {
        self.physics.friction.unwrap_or(0.02)
    }

    /// Proximity radius, falling back to the documented default of 160.
    #[must_use]
    pub fn proximity_radius(&self) -> f64 {
        self.physics.proximity_radius.unwrap_or(160.0)
    }

    /// Bounce damping, falling back to the documented default of 0.85.
    #[must_use]
    pub fn bounce_damping(&self) -> f64 {
        self.physics.bounce.unwrap_or(0.85)
    }

    /// Opacity aging rate, falling back to 0 (no aging) when unset.
    #[must_use]
    pub fn aging_decay_rate(&self) -> f64 {
        self.manifestation.decay_rate.unwrap_or(0.0)
    }

    /// Starting opacity, falling back to 1.0 when unset.
    #[must_use]
    pub fn start_opacity(&self) -> f64 {
        self.manifestation.start_opacity.unwrap_or(1.0)
    }

    /// Memory ring-buffer capacity, falling back to the documented default of 500.
    #[must_use]
    pub fn memory_size(&self) -> usize {
        self.ontology.memory_size.unwrap_or(500)
    }
}
