//! The observer registry exposed to collaborators (§6.3) and the
//! diagnostics channel that replaces stdout/stderr output (§7, §9).

use crate::climate::Climate;
use crate::error::ErrorPath;
use crate::types::EntityId;
use std::collections::HashMap;

/// Severity of a published diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational; no action required.
    Info,
    /// Something was skipped or defaulted; worth noticing.
    Warning,
    /// A recoverable error occurred synchronously.
    Error,
}

/// A diagnostic message, published instead of writing to stdout/stderr.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How severe the diagnostic is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Where in the world the diagnostic arose.
    pub path: ErrorPath,
}

/// A typed event emitted by the world (§6.3).
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// An entity was spawned.
    Spawn {
        /// The new entity.
        entity: EntityId,
    },
    /// An entity was destroyed.
    Destroy {
        /// The removed entity.
        entity: EntityId,
    },
    /// An utterance was recorded in the transcript.
    Utterance {
        /// Who spoke.
        speaker: EntityId,
        /// Who was addressed, if anyone.
        listener: Option<EntityId>,
        /// The utterance text.
        text: String,
    },
    /// A new lexicon term crystallized.
    EmergenceChunk {
        /// The normalized term.
        term: String,
    },
    /// The world-level emotional climate changed materially.
    ClimateChange {
        /// The climate state after the change.
        climate: Climate,
    },
    /// A memory crystal formed or was reinforced.
    CrystalForm {
        /// The crystal's subject.
        subject: String,
    },
    /// A cognitive link formed.
    LinkForm {
        /// The source entity.
        from: EntityId,
        /// The target entity.
        to: EntityId,
    },
    /// A cognitive link decayed below the prune threshold and was removed.
    LinkDecay {
        /// The source entity.
        from: EntityId,
        /// The target entity.
        to: EntityId,
    },
    /// Two entities came within proximity-hook range.
    Proximity {
        /// One of the two entities.
        a: EntityId,
        /// The other entity.
        b: EntityId,
        /// Distance between them.
        distance: f64,
    },
    /// A per-entity timer elapsed.
    TimerFire {
        /// The entity whose timer fired.
        entity: EntityId,
        /// The timer's name.
        name: String,
    },
    /// A diagnostic, in place of stdout/stderr output.
    Diagnostic(Diagnostic),
}

impl DomainEvent {
    /// The event-name key used for subscription (§6.3).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::Spawn { .. } => "spawn",
            DomainEvent::Destroy { .. } => "destroy",
            DomainEvent::Utterance { .. } => "utterance",
            DomainEvent::EmergenceChunk { .. } => "emergence.chunk",
            DomainEvent::ClimateChange { .. } => "climate.change",
            DomainEvent::CrystalForm { .. } => "crystal.form",
            DomainEvent::LinkForm { .. } => "link.form",
            DomainEvent::LinkDecay { .. } => "link.decay",
            DomainEvent::Proximity { .. } => "proximity",
            DomainEvent::TimerFire { .. } => "timer.fire",
            DomainEvent::Diagnostic(_) => "diagnostic",
        }
    }
}

/// Observer registry: synchronous handlers keyed by event name, plus a
/// wildcard (`"*"`) subscription that receives every event.
#[derive(Default)]
pub struct Observers {
    handlers: HashMap<&'static str, Vec<Box<dyn FnMut(&DomainEvent)>>>,
    wildcard: Vec<Box<dyn FnMut(&DomainEvent)>>,
    /// All events emitted since construction, kept for inspection/testing.
    log: Vec<DomainEvent>,
    log_enabled: bool,
}

impl Observers {
    /// Creates an empty registry. `log_enabled` controls whether emitted
    /// events are retained in the optional event log (§3.2).
    #[must_use]
    pub fn new(log_enabled: bool) -> Self {
        Observers {
            handlers: HashMap::new(),
            wildcard: Vec::new(),
            log: Vec::new(),
            log_enabled,
        }
    }

    /// Registers a handler for a specific event name.
    pub fn on(&mut self, name: &'static str, handler: impl FnMut(&DomainEvent) + 'static) {
        self.handlers.entry(name).or_default().push(Box::new(handler));
    }

    /// Registers a handler invoked for every event.
    pub fn on_any(&mut self, handler: impl FnMut(&DomainEvent) + 'static) {
        self.wildcard.push(Box::new(handler));
    }

    /// Dispatches `event` to every matching handler, then to wildcard
    /// handlers, in registration order, and records it if logging is on.
    pub fn emit(&mut self, event: DomainEvent) {
        if let Some(handlers) = self.handlers.get_mut(event.name()) {
            for handler in handlers {
                handler(&event);
            }
        }
        for handler in &mut self.wildcard {
            handler(&event);
        }
        if self.log_enabled {
            self.log.push(event);
        }
    }

    /// The retained event log, if logging is enabled.
    #[must_use]
    pub fn log(&self) -> &[DomainEvent] {
        &self.log
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribed_names", &self.handlers.keys().collect::<Vec<_>>())
            .field("log_len", &self.log.len())
            .finish()
    }
}
