//! lexicrucible
//!
//! A deterministic, agent-based social simulation kernel. Entities carry
//! memory, emotion, intent, relationships, and cognitive links; a tick
//! loop advances them through a spatial-indexed force law, emergent
//! language crystallizes out of their transcript, and a global emotional
//! climate accumulates from what happens to them.
//!
//! # Core Concepts
//!
//! - **World**: the orchestrator — owns every entity, the RNG, the clock,
//!   and every ambient subsystem; `World::tick` is the only way time moves.
//! - **Entity**: a living agent with an opt-in ontology (emotion, memory,
//!   intent, needs are each present or absent, never bolted on at runtime).
//! - **MaterialSpec**: a pre-parsed, declarative template entities are
//!   spawned from; the core never parses material documents from text.
//! - **Pad**: the Pleasure-Arousal-Dominance affect model entities feel,
//!   resonate toward, and drift back from.
//!
//! # Determinism
//!
//! Every draw of randomness in the simulation goes through the `World`'s
//! single seeded `DeterministicRng`. No core subsystem reads the wall
//! clock or system entropy; replaying the same seed and the same `tick(dt)`
//! sequence reproduces the same trace exactly.
//!
//! # Example
//!
//! ```
//! use lexicrucible::material::MaterialSpec;
//! use lexicrucible::world::WorldBuilder;
//!
//! let mut world = WorldBuilder::new(42).build();
//! world.register_material(MaterialSpec::minimal("ember"));
//! let entity = world.spawn("ember", Some(10.0), Some(10.0)).unwrap();
//! world.tick(1.0).unwrap();
//! assert!(world.entity(entity).is_some());
//! ```
//!
//! # Consumer API Model
//!
//! A consumer drives the simulation by registering materials, spawning
//! entities, and calling `World::tick(dt)` in a loop; state is read back
//! via `World::entity`/`entities`/`climate`/`lexicon`/`memory_crystals`.
//! Diagnostics and domain events surface through `World::observers_mut`
//! rather than stdout/stderr. `World::snapshot`/`World::restore` give a
//! consumer a way to persist and resume a world across process restarts.

pub mod climate;
pub mod cognitive;
pub mod emotion;
pub mod engine;
pub mod entity;
pub mod error;
pub mod events;
pub mod expr;
pub mod field;
pub mod generator;
pub mod intent;
pub mod lexicon;
pub mod material;
pub mod memory;
pub mod needs;
pub mod relationship;
pub mod rng;
pub mod snapshot;
pub mod spatial;
pub mod types;
pub mod world;

// Re-export the world and its configuration at crate root.
pub use world::{RestoreReport, RestoreWarning, World, WorldBuilder, WorldConfig};

// Re-export entity types at crate root.
pub use entity::{Entity, EntityBuildError, EntityBuilder};

// Re-export commonly used shared types at crate root.
pub use types::{CrystalId, EntityId, FieldId, ResourceFieldId, TriggerContext, TriggerValue};

// Re-export error types at crate root.
pub use error::{ErrorKind, ErrorPath, SimError, SimResult};

// Re-export the material specification at crate root.
pub use material::MaterialSpec;

// Re-export the emotion model at crate root.
pub use emotion::Pad;

// Re-export the emergent-language types at crate root.
pub use lexicon::{Lexicon, LexiconTerm, TermCategory, Transcript, Utterance};

// Re-export the emotional climate at crate root.
pub use climate::Climate;

// Re-export the generator port at crate root.
pub use generator::{Generator, GeneratorError, GeneratorPrompt, GeneratorReply, StubGenerator};

// Re-export domain events and observers at crate root.
pub use events::{Diagnostic, DomainEvent, Observers, Severity};

// Re-export the snapshot type at crate root.
pub use snapshot::Snapshot;
