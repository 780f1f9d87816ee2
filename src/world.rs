//! The world: orchestrator owning every subsystem, time, and the
//! deterministic tick loop (component O, §4.1, §6.4).

use crate::climate::Climate;
use crate::cognitive::{self, CognitiveSignal, LinkTable, SignalDelivery};
use crate::engine::{self, EngineConfig};
use crate::entity::{Entity, EntityBuilder};
use crate::error::{ErrorKind, ErrorPath, SimError, SimResult};
use crate::events::{DomainEvent, Diagnostic, Observers, Severity};
use crate::field::Field;
use crate::generator::{Generator, GeneratorPrompt, StubGenerator};
use crate::intent::{self, Goal, Intent, ReasoningContext};
use crate::lexicon::{crystallizer, CrystallizerConfig, Lexicon};
use crate::material::MaterialSpec;
use crate::memory::buffer::{MemoryEvent, MemoryFilter, MemoryKind};
use crate::memory::crystal::{self, MemoryCrystal, MemoryCrystallizerConfig};
use crate::needs::{Need, ResourceField};
use crate::relationship::{self, Bond, DecayConfig as RelationshipDecayConfig};
use crate::rng::DeterministicRng;
use crate::snapshot::{self, Snapshot};
use crate::spatial::SpatialGrid;
use crate::types::{CrystalId, EntityId, FieldId, ResourceFieldId, TriggerContext, TriggerValue};
use indexmap::IndexMap;
use std::collections::HashMap;
use uuid::Uuid;

/// World-level configuration: one field per configurable subsystem,
/// mirroring the teacher's per-subsystem builder structs (SPEC_FULL.md
/// Ambient stack).
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Engine (tick core) configuration.
    pub engine: EngineConfig,
    /// Relationship decay configuration, applied uniformly to every bond.
    pub relationship_decay: RelationshipDecayConfig,
    /// Linguistic crystallizer configuration.
    pub crystallizer: CrystallizerConfig,
    /// Memory crystallizer configuration.
    pub memory_crystallizer: MemoryCrystallizerConfig,
    /// Climate drift rate per second. Default 0.001.
    pub climate_decay_rate: f64,
    /// Transcript ring-buffer capacity. Default 1000.
    pub transcript_capacity: usize,
    /// Cognitive-link decay rate applied per tick. Default 0.02.
    pub cognitive_link_decay_rate: f64,
    /// Minimum strength for a propagated signal to keep traveling.
    pub signal_min_strength: f64,
    /// Maximum hops a propagated signal may travel.
    pub signal_max_hops: u32,
    /// Weight of emotion influence in the intent reasoner. Default 0.6.
    pub reasoner_emotion_weight: f64,
    /// Confidence threshold below which an intent is abandoned. Default 0.3.
    pub reasoner_confidence_threshold: f64,
    /// Run the memory crystallizer every this many ticks. Default 50.
    pub memory_crystallize_every: u64,
    /// Whether the optional event log retains emitted events.
    pub log_events: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            engine: EngineConfig::default(),
            relationship_decay: RelationshipDecayConfig::default(),
            crystallizer: CrystallizerConfig::default(),
            memory_crystallizer: MemoryCrystallizerConfig::default(),
            climate_decay_rate: 0.001,
            transcript_capacity: 1000,
            cognitive_link_decay_rate: 0.02,
            signal_min_strength: 0.05,
            signal_max_hops: 4,
            reasoner_emotion_weight: 0.6,
            reasoner_confidence_threshold: 0.3,
            memory_crystallize_every: 50,
            log_events: false,
        }
    }
}

/// Fluent builder for `World`, per SPEC_FULL.md's "Configuration" ambient
/// stack section.
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    config: WorldConfig,
    seed: u32,
}

impl WorldBuilder {
    /// Starts a builder with documented defaults and the given RNG seed.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        WorldBuilder {
            config: WorldConfig::default(),
            seed,
        }
    }

    /// Overrides the engine configuration.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    /// Overrides the relationship decay configuration.
    #[must_use]
    pub fn with_relationship_decay(mut self, decay: RelationshipDecayConfig) -> Self {
        self.config.relationship_decay = decay;
        self
    }

    /// Overrides the linguistic crystallizer configuration.
    #[must_use]
    pub fn with_crystallizer(mut self, crystallizer: CrystallizerConfig) -> Self {
        self.config.crystallizer = crystallizer;
        self
    }

    /// Overrides the transcript capacity.
    #[must_use]
    pub fn with_transcript_capacity(mut self, capacity: usize) -> Self {
        self.config.transcript_capacity = capacity;
        self
    }

    /// Enables the optional retained event log.
    #[must_use]
    pub fn with_event_log(mut self, enabled: bool) -> Self {
        self.config.log_events = enabled;
        self
    }

    /// Builds the `World`. Never fails: every field has a documented default.
    #[must_use]
    pub fn build(self) -> World {
        World::from_config(self.seed, self.config)
    }
}

/// A missing-reference warning surfaced during `World::restore` (§4.12,
/// §7 `MissingReference`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreWarning {
    /// What was missing.
    pub message: String,
}

/// The report returned alongside a restored world.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    /// Every item skipped during restore, in the order encountered.
    pub skipped: Vec<RestoreWarning>,
}

/// The simulation kernel: entities, fields, spatial index, RNG, clock,
/// transcript, lexicon, memory crystals, and emotional climate.
pub struct World {
    id: Uuid,
    clock: f64,
    tick_count: u64,
    rng: DeterministicRng,
    entities: IndexMap<EntityId, Entity>,
    grid: SpatialGrid,
    fields: IndexMap<FieldId, Field>,
    resource_fields: IndexMap<ResourceFieldId, ResourceField>,
    materials: IndexMap<String, MaterialSpec>,
    transcript: crate::lexicon::Transcript,
    lexicon: Lexicon,
    memory_crystals: IndexMap<CrystalId, MemoryCrystal>,
    climate: Climate,
    observers: Observers,
    config: WorldConfig,
    poisoned: Option<SimError>,
}

impl World {
    fn from_config(seed: u32, config: WorldConfig) -> Self {
        let cell_size = config.engine.bounds.max_x.min(160.0).max(1.0);
        World {
            id: Uuid::new_v4(),
            clock: 0.0,
            tick_count: 0,
            rng: DeterministicRng::new(seed),
            entities: IndexMap::new(),
            grid: SpatialGrid::new(cell_size.max(160.0)),
            fields: IndexMap::new(),
            resource_fields: IndexMap::new(),
            materials: IndexMap::new(),
            transcript: crate::lexicon::Transcript::new(config.transcript_capacity),
            lexicon: Lexicon::new(),
            memory_crystals: IndexMap::new(),
            climate: Climate::baseline(),
            observers: Observers::new(config.log_events),
            config,
            poisoned: None,
        }
    }

    /// The world's stable id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// World-time in seconds.
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Number of ticks advanced so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Read-only access to the observer registry (§6.3).
    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.observers
    }

    /// Read-only access to the world's configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Read-only access to the emotional climate (§4.10).
    #[must_use]
    pub fn climate(&self) -> Climate {
        self.climate
    }

    /// Read-only access to the lexicon (§4.8).
    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Read-only access to the transcript (§4.8).
    #[must_use]
    pub fn transcript(&self) -> &crate::lexicon::Transcript {
        &self.transcript
    }

    /// Read-only access to memory crystals (§4.9).
    #[must_use]
    pub fn memory_crystals(&self) -> &IndexMap<CrystalId, MemoryCrystal> {
        &self.memory_crystals
    }

    /// Read-only access to a single entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access to a single entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Every live entity, in insertion order (§5 ordering guarantee).
    #[must_use]
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// True iff the world is poisoned after an `Internal` error (§5, §7).
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// The error that poisoned the world, if any.
    #[must_use]
    pub fn poison_reason(&self) -> Option<&SimError> {
        self.poisoned.as_ref()
    }

    /// Registers a material so it can be referenced by id at spawn and
    /// during restore (§9 "global mutable state... owned by the world").
    pub fn register_material(&mut self, material: MaterialSpec) {
        self.materials.insert(material.id.clone(), material);
    }

    /// Looks up a registered material by id.
    #[must_use]
    pub fn material(&self, id: &str) -> Option<&MaterialSpec> {
        self.materials.get(id)
    }

    fn diagnostic(&mut self, severity: Severity, message: impl Into<String>, path: ErrorPath) {
        self.observers.emit(DomainEvent::Diagnostic(Diagnostic {
            severity,
            message: message.into(),
            path,
        }));
    }

    fn poison(&mut self, message: impl Into<String>) -> SimError {
        let err = SimError::internal(message, self.tick_count);
        self.diagnostic(Severity::Error, err.message.clone(), err.path.clone());
        self.poisoned = Some(err.clone());
        err
    }

    /// Spawns a new entity from a registered material, at an explicit
    /// position or (if omitted) a random position in the default spawn
    /// range (§4.1 `spawn`).
    ///
    /// # Errors
    ///
    /// Returns `BadInput` if the material is unregistered or the spawn
    /// position is non-finite.
    pub fn spawn(&mut self, material_id: &str, x: Option<f64>, y: Option<f64>) -> SimResult<EntityId> {
        let material = self
            .materials
            .get(material_id)
            .ok_or_else(|| SimError::bad_input(format!("unknown material '{material_id}'")))?
            .clone();

        let x = x.unwrap_or_else(|| self.rng.next_f64() * 480.0);
        let y = y.unwrap_or_else(|| self.rng.next_f64() * 320.0);
        let entropy = self.rng.next_f64();
        let energy = self.rng.next_f64();

        let entity = EntityBuilder::new()
            .position(x, y)
            .sampled_scalars(entropy, energy)
            .with_memory()
            .with_memory_log()
            .with_emotion(None)
            .with_intent()
            .language_preference(material.language_profile.clone())
            .build(&material, self.clock)
            .map_err(|e| SimError::bad_input(e.to_string()))?;

        let id = entity.id;
        self.grid.insert(id, entity.x, entity.y);
        self.entities.insert(id, entity);
        self.observers.emit(DomainEvent::Spawn { entity: id });
        Ok(id)
    }

    /// Spawns a field from a material's field spec (§4.1 `spawnField`).
    ///
    /// # Errors
    ///
    /// Returns `BadInput` if the material is unregistered or has no field spec.
    pub fn spawn_field(&mut self, material_id: &str, x: f64, y: f64) -> SimResult<FieldId> {
        let material = self
            .materials
            .get(material_id)
            .ok_or_else(|| SimError::bad_input(format!("unknown material '{material_id}'")))?;
        let spec = material
            .field
            .as_ref()
            .ok_or_else(|| SimError::bad_input(format!("material '{material_id}' has no field spec")))?;
        let field = Field::spawn(
            material_id.to_string(),
            x,
            y,
            spec.radius,
            spec.duration,
            spec.payload.clone(),
        );
        let id = field.id;
        self.fields.insert(id, field);
        Ok(id)
    }

    /// Removes an entity; updates the climate by its salience-weighted
    /// grief contribution before removal (§3.3, §4.1 `removeEntity`).
    pub fn remove_entity(&mut self, id: EntityId) {
        let Some(entity) = self.entities.shift_remove(&id) else {
            return;
        };
        self.grid.remove(id);
        let salience = entity
            .memory
            .as_ref()
            .map(|m| m.events().iter().map(|e| e.salience).fold(0.0_f64, f64::max))
            .unwrap_or(0.5);
        self.climate.record_entity_death(salience);
        self.observers
            .emit(DomainEvent::ClimateChange { climate: self.climate });
        self.observers.emit(DomainEvent::Destroy { entity: id });
    }

    /// Appends an utterance to the transcript (§6.4 `recordSpeech`).
    pub fn record_speech(
        &mut self,
        speaker: EntityId,
        text: impl Into<String>,
        listener: Option<EntityId>,
    ) {
        let emotion = self.entities.get(&speaker).and_then(|e| e.emotion);
        let text = text.into();
        self.transcript
            .record(speaker, listener, text.clone(), self.clock, emotion);
        self.observers.emit(DomainEvent::Utterance {
            speaker,
            listener,
            text,
        });
    }

    /// Fans a typed event out to every entity's `triggerContext` as
    /// `event.<type>` and merges `payload` under that prefix (§6.4
    /// `broadcastEvent`).
    pub fn broadcast_event(&mut self, event_type: &str, payload: &[(&str, TriggerValue)]) {
        for entity in self.entities.values_mut() {
            entity.trigger_context.set(format!("event.{event_type}"), true);
            for (key, value) in payload {
                entity
                    .trigger_context
                    .set(format!("event.{event_type}.{key}"), value.clone());
            }
        }
    }

    /// Merges `context` into every entity's `triggerContext` (§6.4
    /// `broadcastContext`).
    pub fn broadcast_context(&mut self, context: &TriggerContext) {
        for entity in self.entities.values_mut() {
            entity.trigger_context.merge(context);
        }
    }

    /// Registers a resource field (§6.4 `addResourceField`).
    pub fn add_resource_field(&mut self, field: ResourceField) -> ResourceFieldId {
        let id = field.id;
        self.resource_fields.insert(id, field);
        id
    }

    /// The strongest intensity of `resource_type` available at `(x, y)`
    /// (§6.4 `getResourceIntensity`).
    #[must_use]
    pub fn resource_intensity(&self, resource_type: &str, x: f64, y: f64) -> f64 {
        self.resource_fields
            .values()
            .filter(|f| f.resource_type == resource_type)
            .map(|f| f.intensity_at(x, y))
            .fold(0.0_f64, f64::max)
    }

    /// Consumes up to `amount` of `resource_type` at `(x, y)` from the
    /// strongest matching field, returning the quantity consumed (§6.4
    /// `consumeResource`).
    ///
    /// # Errors
    ///
    /// Returns `BadInput` if no field of `resource_type` exists anywhere.
    pub fn consume_resource(&mut self, resource_type: &str, x: f64, y: f64, amount: f64) -> SimResult<f64> {
        let strongest = self
            .resource_fields
            .values_mut()
            .filter(|f| f.resource_type == resource_type)
            .max_by(|a, b| {
                a.intensity_at(x, y)
                    .partial_cmp(&b.intensity_at(x, y))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        match strongest {
            Some(field) => Ok(field.consume(x, y, amount)),
            None => Err(SimError::bad_input(format!("unknown resource '{resource_type}'"))),
        }
    }

    /// Propagates a cognitive signal through the live link graph (§4.7),
    /// applying each delivery's effect and returning the deliveries made.
    pub fn propagate_signal(&mut self, signal: CognitiveSignal) -> Vec<SignalDelivery> {
        let mut graph: IndexMap<EntityId, LinkTable> = IndexMap::new();
        for (&id, entity) in &self.entities {
            graph.insert(id, entity.cognitive_links.clone());
        }
        let deliveries = cognitive::propagate(
            &signal,
            &graph,
            self.config.cognitive_link_decay_rate,
            self.config.signal_min_strength,
            self.config.signal_max_hops,
        );
        for delivery in &deliveries {
            self.apply_signal_delivery(delivery);
        }
        deliveries
    }

    fn apply_signal_delivery(&mut self, delivery: &SignalDelivery) {
        let Some(entity) = self.entities.get_mut(&delivery.receiver) else {
            return;
        };
        match &delivery.signal.payload {
            cognitive::SignalPayload::Memory(content) => {
                if let Some(memory) = entity.memory.as_mut() {
                    memory.add(
                        MemoryEvent::new(
                            self.clock,
                            MemoryKind::Interaction,
                            delivery.signal.source.to_string(),
                            content.clone(),
                            delivery.arrived_strength,
                        )
                        .with_metadata("hops", crate::memory::MetadataValue::Number(f64::from(delivery.hops))),
                    );
                }
            }
            cognitive::SignalPayload::Emotion(pad) => {
                if let Some(emotion) = entity.emotion.as_mut() {
                    emotion.resonate(*pad, delivery.arrived_strength);
                }
            }
            cognitive::SignalPayload::Custom(_) => {}
        }
    }

    /// Builds a generator prompt for `speaker` from current state and
    /// records the reply as speech, using `generator` for completion
    /// (§6.1, the "generator" port).
    pub fn generate_speech(
        &mut self,
        speaker: EntityId,
        situation: impl Into<String>,
        generator: &mut dyn Generator,
    ) -> SimResult<()> {
        let entity = self
            .entities
            .get(&speaker)
            .ok_or_else(|| SimError::bad_input("unknown speaker"))?;
        let memory_fragments = entity
            .memory
            .as_ref()
            .map(|m| {
                let mut events: Vec<&MemoryEvent> = m.recall(&MemoryFilter::default());
                events.sort_by(|a, b| b.salience.partial_cmp(&a.salience).unwrap());
                events.into_iter().take(3).map(|e| e.content.clone()).collect()
            })
            .unwrap_or_default();
        let prompt = GeneratorPrompt {
            material_id: entity.material_id.clone(),
            emotion: entity.emotion,
            memory_fragments,
            situation: situation.into(),
        };
        match generator.complete(&prompt) {
            Ok(reply) => {
                self.record_speech(speaker, reply.text, None);
                Ok(())
            }
            Err(err) => {
                self.diagnostic(Severity::Warning, err.to_string(), ErrorPath::Entity(speaker.as_uuid()));
                Ok(())
            }
        }
    }

    /// Advances the simulation by `dt` seconds (§4.1 `tick`).
    ///
    /// Deterministic given the same starting snapshot and `dt` sequence.
    /// A poisoned world refuses to run further ticks (§5, §7 `Internal`).
    ///
    /// # Errors
    ///
    /// Returns the poisoning error if the world was already poisoned, or
    /// a fresh `Internal` error if an invariant is violated mid-tick.
    pub fn tick(&mut self, dt: f64) -> SimResult<()> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }

        self.pre_update(dt);
        self.pairwise_interactions(dt);
        self.field_update(dt);
        self.integrate_and_bound();
        self.resource_and_needs_update(dt);
        self.climate_update(dt);
        self.relationship_decay(dt);
        self.cognitive_decay();
        self.crystallizer_pass();
        self.memory_crystallizer_pass();
        self.post_update();

        self.clock += dt;
        self.tick_count += 1;
        Ok(())
    }

    fn material_for(&self, material_id: &str) -> MaterialSpec {
        self.materials
            .get(material_id)
            .cloned()
            .unwrap_or_else(|| MaterialSpec::minimal(material_id))
    }

    fn pre_update(&mut self, dt: f64) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            let material = {
                let entity = &self.entities[&id];
                self.material_for(&entity.material_id)
            };
            let jitter_roll = self.rng.next_f64();
            let tie_break = self.rng.chance(0.5);
            let now = self.clock;
            let entity = self.entities.get_mut(&id).expect("entity present");

            entity.age += dt;
            entity.opacity = (entity.opacity - material.aging_decay_rate() * dt).clamp(0.0, 1.0);
            let (vx, vy) = engine::apply_friction(entity.vx, entity.vy, material.friction());
            entity.vx = vx;
            entity.vy = vy;

            for timer in &mut entity.timers {
                if timer.advance(dt, jitter_roll) {
                    self.observers.emit(DomainEvent::TimerFire {
                        entity: id,
                        name: timer.name.clone(),
                    });
                }
            }

            if entity.is_autonomous {
                if let Some(intent_stack) = entity.intent.as_mut() {
                    if intent_stack.is_empty() {
                        let emotion = entity.emotion.unwrap_or_default();
                        let mut rng = DeterministicRng::from_state(
                            self.rng.state().wrapping_add(if tie_break { 1 } else { 0 }),
                            self.rng.draws(),
                        );
                        let new_intent = intent::autonomous_intent(emotion, now, &mut rng);
                        intent_stack.push(new_intent);
                    }
                }
            }
        }
    }

    fn pairwise_interactions(&mut self, dt: f64) {
        let positions: HashMap<EntityId, (f64, f64)> = self
            .entities
            .iter()
            .map(|(&id, e)| (id, (e.x, e.y)))
            .collect();
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        let proximity_radius = self.config.engine.proximity_hook_radius.max(160.0);
        let mut impulses: HashMap<EntityId, (f64, f64)> = HashMap::new();
        let mut proximity_events: Vec<(EntityId, EntityId, f64)> = Vec::new();

        for &a in &ids {
            let Some(&(ax, ay)) = positions.get(&a) else {
                continue;
            };
            let radius = {
                let material_id = &self.entities[&a].material_id;
                self.material_for(material_id).proximity_radius()
            };
            let neighbors = self.grid.query(ax, ay, radius.max(proximity_radius), &positions, Some(a));
            for b in neighbors {
                if b <= a {
                    continue;
                }
                let Some(&(bx, by)) = positions.get(&b) else {
                    continue;
                };
                let entropy_a = self.entities[&a].entropy;
                let entropy_b = self.entities[&b].entropy;
                if let Some(force) = engine::pairwise_force(
                    ax,
                    ay,
                    bx,
                    by,
                    entropy_a,
                    entropy_b,
                    radius,
                    self.config.engine.proximity_hook_radius,
                    dt,
                ) {
                    let entry_a = impulses.entry(a).or_insert((0.0, 0.0));
                    entry_a.0 += force.impulse_ax;
                    entry_a.1 += force.impulse_ay;
                    let entry_b = impulses.entry(b).or_insert((0.0, 0.0));
                    entry_b.0 -= force.impulse_ax;
                    entry_b.1 -= force.impulse_ay;
                    if force.in_hook_range {
                        proximity_events.push((a, b, force.distance));
                    }
                }
            }
        }

        for (id, (ix, iy)) in impulses {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.vx += ix;
                entity.vy += iy;
            }
        }

        for (a, b, distance) in proximity_events {
            self.observers.emit(DomainEvent::Proximity { a, b, distance });
        }
    }

    fn field_update(&mut self, dt: f64) {
        let positions: Vec<(EntityId, f64, f64)> = self
            .entities
            .iter()
            .map(|(&id, e)| (id, e.x, e.y))
            .collect();

        for field in self.fields.values_mut() {
            field.tick(dt);
            for &(id, x, y) in &positions {
                if field.contains(x, y) {
                    if let Some(entity) = self.entities.get_mut(&id) {
                        if let Some(boost) = field.payload.get("emotion.valence") {
                            if let Some(emotion) = entity.emotion.as_mut() {
                                emotion.feel(crate::emotion::Pad::new(*boost * dt, 0.0, 0.0));
                            }
                        }
                    }
                }
            }
        }

        self.fields.retain(|_, f| !f.is_expired());
    }

    fn integrate_and_bound(&mut self) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            let (old_x, old_y, material_id) = {
                let e = &self.entities[&id];
                (e.x, e.y, e.material_id.clone())
            };
            let bounce_damping = self.material_for(&material_id).bounce_damping();
            let entity = self.entities.get_mut(&id).expect("entity present");
            let result = engine::integrate_and_bound(
                entity.x,
                entity.y,
                entity.vx,
                entity.vy,
                &self.config.engine,
                bounce_damping,
            );
            entity.x = result.x;
            entity.y = result.y;
            entity.vx = result.vx;
            entity.vy = result.vy;
            self.grid.update(id, old_x, old_y, entity.x, entity.y);
        }
    }

    fn resource_and_needs_update(&mut self, dt: f64) {
        for field in self.resource_fields.values_mut() {
            field.tick(dt);
        }
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            let entity = self.entities.get_mut(&id).expect("entity present");
            let mut total_impact = crate::emotion::Pad::new(0.0, 0.0, 0.0);
            for need in entity.needs.values_mut() {
                need.deplete(dt);
                let impact = need.emotional_impact_this_tick(dt);
                total_impact.feel(impact);
            }
            if let Some(emotion) = entity.emotion.as_mut() {
                emotion.feel(total_impact);
            }
        }
    }

    fn climate_update(&mut self, dt: f64) {
        let before = self.climate;
        self.climate.drift_to_baseline(self.config.climate_decay_rate * dt);
        for entity in self.entities.values_mut() {
            if let Some(emotion) = entity.emotion.as_mut() {
                self.climate.influence(emotion, dt);
            }
        }
        if (before.grief - self.climate.grief).abs() > 1e-9
            || (before.harmony - self.climate.harmony).abs() > 1e-9
            || (before.tension - self.climate.tension).abs() > 1e-9
        {
            self.observers
                .emit(DomainEvent::ClimateChange { climate: self.climate });
        }
    }

    fn relationship_decay(&mut self, dt: f64) {
        let now = self.clock;
        for entity in self.entities.values_mut() {
            for bond in entity.relationships.values_mut() {
                relationship::apply_decay(bond, &self.config.relationship_decay, now, dt);
            }
            entity
                .relationships
                .retain(|_, bond| !relationship::should_prune(bond, &self.config.relationship_decay));
        }
    }

    fn cognitive_decay(&mut self) {
        let rate = self.config.cognitive_link_decay_rate;
        let mut decayed: Vec<(EntityId, EntityId)> = Vec::new();
        for (&from, entity) in &mut self.entities {
            for (&to, link) in entity.cognitive_links.iter_mut() {
                link.decay(rate);
                if link.should_prune() {
                    decayed.push((from, to));
                }
            }
            cognitive::prune_decayed(&mut entity.cognitive_links);
        }
        for (from, to) in decayed {
            self.observers.emit(DomainEvent::LinkDecay { from, to });
        }
    }

    fn crystallizer_pass(&mut self) {
        if self.tick_count % self.config.crystallizer.analyze_every.max(1) != 0 {
            return;
        }
        let newly_promoted = crystallizer::analyze(
            &self.transcript,
            &mut self.lexicon,
            self.clock,
            &self.config.crystallizer,
        );
        for term in newly_promoted {
            self.observers.emit(DomainEvent::EmergenceChunk { term });
        }
    }

    fn memory_crystallizer_pass(&mut self) {
        if self.tick_count % self.config.memory_crystallize_every.max(1) != 0 {
            return;
        }
        let all_events: Vec<MemoryEvent> = self
            .entities
            .values()
            .filter_map(|e| e.memory.as_ref())
            .flat_map(|m| m.events().iter().cloned())
            .collect();
        if all_events.is_empty() {
            return;
        }
        let before: std::collections::HashSet<CrystalId> = self.memory_crystals.keys().copied().collect();
        crystal::crystallize(
            &all_events,
            &mut self.memory_crystals,
            self.clock,
            &self.config.memory_crystallizer,
        );
        for (id, c) in &self.memory_crystals {
            if !before.contains(id) {
                self.observers.emit(DomainEvent::CrystalForm {
                    subject: c.subject.clone(),
                });
            }
        }
    }

    fn post_update(&mut self) {
        // Per §4.1 step 5, `onUpdate` fires per entity; in this port it is
        // the caller's job to subscribe to per-tick state rather than the
        // core invoking a rendering callback. Nothing to do here beyond
        // the invariant checks a caller may run in tests.
    }

    /// Checks the universal invariants in §8 for every live entity and
    /// the spatial index, poisoning the world if any is violated. Exposed
    /// for integration tests; not called automatically by `tick`.
    ///
    /// # Errors
    ///
    /// Returns the violation as an `Internal` error if one is found.
    pub fn check_invariants(&mut self) -> SimResult<()> {
        let positions: HashMap<EntityId, (f64, f64)> =
            self.entities.iter().map(|(&id, e)| (id, (e.x, e.y))).collect();
        let mut violation: Option<String> = None;
        for (&id, entity) in &self.entities {
            if let Some(emotion) = entity.emotion {
                if !emotion.is_valid() {
                    violation = Some(format!("entity {id} emotion out of domain"));
                    break;
                }
            }
            if !(0.0..=1.0).contains(&entity.opacity) {
                violation = Some(format!("entity {id} opacity out of domain"));
                break;
            }
            if let Some(link) = entity.cognitive_links.values().find(|l| !(0.0..=1.0).contains(&l.strength)) {
                let _ = link;
                violation = Some(format!("entity {id} cognitive link out of domain"));
                break;
            }
            if let Some(bond) = entity.relationships.values().find(|b| !(0.0..=1.0).contains(&b.familiarity)) {
                let _ = bond;
                violation = Some(format!("entity {id} relationship familiarity out of domain"));
                break;
            }
            let found = self.grid.query(entity.x, entity.y, 0.0, &positions, None);
            if !found.contains(&id) {
                violation = Some(format!("entity {id} missing from its own grid cell"));
                break;
            }
        }
        match violation {
            Some(message) => Err(self.poison(message)),
            None => Ok(()),
        }
    }

    /// Reinforces the bond from `a` toward `b`, creating it if absent
    /// (convenience wrapper used by interaction-driven collaborators).
    pub fn reinforce_relationship(&mut self, a: EntityId, b: EntityId, trust_delta: f64, familiarity_delta: f64) {
        let now = self.clock;
        if let Some(entity) = self.entities.get_mut(&a) {
            let bond = entity.relationships.entry(b).or_insert_with(|| Bond::new(now));
            bond.reinforce(trust_delta, familiarity_delta, now);
        }
    }

    /// Adds or reinforces a cognitive link from `a` to `b`, mirroring it
    /// if `bidirectional`.
    pub fn link(&mut self, a: EntityId, b: EntityId, amount: f64, bidirectional: bool) {
        let now = self.clock;
        let mut formed = false;
        if let Some(entity) = self.entities.get_mut(&a) {
            formed = !entity.cognitive_links.contains_key(&b);
            entity
                .cognitive_links
                .entry(b)
                .and_modify(|l| l.reinforce(amount, now))
                .or_insert_with(|| crate::cognitive::CognitiveLink::new(amount, bidirectional, now));
        }
        if bidirectional {
            if let Some(entity) = self.entities.get_mut(&b) {
                entity
                    .cognitive_links
                    .entry(a)
                    .and_modify(|l| l.reinforce(amount, now))
                    .or_insert_with(|| crate::cognitive::CognitiveLink::new(amount, true, now));
            }
        }
        if formed {
            self.observers.emit(DomainEvent::LinkForm { from: a, to: b });
        }
    }

    /// Re-evaluates an entity's current intent and abandons it if
    /// confidence falls below the configured threshold (§4.5
    /// `shouldAbandon`).
    pub fn reevaluate_intent(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        let Some(current) = entity.intent.as_ref().and_then(|s| s.current()) else {
            return;
        };
        let memories: Vec<MemoryEvent> = entity
            .memory
            .as_ref()
            .map(|m| m.events().to_vec())
            .unwrap_or_default();
        let relationship_to_target = current.target.and_then(|t| entity.relationships.get(&t).copied());
        let crystals: Vec<MemoryCrystal> = self.memory_crystals.values().cloned().collect();
        let ctx = ReasoningContext {
            emotion: entity.emotion,
            memories: &memories,
            relationship_to_target: relationship_to_target.as_ref(),
            crystals: &crystals,
            current_time: self.clock,
        };
        let abandon = intent::should_abandon(
            current,
            &ctx,
            self.config.reasoner_emotion_weight,
            self.config.reasoner_confidence_threshold,
        );
        if abandon {
            if let Some(entity) = self.entities.get_mut(&id) {
                if let Some(stack) = entity.intent.as_mut() {
                    stack.pop();
                }
            }
        }
    }

    /// Pushes a new intent onto `id`'s stack, if it has one.
    pub fn push_intent(&mut self, id: EntityId, goal: Goal, motivation: f64, priority: f64, target: Option<EntityId>) {
        let now = self.clock;
        if let Some(entity) = self.entities.get_mut(&id) {
            if let Some(stack) = entity.intent.as_mut() {
                let mut intent = Intent::new(goal, motivation, priority, now);
                if let Some(target) = target {
                    intent = intent.with_target(target);
                }
                stack.push(intent);
            }
        }
    }

    /// Captures every piece of state a replay needs to resume this world
    /// exactly (§4.12 `snapshot`).
    ///
    /// The spatial index and `WorldConfig` are deliberately not included;
    /// see `Snapshot`'s documentation.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            id: self.id,
            clock: self.clock,
            tick_count: self.tick_count,
            rng: self.rng,
            entities: self.entities.clone(),
            fields: self.fields.clone(),
            resource_fields: self.resource_fields.clone(),
            materials: self.materials.clone(),
            transcript: self.transcript.clone(),
            lexicon: self.lexicon.clone(),
            memory_crystals: self.memory_crystals.clone(),
            climate: self.climate,
        }
    }

    /// Rebuilds a `World` from a `Snapshot` under a caller-supplied
    /// configuration (§4.12 `restore`).
    ///
    /// Two passes: the snapshot's collections are installed as-is, then
    /// `snapshot::reconcile` repairs dangling cross-references and the
    /// spatial index is rebuilt from the restored entities' positions.
    /// Nothing about restore fails outright; every problem found is
    /// surfaced as a `RestoreWarning` in the returned `RestoreReport`
    /// instead (§7 `MissingReference`).
    #[must_use]
    pub fn restore(config: WorldConfig, snapshot: Snapshot) -> (World, RestoreReport) {
        let Snapshot {
            id,
            clock,
            tick_count,
            rng,
            mut entities,
            fields,
            resource_fields,
            materials,
            transcript,
            lexicon,
            memory_crystals,
            climate,
        } = snapshot;

        let skipped = snapshot::reconcile(&mut entities, &materials);

        let cell_size = config.engine.bounds.max_x.min(160.0).max(1.0);
        let mut grid = SpatialGrid::new(cell_size.max(160.0));
        for (&id, entity) in &entities {
            grid.insert(id, entity.x, entity.y);
        }

        let world = World {
            id,
            clock,
            tick_count,
            rng,
            entities,
            grid,
            fields,
            resource_fields,
            materials,
            transcript,
            lexicon,
            memory_crystals,
            climate,
            observers: Observers::new(config.log_events),
            config,
            poisoned: None,
        };

        (world, RestoreReport { skipped })
    }
}

impl Default for World {
    fn default() -> Self {
        WorldBuilder::new(1).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_requires_registered_material() {
        let mut world = WorldBuilder::new(1).build();
        let result = world.spawn("nonexistent", None, None);
        assert!(result.is_err());
    }

    #[test]
    fn spawn_publishes_spawn_event() {
        let mut world = WorldBuilder::new(1).build();
        world.register_material(MaterialSpec::minimal("spark"));
        let received = std::rc::Rc::new(std::cell::RefCell::new(false));
        let received_clone = received.clone();
        world.observers_mut().on("spawn", move |_| *received_clone.borrow_mut() = true);
        world.spawn("spark", Some(10.0), Some(10.0)).unwrap();
        assert!(*received.borrow());
    }

    #[test]
    fn tick_advances_clock_and_count() {
        let mut world = WorldBuilder::new(1).build();
        world.tick(1.0).unwrap();
        assert_eq!(world.tick_count(), 1);
        assert!((world.clock() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn remove_entity_increments_grief() {
        let mut world = WorldBuilder::new(1).build();
        world.register_material(MaterialSpec::minimal("spark"));
        let id = world.spawn("spark", Some(10.0), Some(10.0)).unwrap();
        let before_grief = world.climate().grief;
        world.remove_entity(id);
        assert!(world.climate().grief > before_grief);
        assert!(world.entity(id).is_none());
    }

    #[test]
    fn entities_stay_indexed_after_many_ticks() {
        let mut world = WorldBuilder::new(7).build();
        world.register_material(MaterialSpec::minimal("spark"));
        world.spawn("spark", Some(50.0), Some(50.0)).unwrap();
        world.spawn("spark", Some(55.0), Some(55.0)).unwrap();
        for _ in 0..20 {
            world.tick(0.5).unwrap();
        }
        world.check_invariants().unwrap();
        assert!(!world.is_poisoned());
    }

    #[test]
    fn seeded_determinism_same_trace_same_outcome() {
        let mut a = WorldBuilder::new(42).build();
        let mut b = WorldBuilder::new(42).build();
        a.register_material(MaterialSpec::minimal("spark"));
        b.register_material(MaterialSpec::minimal("spark"));
        let ida = a.spawn("spark", None, None).unwrap();
        let idb = b.spawn("spark", None, None).unwrap();
        for _ in 0..10 {
            a.tick(0.1).unwrap();
            b.tick(0.1).unwrap();
        }
        let ea = a.entity(ida).unwrap();
        let eb = b.entity(idb).unwrap();
        assert!((ea.x - eb.x).abs() < 1e-9);
        assert!((ea.y - eb.y).abs() < 1e-9);
    }

    #[test]
    fn consume_resource_errors_for_unknown_type() {
        let mut world = WorldBuilder::new(1).build();
        let result = world.consume_resource("water", 0.0, 0.0, 1.0);
        assert!(result.is_err());
    }

    #[test]
    fn record_speech_appends_to_transcript() {
        let mut world = WorldBuilder::new(1).build();
        world.register_material(MaterialSpec::minimal("spark"));
        let id = world.spawn("spark", Some(0.0), Some(0.0)).unwrap();
        world.record_speech(id, "hello there", None);
        assert_eq!(world.transcript().len(), 1);
    }

    #[test]
    fn snapshot_restore_round_trip_preserves_state() {
        let mut world = WorldBuilder::new(9).build();
        world.register_material(MaterialSpec::minimal("spark"));
        let a = world.spawn("spark", Some(10.0), Some(10.0)).unwrap();
        let b = world.spawn("spark", Some(20.0), Some(20.0)).unwrap();
        world.link(a, b, 0.5, true);
        for _ in 0..5 {
            world.tick(0.5).unwrap();
        }

        let snap = world.snapshot();
        let (restored, report) = World::restore(world.config().clone(), snap);
        assert!(report.skipped.is_empty());
        assert_eq!(restored.tick_count(), world.tick_count());
        assert!((restored.clock() - world.clock()).abs() < 1e-9);
        assert_eq!(restored.entities().count(), 2);
        assert!(restored.entity(a).unwrap().cognitive_links.contains_key(&b));
    }

    #[test]
    fn restore_continues_deterministically_from_snapshot() {
        let mut world = WorldBuilder::new(9).build();
        world.register_material(MaterialSpec::minimal("spark"));
        let id = world.spawn("spark", Some(10.0), Some(10.0)).unwrap();

        let snap = world.snapshot();
        let (mut restored, _) = World::restore(world.config().clone(), snap);

        world.tick(0.25).unwrap();
        restored.tick(0.25).unwrap();

        let original = world.entity(id).unwrap();
        let resumed = restored.entity(id).unwrap();
        assert!((original.x - resumed.x).abs() < 1e-9);
        assert!((original.y - resumed.y).abs() < 1e-9);
    }

    #[test]
    fn restore_reports_unregistered_material_and_strips_dangling_link() {
        let mut world = WorldBuilder::new(3).build();
        world.register_material(MaterialSpec::minimal("spark"));
        let id = world.spawn("spark", Some(5.0), Some(5.0)).unwrap();

        let mut snap = world.snapshot();
        snap.materials.clear();
        let ghost = EntityId::new();
        snap.entities
            .get_mut(&id)
            .unwrap()
            .cognitive_links
            .insert(ghost, crate::cognitive::CognitiveLink::new(0.5, false, 0.0));

        let (restored, report) = World::restore(WorldConfig::default(), snap);
        assert_eq!(report.skipped.len(), 2);
        assert!(!restored.entity(id).unwrap().cognitive_links.contains_key(&ghost));
    }
}
