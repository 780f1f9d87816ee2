//! Intent stack and reasoner (§4.5).

use crate::emotion::Pad;
use crate::memory::{MemoryCrystal, MemoryEvent};
use crate::relationship::Bond;
use crate::rng::{clamp, DeterministicRng};
use crate::types::EntityId;
use serde::{Deserialize, Serialize};

/// A named goal. `Custom` covers application-defined goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    /// Strengthen a bond with `target`.
    Bond,
    /// Move toward `target`.
    Approach,
    /// Move away from `target`.
    Avoid,
    /// Seek out new stimuli.
    Explore,
    /// Move without a specific destination.
    Wander,
    /// Reduce arousal and stay still.
    Rest,
    /// Watch the world without acting.
    Observe,
    /// An application-defined goal.
    Custom(String),
}

/// An entry on the intent stack. The newest entry is "current".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// The goal being pursued.
    pub goal: Goal,
    /// An optional target peer.
    pub target: Option<EntityId>,
    /// Baseline motivation in `[0, 1]`.
    pub motivation: f64,
    /// Priority; higher values are more urgent (no fixed domain).
    pub priority: f64,
    /// World-time the intent was pushed.
    pub created_at: f64,
}

impl Intent {
    /// Builds a new intent.
    #[must_use]
    pub fn new(goal: Goal, motivation: f64, priority: f64, created_at: f64) -> Self {
        Intent {
            goal,
            target: None,
            motivation: clamp(motivation, 0.0, 1.0),
            priority,
            created_at,
        }
    }

    /// Attaches a target peer.
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }
}

/// A LIFO stack of intents; `current()` is the top (newest).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentStack {
    stack: Vec<Intent>,
}

impl IntentStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        IntentStack::default()
    }

    /// Pushes a new intent, which becomes current.
    pub fn push(&mut self, intent: Intent) {
        self.stack.push(intent);
    }

    /// Pops the current intent, if any.
    pub fn pop(&mut self) -> Option<Intent> {
        self.stack.pop()
    }

    /// The current (topmost) intent.
    #[must_use]
    pub fn current(&self) -> Option<&Intent> {
        self.stack.last()
    }

    /// True iff the stack has no intents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// All intents, oldest first, for snapshotting.
    #[must_use]
    pub fn entries(&self) -> &[Intent] {
        &self.stack
    }
}

/// The evaluated form of an intent, with reasoner-computed scores attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonedIntent {
    /// The underlying intent.
    pub intent: Intent,
    /// Confidence this intent remains worth pursuing, in `[0, 1]`.
    pub confidence: f64,
    /// How relevant the intent is to the current context, in `[0, 1]`.
    pub relevance: f64,
    /// Human-readable factor breakdown, in evaluation order.
    pub reasoning: Vec<String>,
}

/// Context consulted by the reasoner when evaluating an intent.
pub struct ReasoningContext<'a> {
    /// Current emotional state, if the entity has one.
    pub emotion: Option<Pad>,
    /// Recent memories to check for subject-matching support.
    pub memories: &'a [MemoryEvent],
    /// Relevant bonds, keyed implicitly by caller-provided target lookup.
    pub relationship_to_target: Option<&'a Bond>,
    /// Crystals available for subject/type-matching support.
    pub crystals: &'a [MemoryCrystal],
    /// Current world time.
    pub current_time: f64,
}

fn emotion_influence(goal: &Goal, emotion: Pad) -> f64 {
    match goal {
        Goal::Bond | Goal::Approach => {
            if emotion.valence > 0.0 {
                emotion.valence
            } else {
                emotion.valence * 1.5
            }
        }
        Goal::Avoid => {
            if emotion.valence < 0.0 {
                -emotion.valence
            } else {
                0.0
            }
        }
        Goal::Explore => {
            if emotion.arousal > 0.5 && emotion.valence > 0.0 {
                emotion.arousal
            } else {
                -0.2
            }
        }
        Goal::Rest => {
            if emotion.arousal < 0.3 {
                1.0 - emotion.arousal
            } else {
                -0.3
            }
        }
        Goal::Wander | Goal::Observe | Goal::Custom(_) => 0.0,
    }
}

/// Re-evaluates `intent` given `context`, producing a `ReasonedIntent`.
///
/// Confidence blends baseline motivation with emotion influence (weight
/// `emotion_weight`, default 0.6), memory support, crystal support, and
/// relationship support for targeted goals, per §4.5.
#[must_use]
pub fn reason(intent: &Intent, context: &ReasoningContext, emotion_weight: f64) -> ReasonedIntent {
    let mut reasoning = Vec::new();
    let mut confidence = intent.motivation;
    reasoning.push(format!("baseline motivation {:.2}", intent.motivation));

    if let Some(emotion) = context.emotion {
        let influence = emotion_influence(&intent.goal, emotion) * emotion_weight;
        confidence += influence;
        reasoning.push(format!("emotion influence {influence:.2}"));
    }

    let subject_key = match &intent.target {
        Some(target) => target.to_string(),
        None => format!("{:?}", intent.goal),
    };
    let matching_memories = context
        .memories
        .iter()
        .filter(|m| m.subject == subject_key)
        .count();
    if !context.memories.is_empty() {
        let support = matching_memories as f64 / context.memories.len() as f64;
        confidence += support;
        reasoning.push(format!("memory support {support:.2}"));
    }

    if let Some(crystal) = context
        .crystals
        .iter()
        .find(|c| c.subject == subject_key)
    {
        let support = 0.7 + 0.3 * crystal.strength;
        confidence += support;
        reasoning.push(format!("crystal support {support:.2}"));
    }

    if let (Some(bond), Some(_target)) = (context.relationship_to_target, &intent.target) {
        let support = match intent.goal {
            Goal::Bond | Goal::Approach => bond.trust * 0.5 + bond.familiarity * 0.5,
            Goal::Avoid => {
                if bond.trust < 0.0 {
                    -bond.trust
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };
        confidence += support;
        reasoning.push(format!("relationship support {support:.2}"));
    }

    ReasonedIntent {
        intent: intent.clone(),
        confidence: clamp(confidence, 0.0, 1.0),
        relevance: clamp(matching_memories as f64 / 5.0, 0.0, 1.0),
        reasoning,
    }
}

/// True iff `intent` should be abandoned given `context`.
#[must_use]
pub fn should_abandon(
    intent: &Intent,
    context: &ReasoningContext,
    emotion_weight: f64,
    confidence_threshold: f64,
) -> bool {
    reason(intent, context, emotion_weight).confidence < confidence_threshold
}

/// Derives an autonomous intent from the entity's current emotion (§4.5),
/// used when the stack is empty and the entity `isAutonomous`.
pub fn autonomous_intent(emotion: Pad, now: f64, rng: &mut DeterministicRng) -> Intent {
    if emotion.arousal > 0.5 && emotion.valence > 0.0 {
        Intent::new(Goal::Explore, 0.6, 1.0, now)
    } else if emotion.arousal > 0.5 {
        Intent::new(Goal::Wander, 0.5, 1.0, now)
    } else if emotion.arousal < 0.3 {
        if rng.chance(0.5) {
            Intent::new(Goal::Rest, 0.4, 0.5, now)
        } else {
            Intent::new(Goal::Observe, 0.4, 0.5, now)
        }
    } else {
        Intent::new(Goal::Wander, 0.2, 0.2, now)
    }
}
