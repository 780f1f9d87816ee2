//! A single crystallized lexicon entry (§3.2, §4.8).

use crate::emotion::Pad;
use crate::rng::clamp;
use serde::{Deserialize, Serialize};

/// The inferred category of a lexicon term, via character-class and
/// punctuation heuristics only — never a natural-language dependency
/// (§4.8 "Category inference").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermCategory {
    /// Matches a built-in greeting token.
    Greeting,
    /// Ends with `?` or an interrogative marker.
    Question,
    /// High mean-arousal among its contributing utterances.
    Expression,
    /// The default when no other category applies.
    Statement,
}

/// A term promoted from the transcript by frequency (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconTerm {
    /// The normalized phrase.
    pub term: String,
    /// Optional human-assigned meaning, never set by the crystallizer itself.
    pub meaning: Option<String>,
    /// Always `"transcript"` for crystallizer-promoted terms.
    pub origin: String,
    /// Inferred category.
    pub category: TermCategory,
    /// Total number of occurrences counted.
    pub usage_count: u64,
    /// World-time of first promotion.
    pub first_seen: f64,
    /// World-time of most recent reinforcement.
    pub last_used: f64,
    /// Other terms observed to co-occur, for future expansion; unused by
    /// the crystallizer itself.
    pub related_terms: Vec<String>,
    /// Current weight in `[0, 1]`; entries below 0.01 are pruned.
    pub weight: f64,
    /// Multiplicative decay applied per idle analysis pass.
    pub decay_rate: f64,
    /// Running mean PAD of contributing utterances, if any carried emotion.
    pub emotion_context: Option<Pad>,
}

impl LexiconTerm {
    /// Creates a freshly promoted term with the documented starting weight
    /// of 0.5.
    #[must_use]
    pub fn new(term: impl Into<String>, category: TermCategory, now: f64, decay_rate: f64) -> Self {
        LexiconTerm {
            term: term.into(),
            meaning: None,
            origin: "transcript".to_string(),
            category,
            usage_count: 0,
            first_seen: now,
            last_used: now,
            related_terms: Vec::new(),
            weight: 0.5,
            decay_rate,
            emotion_context: None,
        }
    }

    /// Reinforces the term with `n` new occurrences at `now`, updating
    /// usage count, weight (capped at 1), and the running emotion mean.
    pub fn reinforce(&mut self, n: u64, reinforcement: f64, now: f64, emotion_sample: Option<Pad>) {
        self.usage_count += n;
        self.weight = clamp(self.weight + reinforcement, 0.0, 1.0);
        self.last_used = now;
        if let Some(sample) = emotion_sample {
            self.emotion_context = Some(match self.emotion_context {
                Some(running) => Pad::new(
                    (running.valence + sample.valence) / 2.0,
                    (running.arousal + sample.arousal) / 2.0,
                    (running.dominance + sample.dominance) / 2.0,
                ),
                None => sample,
            });
        }
    }

    /// Applies idle decay if `now - last_used` exceeds `idle_threshold`.
    /// Returns `true` iff the term should now be pruned (`weight < 0.01`).
    #[must_use]
    pub fn apply_idle_decay(&mut self, now: f64, idle_threshold: f64) -> bool {
        if now - self.last_used > idle_threshold {
            self.weight *= 1.0 - self.decay_rate;
        }
        self.weight < 0.01
    }
}

/// Infers a term's category from its normalized text and, when available,
/// the mean arousal of its contributing utterances (§4.8).
///
/// Language-agnostic: only character classes, punctuation, and a small
/// built-in multi-language greeting token set are consulted — never a
/// natural-language library.
#[must_use]
pub fn infer_category(normalized_term: &str, mean_arousal: Option<f64>) -> TermCategory {
    const GREETINGS: &[&str] = &[
        "hello", "hi", "hey", "greetings", "hola", "bonjour", "ciao", "salut", "namaste",
    ];
    const WH_WORDS: &[&str] = &["who", "what", "when", "where", "why", "how"];

    if GREETINGS.iter().any(|g| normalized_term.starts_with(g)) {
        return TermCategory::Greeting;
    }
    if normalized_term.ends_with('?')
        || WH_WORDS
            .iter()
            .any(|w| normalized_term.split_whitespace().next() == Some(w))
    {
        return TermCategory::Question;
    }
    if let Some(arousal) = mean_arousal {
        if arousal > 0.7 {
            return TermCategory::Expression;
        }
    }
    TermCategory::Statement
}
