//! Linguistic crystallizer (§4.8): promotes recurrent transcript phrases
//! into lexicon terms.
//!
//! Runs every `analyze_every` ticks over a bounded recent window of the
//! transcript. Distinct from the memory crystallizer (§4.9) — this
//! component is keyed by transcript phrases, never by `(subject, type)`
//! memory groups, and the two share no code path (§9 Open Question).

use crate::lexicon::term::{infer_category, LexiconTerm, TermCategory};
use crate::lexicon::transcript::{Transcript, Utterance};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Configuration for the linguistic crystallizer.
#[derive(Debug, Clone)]
pub struct CrystallizerConfig {
    /// Run the analysis every this many ticks.
    pub analyze_every: u64,
    /// Minimum exact-occurrence count to promote a phrase. Default 3.
    pub min_usage: u64,
    /// Maximum phrase length in tokens. Default 4.
    pub max_length: usize,
    /// Number of most-recent utterances scanned per analysis pass.
    pub window: usize,
    /// Seconds of inactivity before idle decay applies. Default 10.
    pub decay_idle_threshold: f64,
    /// Multiplicative idle decay rate. Default 0.05.
    pub decay_rate: f64,
    /// Weight added per reinforcement, capped at 1. Default 0.1.
    pub reinforcement: f64,
}

impl Default for CrystallizerConfig {
    fn default() -> Self {
        CrystallizerConfig {
            analyze_every: 30,
            min_usage: 3,
            max_length: 4,
            window: 200,
            decay_idle_threshold: 10.0,
            decay_rate: 0.05,
            reinforcement: 0.1,
        }
    }
}

fn normalize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|tok| {
            tok.chars()
                .filter(|c| c.is_alphanumeric() || *c == '?' || c.is_whitespace())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|tok| !tok.is_empty())
        .collect()
}

struct PhraseOccurrence<'a> {
    count: u64,
    utterances: Vec<&'a Utterance>,
}

fn count_phrases<'a>(
    utterances: &[&'a Utterance],
    max_length: usize,
) -> HashMap<String, PhraseOccurrence<'a>> {
    let mut phrases: HashMap<String, PhraseOccurrence<'a>> = HashMap::new();
    for utterance in utterances {
        let tokens = normalize(&utterance.text);
        for n in 1..=max_length.max(1) {
            if tokens.len() < n {
                break;
            }
            for window in tokens.windows(n) {
                let phrase = window.join(" ");
                let entry = phrases.entry(phrase).or_insert_with(|| PhraseOccurrence {
                    count: 0,
                    utterances: Vec::new(),
                });
                entry.count += 1;
                entry.utterances.push(utterance);
            }
        }
    }
    drop_subsumed_ngrams(phrases)
}

/// True iff `needle`'s tokens occur as a contiguous window inside
/// `candidate`'s tokens and `candidate` is strictly longer.
fn is_subsumed_by(needle: &[&str], candidate: &str) -> bool {
    let hay: Vec<&str> = candidate.split(' ').collect();
    if hay.len() <= needle.len() {
        return false;
    }
    hay.windows(needle.len()).any(|window| window == needle)
}

/// Drops any n-gram that never occurs independently of a longer n-gram
/// with the same count — i.e. every occurrence of the shorter phrase is
/// already covered by a longer one. Keeps phrase counting simple (every
/// window of every length) while still promoting a single entry for a
/// phrase repeated verbatim, rather than also promoting its constituent
/// sub-phrases.
fn drop_subsumed_ngrams(phrases: HashMap<String, PhraseOccurrence<'_>>) -> HashMap<String, PhraseOccurrence<'_>> {
    let counts: Vec<(String, u64)> = phrases.iter().map(|(phrase, occ)| (phrase.clone(), occ.count)).collect();
    phrases
        .into_iter()
        .filter(|(phrase, occurrence)| {
            let tokens: Vec<&str> = phrase.split(' ').collect();
            !counts
                .iter()
                .any(|(candidate, candidate_count)| candidate != phrase && *candidate_count == occurrence.count && is_subsumed_by(&tokens, candidate))
        })
        .collect()
}

/// Runs one crystallizer analysis pass over `transcript`'s recent window,
/// inserting newly-promoted terms into `lexicon` and reinforcing existing
/// ones, then applying idle decay to every entry.
///
/// Returns the terms newly inserted this pass (for `emergence.chunk`
/// event emission by the caller).
pub fn analyze(
    transcript: &Transcript,
    lexicon: &mut IndexMap<String, LexiconTerm>,
    now: f64,
    config: &CrystallizerConfig,
) -> Vec<String> {
    let recent = transcript.recent(config.window);
    let phrases = count_phrases(&recent, config.max_length);
    let mut newly_promoted = Vec::new();

    for (phrase, occurrence) in phrases {
        if occurrence.count < config.min_usage {
            continue;
        }
        let mean_arousal = {
            let arousals: Vec<f64> = occurrence
                .utterances
                .iter()
                .filter_map(|u| u.emotion.map(|e| e.arousal))
                .collect();
            if arousals.is_empty() {
                None
            } else {
                Some(arousals.iter().sum::<f64>() / arousals.len() as f64)
            }
        };
        let emotion_sample = occurrence
            .utterances
            .iter()
            .filter_map(|u| u.emotion)
            .last();

        if let Some(existing) = lexicon.get_mut(&phrase) {
            existing.reinforce(occurrence.count, config.reinforcement, now, emotion_sample);
        } else {
            let category = infer_category(&phrase, mean_arousal);
            let mut term = LexiconTerm::new(phrase.clone(), category, now, config.decay_rate);
            term.reinforce(occurrence.count, 0.0, now, emotion_sample);
            lexicon.insert(phrase.clone(), term);
            newly_promoted.push(phrase);
        }
    }

    lexicon.retain(|_, term| !term.apply_idle_decay(now, config.decay_idle_threshold));

    newly_promoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;

    #[test]
    fn s5_crystallization_threshold() {
        // Scenario S5: 3 identical utterances "hello friend", minUsage=3.
        let mut transcript = Transcript::new(10);
        let speaker = EntityId::new();
        for i in 0..3 {
            transcript.record(speaker, None, "hello friend", f64::from(i), None);
        }
        let mut lexicon = IndexMap::new();
        let config = CrystallizerConfig::default();
        analyze(&transcript, &mut lexicon, 10.0, &config);

        let term = lexicon.get("hello friend").expect("term promoted");
        assert_eq!(term.category, TermCategory::Greeting);
        assert_eq!(term.usage_count, 3);
        // The constituent unigrams never occur independently of the
        // bigram, so only the bigram is promoted.
        assert_eq!(lexicon.len(), 1);
    }

    #[test]
    fn a_sub_phrase_used_independently_still_gets_its_own_entry() {
        let mut transcript = Transcript::new(10);
        let speaker = EntityId::new();
        for i in 0..3 {
            transcript.record(speaker, None, "hello friend", f64::from(i), None);
        }
        // "hello" also occurs on its own, so it is not fully subsumed by
        // "hello friend" and should be promoted too.
        for i in 3..6 {
            transcript.record(speaker, None, "hello", f64::from(i), None);
        }
        let mut lexicon = IndexMap::new();
        analyze(&transcript, &mut lexicon, 10.0, &CrystallizerConfig::default());

        assert!(lexicon.contains_key("hello friend"));
        let hello = lexicon.get("hello").expect("independently-used unigram promoted");
        assert_eq!(hello.usage_count, 6);
        assert!(!lexicon.contains_key("friend"));
    }

    #[test]
    fn below_threshold_is_not_promoted() {
        let mut transcript = Transcript::new(10);
        let speaker = EntityId::new();
        transcript.record(speaker, None, "hello friend", 0.0, None);
        transcript.record(speaker, None, "hello friend", 1.0, None);
        let mut lexicon = IndexMap::new();
        analyze(&transcript, &mut lexicon, 10.0, &CrystallizerConfig::default());
        assert!(!lexicon.contains_key("hello friend"));
    }

    #[test]
    fn monotonicity_weight_never_increases_without_reinforcement() {
        // Testable property 8.
        let mut transcript = Transcript::new(10);
        let speaker = EntityId::new();
        for i in 0..3 {
            transcript.record(speaker, None, "old phrase", f64::from(i), None);
        }
        let mut lexicon = IndexMap::new();
        let config = CrystallizerConfig {
            decay_idle_threshold: 1.0,
            ..Default::default()
        };
        analyze(&transcript, &mut lexicon, 3.0, &config);
        let weight_before = lexicon.get("old phrase").unwrap().weight;

        // A second pass with no new utterances and usage_count unchanged,
        // well past the idle threshold: weight must not increase.
        analyze(&transcript, &mut lexicon, 100.0, &config);
        let weight_after = lexicon.get("old phrase").map(|t| t.weight).unwrap_or(0.0);
        assert!(weight_after <= weight_before);
    }

    #[test]
    fn question_category_inferred_from_trailing_mark() {
        let mut transcript = Transcript::new(10);
        let speaker = EntityId::new();
        for i in 0..3 {
            transcript.record(speaker, None, "are you there?", f64::from(i), None);
        }
        let mut lexicon = IndexMap::new();
        analyze(&transcript, &mut lexicon, 10.0, &CrystallizerConfig::default());
        let term = lexicon.get("are you there?").expect("promoted");
        assert_eq!(term.category, TermCategory::Question);
    }
}
