//! The external language-model adapter port (§6.1) and its deterministic
//! default.
//!
//! The core never depends on a real language model. It exposes a small
//! synchronous port; a collaborator may plug in a real adapter, but the
//! crate ships only `StubGenerator`, a deterministic template-based
//! default that echoes back salient memory/emotion words. Per §5, if a
//! host's adapter is inherently asynchronous, the core's contract is
//! still synchronous: the host records the request and returns a reply
//! (or a not-yet-ready error) the next time the core asks — the
//! simulation itself never awaits anything.

use crate::emotion::Pad;
use std::fmt;

/// What the generator is being asked to produce text for.
#[derive(Debug, Clone)]
pub struct GeneratorPrompt {
    /// The speaking entity's material id, for flavor.
    pub material_id: String,
    /// Current emotional state, if any.
    pub emotion: Option<Pad>,
    /// Salient memory contents to draw from, most salient first.
    pub memory_fragments: Vec<String>,
    /// Free-text situational context.
    pub situation: String,
}

/// A generated utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorReply {
    /// The produced text.
    pub text: String,
}

/// Failure returned by a `Generator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorError {
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generator error: {}", self.message)
    }
}

impl std::error::Error for GeneratorError {}

/// A synchronous port to an utterance generator.
///
/// Implementations that wrap an asynchronous host adapter should return
/// `Err` with a message indicating "not ready yet" rather than blocking;
/// the core treats any `Err` as "no utterance produced this call" and
/// moves on.
pub trait Generator {
    /// Produces a reply for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if no reply can be produced synchronously.
    fn complete(&mut self, prompt: &GeneratorPrompt) -> Result<GeneratorReply, GeneratorError>;
}

/// A deterministic, template-based default generator.
///
/// Never fails, never depends on wall-clock or RNG state outside of what
/// is passed in — the same prompt always produces the same reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubGenerator;

impl Generator for StubGenerator {
    fn complete(&mut self, prompt: &GeneratorPrompt) -> Result<GeneratorReply, GeneratorError> {
        let mood_word = match prompt.emotion {
            Some(pad) if pad.valence > 0.3 => "brightly",
            Some(pad) if pad.valence < -0.3 => "quietly",
            Some(_) => "evenly",
            None => "",
        };
        let fragment = prompt.memory_fragments.first().map(String::as_str).unwrap_or("");

        let text = match (mood_word.is_empty(), fragment.is_empty()) {
            (true, true) => format!("{} considers the {}.", prompt.material_id, prompt.situation),
            (true, false) => format!("{} recalls {}.", prompt.material_id, fragment),
            (false, true) => format!("{} speaks {} about the {}.", prompt.material_id, mood_word, prompt.situation),
            (false, false) => format!(
                "{} speaks {} about {}.",
                prompt.material_id, mood_word, fragment
            ),
        };

        Ok(GeneratorReply { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_is_deterministic() {
        let mut gen_a = StubGenerator;
        let mut gen_b = StubGenerator;
        let prompt = GeneratorPrompt {
            material_id: "spark".to_string(),
            emotion: Some(Pad::new(0.5, 0.5, 0.5)),
            memory_fragments: vec!["the storm".to_string()],
            situation: "the clearing".to_string(),
        };
        assert_eq!(
            gen_a.complete(&prompt).unwrap(),
            gen_b.complete(&prompt).unwrap()
        );
    }

    #[test]
    fn stub_never_fails() {
        let mut gen = StubGenerator;
        let prompt = GeneratorPrompt {
            material_id: "spark".to_string(),
            emotion: None,
            memory_fragments: vec![],
            situation: "nothing".to_string(),
        };
        assert!(gen.complete(&prompt).is_ok());
    }

    #[test]
    fn negative_valence_speaks_quietly() {
        let mut gen = StubGenerator;
        let prompt = GeneratorPrompt {
            material_id: "spark".to_string(),
            emotion: Some(Pad::new(-0.8, 0.5, 0.5)),
            memory_fragments: vec!["loss".to_string()],
            situation: "the room".to_string(),
        };
        let reply = gen.complete(&prompt).unwrap();
        assert!(reply.text.contains("quietly"));
    }
}
