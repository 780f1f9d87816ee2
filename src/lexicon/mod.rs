//! Transcript, lexicon, and linguistic crystallizer (§4.8).

pub mod crystallizer;
pub mod term;
pub mod transcript;

pub use crystallizer::CrystallizerConfig;
pub use term::{infer_category, LexiconTerm, TermCategory};
pub use transcript::{Transcript, Utterance};

use indexmap::IndexMap;

/// A lexicon: normalized term -> crystallized entry (§3.2).
pub type Lexicon = IndexMap<String, LexiconTerm>;
