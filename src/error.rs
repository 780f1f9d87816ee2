//! Error kinds for the simulation kernel.
//!
//! The core never throws exceptions and never writes to stdout/stderr.
//! Every fallible operation returns a `SimError` carrying a `kind`, a
//! short message, and the path (entity, field, or tick) where it arose.
//! `Overflow` situations are not represented here at all: ring-buffer and
//! transcript evictions are silent policy, not errors.

use std::fmt;
use uuid::Uuid;

/// The category of failure, per the error-handling table in the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid material at spawn, non-finite coordinates, unknown resource id.
    BadInput,
    /// Restore referenced a material id that was never registered.
    MissingReference,
    /// A state-transition predicate referenced an unknown trigger-context key.
    StateMachineViolation,
    /// An internal invariant was violated; the world is poisoned.
    Internal,
}

/// Where in the world a `SimError` arose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPath {
    /// The error concerns a specific entity.
    Entity(Uuid),
    /// The error concerns a named field or field instance.
    Field(String),
    /// The error arose during a specific tick.
    Tick(u64),
    /// No specific path applies.
    None,
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPath::Entity(id) => write!(f, "entity {id}"),
            ErrorPath::Field(name) => write!(f, "field {name}"),
            ErrorPath::Tick(n) => write!(f, "tick {n}"),
            ErrorPath::None => write!(f, "<no path>"),
        }
    }
}

/// A simulation-kernel error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimError {
    /// The category of failure.
    pub kind: ErrorKind,
    /// A short, human-readable description.
    pub message: String,
    /// Where the error arose.
    pub path: ErrorPath,
}

impl SimError {
    /// Builds a new error of the given kind at the given path.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, path: ErrorPath) -> Self {
        SimError {
            kind,
            message: message.into(),
            path,
        }
    }

    /// Shorthand for a `BadInput` error with no specific path.
    #[must_use]
    pub fn bad_input(message: impl Into<String>) -> Self {
        SimError::new(ErrorKind::BadInput, message, ErrorPath::None)
    }

    /// Shorthand for an `Internal` error poisoning the world at `tick`.
    #[must_use]
    pub fn internal(message: impl Into<String>, tick: u64) -> Self {
        SimError::new(ErrorKind::Internal, message, ErrorPath::Tick(tick))
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.kind, self.path, self.message)
    }
}

impl std::error::Error for SimError {}

/// Result alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;
