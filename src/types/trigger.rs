//! Flat, dotted-path keyed value map consulted by behavior conditions and
//! emotion transitions (§9 "dynamic lookup by dotted path").
//!
//! Paths such as `"user.silence"` or `"emotion.state"` are split into
//! segments once, at write time, and stored flattened — there is no
//! interpreter walking nested maps at read time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A closed set of scalar value kinds a trigger-context entry may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriggerValue {
    /// A numeric reading, e.g. `cpu.usage = 0.83`.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// An opaque text value, compared only for equality.
    Text(String),
}

impl TriggerValue {
    /// Returns the numeric value, if this is a `Number`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TriggerValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TriggerValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for TriggerValue {
    fn from(n: f64) -> Self {
        TriggerValue::Number(n)
    }
}

impl From<bool> for TriggerValue {
    fn from(b: bool) -> Self {
        TriggerValue::Bool(b)
    }
}

impl From<&str> for TriggerValue {
    fn from(s: &str) -> Self {
        TriggerValue::Text(s.to_string())
    }
}

/// A flat dotted-path keyed map, e.g. `"memory.flags.foo" -> Bool(true)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerContext {
    values: IndexMap<String, TriggerValue>,
}

impl TriggerContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        TriggerContext::default()
    }

    /// Sets a value at a dotted path, overwriting any existing entry.
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<TriggerValue>) {
        self.values.insert(path.into(), value.into());
    }

    /// Reads a value at a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&TriggerValue> {
        self.values.get(path)
    }

    /// Merges another context's keys into this one, newer keys winning.
    pub fn merge(&mut self, other: &TriggerContext) {
        for (path, value) in &other.values {
            self.values.insert(path.clone(), value.clone());
        }
    }

    /// Iterates over all stored paths and values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TriggerValue)> {
        self.values.iter()
    }
}
