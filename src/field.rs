//! Transient spatial effect fields (§3.1, §4.1 step 3).

use crate::types::FieldId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A transient spatial effect spawned from a material's field spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Stable field id.
    pub id: FieldId,
    /// The material id this field's payload derives from.
    pub material_ref: String,
    /// World-space center.
    pub x: f64,
    /// World-space center.
    pub y: f64,
    /// Effect radius.
    pub radius: f64,
    /// Seconds remaining before expiry. `None` means it never expires.
    pub remaining_lifetime: Option<f64>,
    /// Opaque payload forwarded to per-entity effect application.
    pub payload: HashMap<String, f64>,
}

impl Field {
    /// Spawns a field at `(x, y)` with the given radius, payload, and
    /// optional duration (`None` for a field that never expires).
    #[must_use]
    pub fn spawn(
        material_ref: impl Into<String>,
        x: f64,
        y: f64,
        radius: f64,
        duration: Option<f64>,
        payload: HashMap<String, f64>,
    ) -> Self {
        Field {
            id: FieldId::new(),
            material_ref: material_ref.into(),
            x,
            y,
            radius,
            remaining_lifetime: duration,
            payload,
        }
    }

    /// Advances the field's lifetime by `dt`. No-op for fields that never expire.
    pub fn tick(&mut self, dt: f64) {
        if let Some(remaining) = self.remaining_lifetime.as_mut() {
            *remaining -= dt;
        }
    }

    /// True iff the field's lifetime has elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self.remaining_lifetime, Some(r) if r <= 0.0)
    }

    /// True iff `(x, y)` falls within this field's radius.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt() <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_without_duration_never_expires() {
        let mut field = Field::spawn("spark", 0.0, 0.0, 10.0, None, HashMap::new());
        field.tick(1_000_000.0);
        assert!(!field.is_expired());
    }

    #[test]
    fn field_expires_after_duration_elapses() {
        let mut field = Field::spawn("spark", 0.0, 0.0, 10.0, Some(5.0), HashMap::new());
        field.tick(3.0);
        assert!(!field.is_expired());
        field.tick(3.0);
        assert!(field.is_expired());
    }

    #[test]
    fn contains_uses_euclidean_radius() {
        let field = Field::spawn("spark", 0.0, 0.0, 10.0, None, HashMap::new());
        assert!(field.contains(5.0, 5.0));
        assert!(!field.contains(8.0, 8.0));
    }
}
