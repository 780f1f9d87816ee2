//! Needs and resource fields (§4.11).

use crate::emotion::Pad;
use crate::rng::clamp;
use crate::types::ResourceFieldId;
use serde::{Deserialize, Serialize};

/// A single resource need tracked per entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Need {
    /// Current level in `[0, 1]`.
    pub current: f64,
    /// Level the need was created/reset at.
    pub initial: f64,
    /// Level lost per second.
    pub depletion_rate: f64,
    /// Below this, the need is critical.
    pub critical_threshold: f64,
    /// PAD delta applied (scaled by severity) while critical.
    pub emotional_impact: Pad,
}

impl Need {
    /// Creates a need starting at `initial`.
    #[must_use]
    pub fn new(initial: f64, depletion_rate: f64, critical_threshold: f64, emotional_impact: Pad) -> Self {
        Need {
            current: clamp(initial, 0.0, 1.0),
            initial,
            depletion_rate,
            critical_threshold,
            emotional_impact,
        }
    }

    /// Depletes the need by `depletion_rate * dt`, clamped to `[0, 1]`.
    pub fn deplete(&mut self, dt: f64) {
        self.current = clamp(self.current - self.depletion_rate * dt, 0.0, 1.0);
    }

    /// True iff the need has dropped below its critical threshold.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.current < self.critical_threshold
    }

    /// The emotional impact to apply this tick, scaled by how far below
    /// the critical threshold the need has fallen. Zero when not critical.
    #[must_use]
    pub fn emotional_impact_this_tick(&self, dt: f64) -> Pad {
        if !self.is_critical() || self.critical_threshold <= 0.0 {
            return Pad::new(0.0, 0.0, 0.0);
        }
        let severity = (self.critical_threshold - self.current) / self.critical_threshold;
        Pad::new(
            self.emotional_impact.valence * severity * dt,
            self.emotional_impact.arousal * severity * dt,
            self.emotional_impact.dominance * severity * dt,
        )
    }
}

/// How a resource field's intensity is shaped over space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ResourceFieldSource {
    /// Intensity falls off linearly with distance within `radius`.
    Point,
    /// Full intensity anywhere inside an axis-aligned rectangle.
    Area {
        /// Rectangle half-width and half-height.
        half_width: f64,
        /// Rectangle half-width and half-height.
        half_height: f64,
    },
    /// Intensity falls off as `1 - (d/radius)^falloff` within `radius`.
    Gradient {
        /// Falloff exponent.
        falloff: f64,
    },
}

/// A spatial source of a depletable/regenerating resource (§4.11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceField {
    /// Stable field id.
    pub id: ResourceFieldId,
    /// The resource type this field provides, e.g. `"water"`.
    pub resource_type: String,
    /// World-space center.
    pub x: f64,
    /// World-space center.
    pub y: f64,
    /// Effect radius (ignored for `Area` sources beyond centering).
    pub radius: f64,
    /// The spatial shape of the field.
    pub source: ResourceFieldSource,
    /// Current intensity, consumable down to zero.
    pub intensity: f64,
    /// The intensity the field regenerates toward.
    pub original_intensity: f64,
    /// Intensity regained per second.
    pub regeneration_rate: f64,
    /// Intensity lost per second independent of consumption. Default 0.
    pub depletion_rate: f64,
}

impl ResourceField {
    /// The effective intensity at `(x, y)`, accounting for the source shape.
    #[must_use]
    pub fn intensity_at(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.x;
        let dy = y - self.y;
        match self.source {
            ResourceFieldSource::Point => {
                let d = (dx * dx + dy * dy).sqrt();
                self.intensity * (1.0 - d / self.radius).max(0.0)
            }
            ResourceFieldSource::Area {
                half_width,
                half_height,
            } => {
                if dx.abs() <= half_width && dy.abs() <= half_height {
                    self.intensity
                } else {
                    0.0
                }
            }
            ResourceFieldSource::Gradient { falloff } => {
                let d = (dx * dx + dy * dy).sqrt();
                if d >= self.radius {
                    0.0
                } else {
                    self.intensity * (1.0 - (d / self.radius).powf(falloff))
                }
            }
        }
    }

    /// Advances regeneration/depletion by `dt`.
    pub fn tick(&mut self, dt: f64) {
        self.intensity = (self.intensity - self.depletion_rate * dt).max(0.0);
        self.intensity = (self.intensity + self.regeneration_rate * dt).min(self.original_intensity);
    }

    /// Consumes up to `amount` at `(x, y)`, bounded by the field's local
    /// intensity and by zero, returning the quantity actually consumed.
    pub fn consume(&mut self, x: f64, y: f64, amount: f64) -> f64 {
        let available = self.intensity_at(x, y);
        let consumed = amount.min(available).max(0.0);
        self.intensity = (self.intensity - consumed).max(0.0);
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impact() -> Pad {
        Pad::new(-0.2, 0.1, 0.0)
    }

    #[test]
    fn deplete_reduces_current_and_clamps() {
        let mut need = Need::new(0.1, 1.0, 0.3, impact());
        need.deplete(1.0);
        assert_eq!(need.current, 0.0);
    }

    #[test]
    fn emotional_impact_scales_with_severity() {
        let mut need = Need::new(0.1, 0.0, 0.3, impact());
        let mild = need.emotional_impact_this_tick(1.0);
        need.current = 0.0;
        let severe = need.emotional_impact_this_tick(1.0);
        assert!(severe.valence.abs() > mild.valence.abs());
    }

    #[test]
    fn not_critical_has_zero_impact() {
        let need = Need::new(0.9, 0.0, 0.3, impact());
        let pad = need.emotional_impact_this_tick(1.0);
        assert_eq!(pad.valence, 0.0);
    }

    #[test]
    fn point_source_falls_off_linearly() {
        let field = ResourceField {
            id: ResourceFieldId::new(),
            resource_type: "water".to_string(),
            x: 0.0,
            y: 0.0,
            radius: 10.0,
            source: ResourceFieldSource::Point,
            intensity: 1.0,
            original_intensity: 1.0,
            regeneration_rate: 0.0,
            depletion_rate: 0.0,
        };
        assert!((field.intensity_at(0.0, 0.0) - 1.0).abs() < 1e-9);
        assert!((field.intensity_at(5.0, 0.0) - 0.5).abs() < 1e-9);
        assert_eq!(field.intensity_at(20.0, 0.0), 0.0);
    }

    #[test]
    fn consume_bounds_at_local_intensity_and_zero() {
        let mut field = ResourceField {
            id: ResourceFieldId::new(),
            resource_type: "water".to_string(),
            x: 0.0,
            y: 0.0,
            radius: 10.0,
            source: ResourceFieldSource::Point,
            intensity: 1.0,
            original_intensity: 1.0,
            regeneration_rate: 0.0,
            depletion_rate: 0.0,
        };
        let consumed = field.consume(5.0, 0.0, 10.0);
        assert!((consumed - 0.5).abs() < 1e-9);
        assert!(field.intensity >= 0.0);
    }

    #[test]
    fn regeneration_caps_at_original_intensity() {
        let mut field = ResourceField {
            id: ResourceFieldId::new(),
            resource_type: "water".to_string(),
            x: 0.0,
            y: 0.0,
            radius: 10.0,
            source: ResourceFieldSource::Point,
            intensity: 0.2,
            original_intensity: 1.0,
            regeneration_rate: 10.0,
            depletion_rate: 0.0,
        };
        field.tick(1.0);
        assert!((field.intensity - 1.0).abs() < 1e-9);
    }
}
