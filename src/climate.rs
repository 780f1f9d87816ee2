//! World-level emotional climate (§4.10).

use crate::emotion::Pad;
use crate::rng::clamp;
use serde::{Deserialize, Serialize};

/// The global emotional climate: grief, vitality, tension, harmony.
///
/// All four axes are clamped to `[0, 1]` after every update, with baseline
/// `{0, 0.5, 0, 0.5}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Climate {
    /// Accumulated grief from entity deaths.
    pub grief: f64,
    /// Overall vitality; reduced by grief-inducing events.
    pub vitality: f64,
    /// Accumulated tension from suffering.
    pub tension: f64,
    /// Accumulated harmony from positive collective events.
    pub harmony: f64,
}

impl Climate {
    /// The baseline climate state.
    #[must_use]
    pub fn baseline() -> Self {
        Climate {
            grief: 0.0,
            vitality: 0.5,
            tension: 0.0,
            harmony: 0.5,
        }
    }

    fn clamp_self(&mut self) {
        self.grief = clamp(self.grief, 0.0, 1.0);
        self.vitality = clamp(self.vitality, 0.0, 1.0);
        self.tension = clamp(self.tension, 0.0, 1.0);
        self.harmony = clamp(self.harmony, 0.0, 1.0);
    }

    /// Records an entity death with the given salience-derived `intensity`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lexicrucible::climate::Climate;
    ///
    /// let mut climate = Climate::baseline();
    /// climate.record_entity_death(0.8);
    /// assert!((climate.grief - 0.24).abs() < 1e-9);
    /// assert!((climate.vitality - 0.34).abs() < 1e-9);
    /// ```
    pub fn record_entity_death(&mut self, intensity: f64) {
        self.grief += intensity * 0.3;
        self.vitality -= intensity * 0.2;
        self.clamp_self();
    }

    /// Records collective suffering with the given `intensity`.
    pub fn record_suffering(&mut self, intensity: f64) {
        self.tension += intensity * 0.1;
        self.clamp_self();
    }

    /// Records collective harmony with the given `intensity`.
    pub fn record_harmony(&mut self, intensity: f64) {
        self.harmony += intensity * 0.05;
        self.clamp_self();
    }

    /// Drifts every axis toward baseline at `rate * dt`.
    pub fn drift_to_baseline(&mut self, rate_dt: f64) {
        let baseline = Climate::baseline();
        let r = clamp(rate_dt, 0.0, 1.0);
        self.grief += (baseline.grief - self.grief) * r;
        self.vitality += (baseline.vitality - self.vitality) * r;
        self.tension += (baseline.tension - self.tension) * r;
        self.harmony += (baseline.harmony - self.harmony) * r;
        self.clamp_self();
    }

    /// Applies this tick's climate influence to an entity's emotion (§4.10).
    pub fn influence(&self, emotion: &mut Pad, dt: f64) {
        emotion.valence -= self.grief * 0.05 * dt;
        emotion.arousal += self.tension * 0.03 * dt;
        emotion.valence += self.harmony * 0.02 * dt;
        *emotion = Pad::new(emotion.valence, emotion.arousal, emotion.dominance);
    }

    /// A single descriptive label for the current climate, via threshold rules.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        if self.grief > 0.6 {
            "grieving"
        } else if self.tension > 0.6 {
            "tense"
        } else if self.grief > 0.3 && self.harmony < 0.3 {
            "melancholic"
        } else if self.harmony > 0.6 && self.tension < 0.3 {
            "harmonious"
        } else if self.tension < 0.2 && self.grief < 0.2 {
            "calm"
        } else {
            "neutral"
        }
    }
}

impl Default for Climate {
    fn default() -> Self {
        Climate::baseline()
    }
}
