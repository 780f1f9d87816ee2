//! PAD (Pleasure/Valence, Arousal, Dominance) emotion model (§4.4).

use crate::rng::{clamp, lerp};
use serde::{Deserialize, Serialize};

/// A PAD emotion vector.
///
/// `valence` ranges over `[-1, 1]`; `arousal` and `dominance` range over
/// `[0, 1]`. All three axes are present or absent together on an entity
/// (§3.1), but `Pad` itself is always a complete, valid triple.
///
/// # Examples
///
/// ```
/// use lexicrucible::emotion::Pad;
///
/// let mut mood = Pad::new(0.0, 0.5, 0.5);
/// mood.feel(Pad::new(0.8, 0.2, 0.1));
/// assert!(mood.valence > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Pleasure / valence, in `[-1, 1]`.
    pub valence: f64,
    /// Arousal, in `[0, 1]`.
    pub arousal: f64,
    /// Dominance, in `[0, 1]`.
    pub dominance: f64,
}

impl Pad {
    /// Builds a PAD vector, clamping each axis to its domain.
    #[must_use]
    pub fn new(valence: f64, arousal: f64, dominance: f64) -> Self {
        let mut pad = Pad {
            valence,
            arousal,
            dominance,
        };
        pad.clamp_self();
        pad
    }

    fn clamp_self(&mut self) {
        self.valence = clamp(self.valence, -1.0, 1.0);
        self.arousal = clamp(self.arousal, 0.0, 1.0);
        self.dominance = clamp(self.dominance, 0.0, 1.0);
    }

    /// The neutral baseline: zero valence, mid arousal, mid dominance.
    #[must_use]
    pub fn neutral() -> Self {
        Pad::new(0.0, 0.5, 0.5)
    }

    /// A named built-in baseline (§4.4).
    #[must_use]
    pub fn baseline(name: &str) -> Self {
        match name {
            "happy" => Pad::new(0.7, 0.6, 0.6),
            "sad" => Pad::new(-0.6, 0.3, 0.3),
            "angry" => Pad::new(-0.5, 0.8, 0.7),
            "curious" => Pad::new(0.3, 0.6, 0.5),
            "anxious" => Pad::new(-0.4, 0.7, 0.2),
            "calm" => Pad::new(0.3, 0.2, 0.5),
            "fearful" => Pad::new(-0.7, 0.8, 0.1),
            _ => Pad::neutral(),
        }
    }

    /// Adds a delta to each axis, clamping to the domain.
    pub fn feel(&mut self, delta: Pad) {
        self.valence = clamp(self.valence + delta.valence, -1.0, 1.0);
        self.arousal = clamp(self.arousal + delta.arousal, 0.0, 1.0);
        self.dominance = clamp(self.dominance + delta.dominance, 0.0, 1.0);
    }

    /// Interpolates toward `other` by `strength`, clamped to `[0, 1]` first.
    ///
    /// # Examples
    ///
    /// ```
    /// use lexicrucible::emotion::Pad;
    ///
    /// let mut me = Pad::new(0.0, 0.5, 0.5);
    /// me.resonate(Pad::new(0.8, 0.7, 0.6), 0.5);
    /// assert!((me.valence - 0.4).abs() < 1e-6);
    /// assert!((me.arousal - 0.6).abs() < 1e-6);
    /// assert!((me.dominance - 0.55).abs() < 1e-6);
    /// ```
    pub fn resonate(&mut self, other: Pad, strength: f64) {
        let s = clamp(strength, 0.0, 1.0);
        self.valence = lerp(self.valence, other.valence, s);
        self.arousal = lerp(self.arousal, other.arousal, s);
        self.dominance = lerp(self.dominance, other.dominance, s);
        self.clamp_self();
    }

    /// Interpolates toward a `baseline` at `rate * dt` (already multiplied).
    pub fn drift_to_baseline(&mut self, baseline: Pad, rate_dt: f64) {
        let r = clamp(rate_dt, 0.0, 1.0);
        self.resonate(baseline, r);
    }

    /// True iff every axis is within its documented domain.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-1.0..=1.0).contains(&self.valence)
            && (0.0..=1.0).contains(&self.arousal)
            && (0.0..=1.0).contains(&self.dominance)
    }
}

impl Default for Pad {
    fn default() -> Self {
        Pad::neutral()
    }
}
