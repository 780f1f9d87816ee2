//! Relationship store and decay (§4.6).

use crate::rng::clamp;
use serde::{Deserialize, Serialize};

/// A per-peer relationship bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Willingness to be vulnerable to the peer, in `[-1, 1]`.
    pub trust: f64,
    /// How well-known the peer is, in `[0, 1]`.
    pub familiarity: f64,
    /// World-time of the most recent interaction.
    pub last_interaction: f64,
    /// Total number of interactions recorded.
    pub interaction_count: u64,
}

impl Bond {
    /// Creates a fresh bond formed at `now`.
    #[must_use]
    pub fn new(now: f64) -> Self {
        Bond {
            trust: 0.0,
            familiarity: 0.0,
            last_interaction: now,
            interaction_count: 0,
        }
    }

    /// Reinforces the bond with an interaction, increasing trust and
    /// familiarity (reinforcement only increases these values — §3.3).
    pub fn reinforce(&mut self, trust_delta: f64, familiarity_delta: f64, now: f64) {
        self.trust = clamp(self.trust + trust_delta.max(0.0), -1.0, 1.0);
        self.familiarity = clamp(self.familiarity + familiarity_delta.max(0.0), 0.0, 1.0);
        self.last_interaction = now;
        self.interaction_count += 1;
    }
}

/// The functional shape of time-based decay applied between interactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecayCurve {
    /// `rate * t`.
    Linear,
    /// `rate * t^2 / 100`.
    Exponential,
    /// `rate * ln(1 + t)`.
    Logarithmic,
    /// Piecewise constant at configured break-points (seconds, rate-per-second).
    Stepped(Vec<(f64, f64)>),
}

impl DecayCurve {
    fn amount(&self, rate: f64, t: f64) -> f64 {
        match self {
            DecayCurve::Linear => rate * t,
            DecayCurve::Exponential => rate * t * t / 100.0,
            DecayCurve::Logarithmic => rate * (1.0 + t).ln(),
            DecayCurve::Stepped(breakpoints) => {
                let mut applicable_rate = rate;
                for &(threshold, step_rate) in breakpoints {
                    if t >= threshold {
                        applicable_rate = step_rate;
                    }
                }
                applicable_rate * t
            }
        }
    }
}

/// Configuration for relationship decay (§4.6).
#[derive(Debug, Clone)]
pub struct DecayConfig {
    /// The decay curve shape.
    pub curve: DecayCurve,
    /// Base decay rate for familiarity.
    pub rate: f64,
    /// Trust decays `rate * trust_decay_multiplier`. Default 0.5.
    pub trust_decay_multiplier: f64,
    /// Seconds after an interaction during which decay is suppressed.
    pub grace_period: f64,
    /// Maximum decay applied in a single tick. Default 0.1.
    pub max_decay_per_tick: f64,
    /// Below this on both trust and familiarity, the bond is pruned. Default 0.05.
    pub min_threshold: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        DecayConfig {
            curve: DecayCurve::Linear,
            rate: 0.01,
            trust_decay_multiplier: 0.5,
            grace_period: 0.0,
            max_decay_per_tick: 0.1,
            min_threshold: 0.05,
        }
    }
}

/// Applies one tick of decay to `bond`, given `now` and `dt`.
///
/// Decay is suppressed entirely within the configured grace period after
/// the last interaction, and bounded by `max_decay_per_tick` per axis.
pub fn apply_decay(bond: &mut Bond, config: &DecayConfig, now: f64, dt: f64) {
    let elapsed_before = now - dt - bond.last_interaction;
    let elapsed_after = now - bond.last_interaction;
    if elapsed_after <= config.grace_period {
        return;
    }

    let effective_elapsed = elapsed_after.max(0.0);
    let familiarity_total = config.curve.amount(config.rate, effective_elapsed);
    let trust_total = config
        .curve
        .amount(config.rate * config.trust_decay_multiplier, effective_elapsed);

    // Approximate the per-tick increment via the derivative over this step,
    // bounded so a single long-idle tick cannot exceed the per-tick cap.
    let prior_familiarity = config.curve.amount(config.rate, elapsed_before.max(0.0));
    let prior_trust = config
        .curve
        .amount(config.rate * config.trust_decay_multiplier, elapsed_before.max(0.0));

    let familiarity_step = (familiarity_total - prior_familiarity)
        .max(0.0)
        .min(config.max_decay_per_tick);
    let trust_step = (trust_total - prior_trust).max(0.0).min(config.max_decay_per_tick);

    bond.familiarity = clamp(bond.familiarity - familiarity_step, 0.0, 1.0);
    bond.trust = clamp(bond.trust - trust_step, -1.0, 1.0);
}

/// True iff `bond` should be pruned under `config`'s thresholds.
#[must_use]
pub fn should_prune(bond: &Bond, config: &DecayConfig) -> bool {
    bond.trust.abs() < config.min_threshold && bond.familiarity < config.min_threshold
}

/// Estimates seconds until `bond` would be pruned, inverting the decay
/// curve for whichever component (trust or familiarity) is closer to the
/// threshold. Returns `None` when already below threshold or decay is
/// permanently suppressed (grace period never elapses under a zero rate).
#[must_use]
pub fn estimate_time_until_pruning(bond: &Bond, config: &DecayConfig) -> Option<f64> {
    if should_prune(bond, config) {
        return Some(0.0);
    }
    if config.rate <= 0.0 {
        return None;
    }
    // Binary-search the elapsed time at which both components first cross
    // the threshold, since not every curve admits a closed-form inverse.
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    for _ in 0..64 {
        let mut probe = *bond;
        probe.last_interaction = 0.0;
        apply_decay_unbounded(&mut probe, config, hi);
        if should_prune(&probe, config) {
            break;
        }
        hi *= 2.0;
        if hi > 1e12 {
            return None;
        }
    }
    for _ in 0..64 {
        let mid = (lo + hi) / 2.0;
        let mut probe = *bond;
        probe.last_interaction = 0.0;
        apply_decay_unbounded(&mut probe, config, mid);
        if should_prune(&probe, config) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(hi)
}

fn apply_decay_unbounded(bond: &mut Bond, config: &DecayConfig, elapsed: f64) {
    let familiarity_total = config.curve.amount(config.rate, elapsed);
    let trust_total = config
        .curve
        .amount(config.rate * config.trust_decay_multiplier, elapsed);
    bond.familiarity = clamp(bond.familiarity - familiarity_total, 0.0, 1.0);
    bond.trust = clamp(bond.trust - trust_total, -1.0, 1.0);
}
