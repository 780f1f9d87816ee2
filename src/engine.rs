//! Tick core: pairwise force law, bounds policy, and configuration
//! (component J, §4.1).
//!
//! `World::tick` drives the canonical per-tick order; this module holds
//! the pure calculations the orchestrator calls into, so the force law
//! and bounds policy can be unit-tested in isolation from entity/grid
//! bookkeeping.

use serde::{Deserialize, Serialize};

/// How entities are treated when they reach the world bounds (§4.1 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundsPolicy {
    /// Position is left unclamped.
    None,
    /// Position is clipped to the bounds; the offending velocity
    /// component is zeroed.
    Clamp,
    /// Position is clipped; the offending velocity component is inverted
    /// and damped by the material's bounce damping.
    Bounce,
}

/// An axis-aligned world boundary rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
}

impl Bounds {
    /// A default 480x320 world, matching the spec's default spawn range.
    #[must_use]
    pub fn default_world() -> Self {
        Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 480.0,
            max_y: 320.0,
        }
    }
}

/// Engine-wide tick configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The bounds policy applied during integration. Default `None`
    /// (position unclamped), per SPEC_FULL.md's §4.1 resolution.
    pub bounds_policy: BoundsPolicy,
    /// The world boundary rectangle, consulted when `bounds_policy` is
    /// not `None`.
    pub bounds: Bounds,
    /// Distance under which two entities' proximity hooks fire. Default 80.
    pub proximity_hook_radius: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            bounds_policy: BoundsPolicy::None,
            bounds: Bounds::default_world(),
            proximity_hook_radius: 80.0,
        }
    }
}

/// The result of evaluating the pairwise force law for one ordered pair
/// `(a, b)` with `id(b) > id(a)` (§4.1 step 2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseForce {
    /// Impulse applied to `a`'s velocity (`-` of `b`'s).
    pub impulse_ax: f64,
    /// Impulse applied to `a`'s velocity (`-` of `b`'s).
    pub impulse_ay: f64,
    /// Distance between the pair, floored at 1.
    pub distance: f64,
    /// Whether the pair is close enough to fire proximity hooks.
    pub in_hook_range: bool,
}

/// Computes the equal-and-opposite impulse between two entities within
/// `proximity_radius`, or `None` if they are outside it.
///
/// `d = max(1, hypot(dx, dy))`; similarity `s = 1 - |entropy_a -
/// entropy_b|`; magnitude `k = 0.05 * s`; impulse is `(dx/d, dy/d) * k *
/// dt` applied to `a`, and its negation to `b`.
#[must_use]
pub fn pairwise_force(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    entropy_a: f64,
    entropy_b: f64,
    proximity_radius: f64,
    hook_radius: f64,
    dt: f64,
) -> Option<PairwiseForce> {
    let dx = bx - ax;
    let dy = by - ay;
    let raw_d = dx.hypot(dy);
    if raw_d >= proximity_radius {
        return None;
    }
    let d = raw_d.max(1.0);
    let similarity = 1.0 - (entropy_a - entropy_b).abs();
    let k = 0.05 * similarity;
    let impulse_ax = (dx / d) * k * dt;
    let impulse_ay = (dy / d) * k * dt;
    Some(PairwiseForce {
        impulse_ax,
        impulse_ay,
        distance: raw_d,
        in_hook_range: raw_d < hook_radius,
    })
}

/// Applies friction (velocity damping) for one tick: `velocity *= (1 -
/// friction)`, independent of `dt` (the tick is a unit step, matching
/// `integrate_and_bound`'s undilated `x += vx`).
#[must_use]
pub fn apply_friction(vx: f64, vy: f64, friction: f64) -> (f64, f64) {
    let factor = (1.0 - friction).max(0.0);
    (vx * factor, vy * factor)
}

/// The outcome of integrating and bounding one entity for a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationResult {
    /// New x, y.
    pub x: f64,
    /// New x, y.
    pub y: f64,
    /// New vx, vy.
    pub vx: f64,
    /// New vx, vy.
    pub vy: f64,
}

/// Integrates position by velocity, then applies the bounds policy
/// (§4.1 step 4).
///
/// Entities with non-finite position or velocity stop moving for the
/// tick (coordinates unchanged) rather than throwing (§4.1 failure model).
#[must_use]
pub fn integrate_and_bound(
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    config: &EngineConfig,
    bounce_damping: f64,
) -> IntegrationResult {
    if !x.is_finite() || !y.is_finite() || !vx.is_finite() || !vy.is_finite() {
        return IntegrationResult { x, y, vx, vy };
    }

    let mut nx = x + vx;
    let mut ny = y + vy;
    let mut nvx = vx;
    let mut nvy = vy;

    match config.bounds_policy {
        BoundsPolicy::None => {}
        BoundsPolicy::Clamp => {
            if nx < config.bounds.min_x {
                nx = config.bounds.min_x;
                nvx = 0.0;
            } else if nx > config.bounds.max_x {
                nx = config.bounds.max_x;
                nvx = 0.0;
            }
            if ny < config.bounds.min_y {
                ny = config.bounds.min_y;
                nvy = 0.0;
            } else if ny > config.bounds.max_y {
                ny = config.bounds.max_y;
                nvy = 0.0;
            }
        }
        BoundsPolicy::Bounce => {
            if nx < config.bounds.min_x {
                nx = config.bounds.min_x;
                nvx = -nvx * bounce_damping;
            } else if nx > config.bounds.max_x {
                nx = config.bounds.max_x;
                nvx = -nvx * bounce_damping;
            }
            if ny < config.bounds.min_y {
                ny = config.bounds.min_y;
                nvy = -nvy * bounce_damping;
            } else if ny > config.bounds.max_y {
                ny = config.bounds.max_y;
                nvy = -nvy * bounce_damping;
            }
        }
    }

    IntegrationResult {
        x: nx,
        y: ny,
        vx: nvx,
        vy: nvy,
    }
}
