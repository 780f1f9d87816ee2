//! Per-entity autonomous timers (§9 "coroutine / event-loop control flow
//! in source").
//!
//! Behaviors like "speak every 15-45s" are expressed tick-driven: a timer
//! accumulates `elapsed += dt` and fires once `elapsed >= period`, at
//! which point the caller is expected to react to the returned name via
//! the world's event stream. No wall clock, no scheduler thread.

use serde::{Deserialize, Serialize};

/// A named, periodic, jitter-able timer advanced by `dt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    /// The name emitted as `timer.fire` payload when the timer elapses.
    pub name: String,
    /// Seconds accumulated since the last fire.
    pub elapsed: f64,
    /// Seconds between fires.
    pub period: f64,
    /// Random jitter added to `period` on each re-arm, in `[0, jitter]`.
    pub jitter: f64,
}

impl Timer {
    /// Creates a new timer, starting at zero elapsed time.
    #[must_use]
    pub fn new(name: impl Into<String>, period: f64, jitter: f64) -> Self {
        Timer {
            name: name.into(),
            elapsed: 0.0,
            period,
            jitter,
        }
    }

    /// Advances the timer by `dt`. Returns `true` exactly once the period
    /// (plus a random jitter draw) elapses, resetting `elapsed` to zero.
    pub fn advance(&mut self, dt: f64, jitter_roll: f64) -> bool {
        self.elapsed += dt;
        let threshold = self.period + self.jitter * jitter_roll;
        if self.elapsed >= threshold {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_period_elapses() {
        let mut timer = Timer::new("speak", 10.0, 0.0);
        assert!(!timer.advance(5.0, 0.0));
        assert!(timer.advance(5.0, 0.0));
        assert_eq!(timer.elapsed, 0.0);
    }

    #[test]
    fn jitter_extends_threshold() {
        let mut timer = Timer::new("speak", 10.0, 5.0);
        assert!(!timer.advance(12.0, 1.0));
        assert!(timer.advance(3.0, 1.0));
    }
}
