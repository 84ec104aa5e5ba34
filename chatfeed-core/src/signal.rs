//! Signal boosts: short-lived, decaying biases from outside events.
//!
//! Each of the five [`SignalKind`]s carries a level in `[0, 1]` and a
//! hold-until timestamp. Pushing a signal snaps its level to `1.0`; every
//! tick all levels fall linearly by `decay_per_sec × dt`.
//!
//! The hold timestamp is recorded and extended on every push but does not
//! pause decay: a boost starts fading the moment it is set.
//!
//! ```text
//! level
//!  1.0 ┤█
//!      │ ▀▄
//!      │   ▀▄           multiplier = lerp(1, m, level)
//!      │     ▀▄
//!  0.0 ┤───────▀▀▀▀▀▀▀▀  t
//! ```

use crate::config::SignalsConfig;
use crate::types::SignalKind;

/// Per-signal boost levels and hold timestamps.
#[derive(Debug, Clone)]
pub struct SignalBoosts {
    levels: [f64; SignalKind::COUNT],
    hold_until: [f64; SignalKind::COUNT],
}

impl Default for SignalBoosts {
    fn default() -> Self {
        Self {
            levels: [0.0; SignalKind::COUNT],
            hold_until: [f64::NEG_INFINITY; SignalKind::COUNT],
        }
    }
}

impl SignalBoosts {
    /// All levels at zero, no holds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `signal` to full strength and extend its hold.
    pub fn push(&mut self, signal: SignalKind, now: f64, hold_sec: f64) {
        let i = signal.index();
        self.levels[i] = 1.0;
        self.hold_until[i] = self.hold_until[i].max(now + hold_sec.max(0.0));
    }

    /// Linear decay of every level, floored at zero.
    pub fn decay(&mut self, dt: f64, decay_per_sec: f64) {
        let step = (decay_per_sec * dt).max(0.0);
        if step == 0.0 {
            return;
        }
        for level in &mut self.levels {
            *level = (*level - step).max(0.0);
        }
    }

    /// Current level of `signal`.
    #[must_use]
    pub fn level(&self, signal: SignalKind) -> f64 {
        self.levels[signal.index()]
    }

    /// Timestamp until which `signal` is considered held.
    #[must_use]
    pub fn hold_until(&self, signal: SignalKind) -> f64 {
        self.hold_until[signal.index()]
    }

    /// Weight multiplier contributed by `signal`: `lerp(1, m, level)`.
    #[must_use]
    pub fn multiplier(&self, signal: SignalKind, config: &SignalsConfig) -> f64 {
        let target = config.response(signal).multiplier;
        lerp(1.0, target, self.level(signal))
    }

    /// Whether any boost is still above zero.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.levels.iter().any(|l| *l > 0.0)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
