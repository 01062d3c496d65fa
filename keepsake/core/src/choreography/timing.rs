//! Easing and transitions
//!
//! A [`Transition`] says how a property moves from its current value to a
//! new target: how long it takes and which [`Easing`] curve it follows.
//! Curves map progress `t` in `0.0..=1.0` to eased progress; overshooting
//! curves (back, elastic) may leave that range briefly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Easing curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Slow start
    EaseIn,
    /// Slow end
    EaseOut,
    /// Slow start and end
    EaseInOut,
    /// Cubic slow start
    EaseInCubic,
    /// Cubic slow end
    EaseOutCubic,
    /// Cubic slow start and end
    EaseInOutCubic,
    /// Bounces against the target
    EaseOutBounce,
    /// Springs past the target and oscillates
    EaseOutElastic,
    /// Overshoots once, then settles
    EaseOutBack,
}

impl Easing {
    /// Map linear progress to eased progress
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseOutBounce => bounce(t),
            Self::EaseOutElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * std::f32::consts::PI) / 3.0;
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Self::EaseOutBack => {
                const C1: f32 = 1.701_58;
                const C3: f32 = C1 + 1.0;
                let u = t - 1.0;
                1.0 + C3 * u.powi(3) + C1 * u.powi(2)
            }
        }
    }
}

fn bounce(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}

/// Duration plus easing for one property change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Transition {
    /// How long the change takes; zero snaps
    pub duration: Duration,
    /// Curve followed during the change
    pub easing: Easing,
}

impl Transition {
    /// Immediate change
    pub const SNAP: Transition = Transition {
        duration: Duration::ZERO,
        easing: Easing::Linear,
    };

    /// Transition over `ms` milliseconds
    #[must_use]
    pub const fn ms(ms: u64, easing: Easing) -> Self {
        Self {
            duration: Duration::from_millis(ms),
            easing,
        }
    }

    /// Eased progress after `elapsed`
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            // Land exactly on the target regardless of curve
            return 1.0;
        }
        self.easing.apply(t)
    }

    /// Whether the transition is over after `elapsed`
    #[must_use]
    pub fn is_settled(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseOutBounce,
        Easing::EaseOutElastic,
        Easing::EaseOutBack,
    ];

    #[test]
    fn test_curves_pin_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 0.001, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_back_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::EaseOutBack.apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_ease_in_starts_slow() {
        assert!(Easing::EaseIn.apply(0.25) < 0.25);
        assert!(Easing::EaseOut.apply(0.25) > 0.25);
    }

    #[test]
    fn test_transition_progress() {
        let t = Transition::ms(200, Easing::Linear);
        assert!((t.progress(Duration::from_millis(50)) - 0.25).abs() < 1e-4);
        assert_eq!(t.progress(Duration::from_millis(400)), 1.0);
        assert!(t.is_settled(Duration::from_millis(200)));
        assert_eq!(Transition::SNAP.progress(Duration::ZERO), 1.0);
    }
}
