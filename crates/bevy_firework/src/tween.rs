//! Time-based interpolation of a single scalar.

use bevy::math::curve::{Curve, EaseFunction, EasingCurve};
use bevy::prelude::*;

/// Interpolates a value from `from` to `to` over `duration` seconds.
#[derive(Component, Debug, Clone)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Total duration in seconds.
    pub duration: f32,
    /// Seconds elapsed so far, never past `duration`.
    pub elapsed: f32,
    pub ease: EaseFunction,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, ease: EaseFunction) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            ease,
        }
    }

    /// Normalized time in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Current eased value.
    pub fn value(&self) -> f32 {
        EasingCurve::new(self.from, self.to, self.ease).sample_clamped(self.fraction())
    }

    /// Step the tween by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration.max(0.0));
        self.value()
    }

    pub fn is_finished(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_progress() {
        let mut tween = Tween::new(0.0, 1.0, 3.0, EaseFunction::Linear);
        assert_eq!(tween.value(), 0.0);
        assert!((tween.advance(1.5) - 0.5).abs() < 1e-5);
        assert!(!tween.is_finished());
        assert!((tween.advance(1.5) - 1.0).abs() < 1e-5);
        assert!(tween.is_finished());
    }

    #[test]
    fn overshoot_clamps_to_end() {
        let mut tween = Tween::new(2.0, 4.0, 1.0, EaseFunction::Linear);
        assert!((tween.advance(10.0) - 4.0).abs() < 1e-5);
        assert_eq!(tween.elapsed, 1.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn zero_duration_finishes_at_target() {
        let mut tween = Tween::new(0.0, 1.0, 0.0, EaseFunction::Linear);
        assert!(tween.is_finished());
        assert!((tween.advance(0.016) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn negative_delta_does_not_rewind() {
        let mut tween = Tween::new(0.0, 1.0, 2.0, EaseFunction::Linear);
        tween.advance(1.0);
        tween.advance(-5.0);
        assert!((tween.value() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn easing_is_applied() {
        let mut tween = Tween::new(0.0, 1.0, 1.0, EaseFunction::QuadraticIn);
        assert!((tween.advance(0.5) - 0.25).abs() < 1e-4);
    }
}
