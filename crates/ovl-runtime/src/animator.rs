#![forbid(unsafe_code)]

//! Single-value animator driven by explicit time deltas.
//!
//! Every overlay transition (camera factor, passcode fade, progress reveal,
//! modal reveal) is one [`Animator`] moving a value in `[0, 1]`.
//!
//! # Invariants
//!
//! 1. `value()` is always within `[0, 1]`.
//! 2. While animating, successive values move monotonically toward the
//!    target.
//! 3. [`Animator::animate_to`] redirects from the current value; there is no
//!    jump to the previous target first.
//! 4. [`Animator::force_value`] stops any motion.
//! 5. Exactly one [`AnimatorEvent::Completed`] is emitted per finished run,
//!    carrying the target value.

use std::time::Duration;

/// Interpolation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// `1 - (1 - t)^2`.
    #[default]
    Decelerate,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Result of one [`Animator::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorEvent {
    Progress(f32),
    Completed(f32),
}

impl AnimatorEvent {
    /// The value carried by the event.
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            Self::Progress(v) | Self::Completed(v) => v,
        }
    }
}

/// Animates one `f32` between 0 and 1.
#[derive(Debug, Clone)]
pub struct Animator {
    value: f32,
    from: f32,
    target: f32,
    duration: Duration,
    elapsed: Duration,
    running: bool,
    easing: Easing,
}

impl Animator {
    /// Create an idle animator resting at `value`.
    #[must_use]
    pub fn new(value: f32, duration: Duration) -> Self {
        let value = value.clamp(0.0, 1.0);
        Self {
            value,
            from: value,
            target: value,
            duration,
            elapsed: Duration::ZERO,
            running: false,
            easing: Easing::default(),
        }
    }

    /// Use a different easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Where the current (or last) run is headed.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Duration used by the next run. A run in flight keeps its progress.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Start moving toward `to` from the current value.
    ///
    /// Returns `false` if already resting at `to`, or already moving to it.
    pub fn animate_to(&mut self, to: f32) -> bool {
        let to = to.clamp(0.0, 1.0);
        if self.running && self.target == to {
            return false;
        }
        if !self.running && self.value == to {
            return false;
        }
        self.from = self.value;
        self.target = to;
        self.elapsed = Duration::ZERO;
        self.running = true;
        true
    }

    /// Jump to `from` and animate to `to` over `duration`.
    pub fn start(&mut self, from: f32, to: f32, duration: Duration) {
        self.duration = duration;
        self.value = from.clamp(0.0, 1.0);
        self.from = self.value;
        self.target = to.clamp(0.0, 1.0);
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    /// Set the value directly and stop any motion.
    pub fn force_value(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        self.value = value;
        self.from = value;
        self.target = value;
        self.running = false;
    }

    /// Stop where it is.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// Step the animation by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Option<AnimatorEvent> {
        if !self.running {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        if t >= 1.0 {
            self.value = self.target;
            self.from = self.target;
            self.running = false;
            return Some(AnimatorEvent::Completed(self.value));
        }
        let eased = self.easing.apply(t);
        self.value = (self.from + (self.target - self.from) * eased).clamp(0.0, 1.0);
        Some(AnimatorEvent::Progress(self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn runs_to_completion() {
        let mut a = Animator::new(0.0, ms(100));
        assert!(a.animate_to(1.0));
        assert!(matches!(a.advance(ms(50)), Some(AnimatorEvent::Progress(v)) if v > 0.5));
        assert_eq!(a.advance(ms(50)), Some(AnimatorEvent::Completed(1.0)));
        assert_eq!(a.advance(ms(50)), None);
        assert!(!a.is_animating());
    }

    #[test]
    fn animate_to_current_value_is_noop() {
        let mut a = Animator::new(1.0, ms(100));
        assert!(!a.animate_to(1.0));
        assert!(a.advance(ms(10)).is_none());
    }

    #[test]
    fn redirect_starts_from_current_value() {
        let mut a = Animator::new(0.0, ms(100)).with_easing(Easing::Linear);
        a.animate_to(1.0);
        a.advance(ms(30));
        let mid = a.value();
        assert!((mid - 0.3).abs() < 1e-4);
        assert!(a.animate_to(0.0));
        let next = a.advance(ms(10)).map(AnimatorEvent::value).unwrap_or(1.0);
        assert!(next < mid);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut a = Animator::new(0.0, ms(100)).with_easing(Easing::Linear);
        a.animate_to(1.0);
        a.advance(ms(50));
        assert!(!a.animate_to(1.0));
        assert_eq!(a.advance(ms(50)), Some(AnimatorEvent::Completed(1.0)));
    }

    #[test]
    fn force_value_stops_motion_and_clamps() {
        let mut a = Animator::new(0.0, ms(100));
        a.animate_to(1.0);
        a.force_value(1.7);
        assert_eq!(a.value(), 1.0);
        assert!(!a.is_animating());
        a.force_value(-3.0);
        assert_eq!(a.value(), 0.0);
    }

    #[test]
    fn zero_duration_completes_on_first_step() {
        let mut a = Animator::new(0.0, Duration::ZERO);
        a.animate_to(1.0);
        assert_eq!(a.advance(Duration::ZERO), Some(AnimatorEvent::Completed(1.0)));
    }

    #[test]
    fn start_with_equal_endpoints_still_completes() {
        let mut a = Animator::new(0.5, ms(10));
        a.start(1.0, 1.0, ms(10));
        assert_eq!(a.advance(ms(10)), Some(AnimatorEvent::Completed(1.0)));
    }

    #[test]
    fn decelerate_is_front_loaded() {
        assert!(Easing::Decelerate.apply(0.5) > 0.5);
        assert_eq!(Easing::Decelerate.apply(1.0), 1.0);
        assert_eq!(Easing::Decelerate.apply(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn values_move_monotonically_toward_target(
            start in 0.0f32..=1.0,
            to in 0.0f32..=1.0,
            steps in proptest::collection::vec(1u64..40, 1..30),
        ) {
            let mut a = Animator::new(start, ms(200));
            a.animate_to(to);
            let mut prev = a.value();
            for step in steps {
                let Some(ev) = a.advance(ms(step)) else { break };
                let v = ev.value();
                prop_assert!((0.0..=1.0).contains(&v));
                if to >= start {
                    prop_assert!(v >= prev - 1e-6);
                } else {
                    prop_assert!(v <= prev + 1e-6);
                }
                prev = v;
            }
        }

        #[test]
        fn forced_values_stay_in_unit_range(v in -10.0f32..10.0) {
            let mut a = Animator::new(0.0, ms(100));
            a.force_value(v);
            prop_assert!((0.0..=1.0).contains(&a.value()));
        }
    }
}
