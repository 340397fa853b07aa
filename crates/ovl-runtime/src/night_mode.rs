#![forbid(unsafe_code)]

//! Ambient-light night-mode debouncer.
//!
//! Lux samples at or below `max_lux` mean "night". The debouncer turns a
//! noisy sample stream into day/night decisions:
//!
//! - While **armed**, a sample that disagrees with the current mode schedules
//!   a confirmation after `confirm_delay`. A sample agreeing with the current
//!   mode cancels it. A sample for the opposite target replaces it.
//! - A confirmed switch **disarms** and remembers its direction. While
//!   disarmed, flips in that same direction apply immediately. A flip in the
//!   other direction re-arms and is deferred again. With samples alone the
//!   mode always alternates, so every sensor-driven switch is deferred; the
//!   immediate path only fires after the theme was moved by hand
//!   ([`force`](NightModeDebouncer::force)) away from the last switch.
//! - When the switch is not allowed (foreground screen forbids theme changes
//!   or a proximity lock is active), samples are ignored and a confirmation
//!   that comes due is dropped. The debouncer stays armed.
//!
//! Methods that decide a switch return `Some(night)`; the caller applies it to
//! the theme.
//!
//! # Invariants
//!
//! 1. At most one confirmation is pending.
//! 2. `in_night()` only changes through a returned decision, [`sync`](NightModeDebouncer::sync)
//!    or [`force`](NightModeDebouncer::force).
//! 3. A cancelled confirmation never applies.

use std::time::Duration;

use crate::scheduler::{Scheduler, TaskSlot};

/// One-shot debouncer for automatic night mode.
#[derive(Debug)]
pub struct NightModeDebouncer {
    max_lux: f32,
    confirm_delay: Duration,
    in_night: bool,
    armed: bool,
    last_switch: Option<bool>,
    last_lux: Option<f32>,
    scheduler: Scheduler<bool>,
    pending: TaskSlot,
}

impl NightModeDebouncer {
    /// Create an armed debouncer starting in the given mode.
    #[must_use]
    pub fn new(in_night: bool, max_lux: f32, confirm_delay: Duration) -> Self {
        Self {
            max_lux,
            confirm_delay,
            in_night,
            armed: true,
            last_switch: None,
            last_lux: None,
            scheduler: Scheduler::new(),
            pending: TaskSlot::new(),
        }
    }

    #[inline]
    pub fn in_night(&self) -> bool {
        self.in_night
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether a deferred confirmation is waiting.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending(&self.scheduler)
    }

    /// The target of the pending confirmation, if any.
    pub fn pending_target(&self) -> Option<bool> {
        self.pending
            .task()
            .and_then(|task| self.scheduler.body(task).copied())
    }

    #[inline]
    pub fn last_lux(&self) -> Option<f32> {
        self.last_lux
    }

    #[inline]
    pub fn max_lux(&self) -> f32 {
        self.max_lux
    }

    pub fn set_max_lux(&mut self, max_lux: f32) {
        self.max_lux = max_lux;
    }

    /// Whether `lux` reads as night.
    #[inline]
    pub fn is_night_lux(&self, lux: f32) -> bool {
        lux <= self.max_lux
    }

    /// Adopt the theme's current mode (e.g. when the sensor gets registered).
    ///
    /// Cancels any pending confirmation and re-arms.
    pub fn sync(&mut self, in_night: bool) {
        self.pending.cancel(&mut self.scheduler);
        self.in_night = in_night;
        self.armed = true;
        self.last_switch = None;
    }

    /// Feed one sensor sample.
    pub fn sample(&mut self, lux: f32, allowed: bool) -> Option<bool> {
        self.last_lux = Some(lux);
        let wants = self.is_night_lux(lux);
        if wants == self.in_night {
            if self.pending.cancel(&mut self.scheduler) {
                tracing::trace!(lux, "night-mode confirmation cancelled");
            }
            return None;
        }
        if !allowed {
            return None;
        }
        if !self.armed {
            if self.last_switch == Some(wants) {
                self.pending.cancel(&mut self.scheduler);
                return Some(self.apply(wants));
            }
            self.armed = true;
        }
        if self.pending_target() == Some(wants) {
            return None;
        }
        self.pending
            .replace(&mut self.scheduler, self.confirm_delay, wants);
        tracing::trace!(lux, night = wants, "night-mode confirmation scheduled");
        None
    }

    /// Advance virtual time; returns a confirmed switch, if any.
    pub fn advance(&mut self, dt: Duration, allowed: bool) -> Option<bool> {
        let mut decision = None;
        for night in self.scheduler.advance(dt) {
            self.pending.clear();
            if !allowed {
                tracing::debug!(night, "night-mode switch suppressed");
                continue;
            }
            if night != self.in_night {
                decision = Some(self.apply(night));
                self.armed = false;
            }
        }
        decision
    }

    /// Re-evaluate the last sample immediately, bypassing deferral.
    pub fn evaluate(&mut self, allowed: bool) -> Option<bool> {
        let lux = self.last_lux?;
        self.pending.cancel(&mut self.scheduler);
        if !allowed {
            return None;
        }
        let wants = self.is_night_lux(lux);
        if wants == self.in_night {
            return None;
        }
        let night = self.apply(wants);
        self.armed = false;
        Some(night)
    }

    /// The theme was switched by hand; re-check against the last sample.
    pub fn force(&mut self, in_night: bool, allowed: bool) -> Option<bool> {
        if self.in_night == in_night {
            return None;
        }
        self.in_night = in_night;
        self.evaluate(allowed)
    }

    fn apply(&mut self, night: bool) -> bool {
        self.in_night = night;
        self.last_switch = Some(night);
        tracing::debug!(night, "night-mode switch applied");
        night
    }
}
