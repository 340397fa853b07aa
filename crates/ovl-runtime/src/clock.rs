#![forbid(unsafe_code)]

//! Wall-clock to virtual-time bridge.
//!
//! Everything in the orchestrator runs on explicit deltas. A host that
//! drives frames from a real clock feeds [`FrameClock::tick`] with the frame
//! timestamp and forwards the returned delta.

use std::time::Duration;

use web_time::Instant;

/// Converts frame timestamps into deltas.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Delta since the previous tick. The first tick yields zero, as does a
    /// timestamp earlier than the previous one.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let dt = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(match self.last {
            Some(last) if last > now => last,
            _ => now,
        });
        dt
    }

    /// Forget the last timestamp (after the host was paused).
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn later_tick_yields_difference() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        assert_eq!(clock.tick(t0 + Duration::from_millis(16)), Duration::from_millis(16));
    }

    #[test]
    fn backwards_time_is_clamped() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now() + Duration::from_secs(1);
        clock.tick(t0);
        assert_eq!(clock.tick(t0 - Duration::from_millis(5)), Duration::ZERO);
        assert_eq!(clock.tick(t0 + Duration::from_millis(5)), Duration::from_millis(5));
    }

    #[test]
    fn reset_forgets_last_frame() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        clock.reset();
        assert_eq!(clock.tick(t0 + Duration::from_secs(3)), Duration::ZERO);
    }
}
