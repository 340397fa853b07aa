#![forbid(unsafe_code)]

//! Blocking progress overlay with a short fade/scale reveal.

use std::time::Duration;

use ovl_runtime::{Animator, AnimatorEvent};

/// Smallest scale of the progress card while fading.
pub const MIN_PROGRESS_SCALE: f32 = 0.85;

/// Platform work requested by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEffect {
    Attach,
    Message(String),
    /// Reveal progress; scale and dim derive from it.
    Factor(f32),
    /// A cancellable progress was dismissed by the user.
    Closed,
    Detach,
}

/// Show/hide state of the progress overlay.
#[derive(Debug)]
pub struct ProgressOverlay {
    showing: bool,
    attached: bool,
    cancellable: bool,
    anim: Animator,
    effects: Vec<ProgressEffect>,
}

impl ProgressOverlay {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            showing: false,
            attached: false,
            cancellable: false,
            anim: Animator::new(0.0, duration),
            effects: Vec::new(),
        }
    }

    #[inline]
    pub fn is_showing(&self) -> bool {
        self.showing
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.anim.is_animating()
    }

    #[inline]
    pub fn is_cancellable(&self) -> bool {
        self.cancellable
    }

    #[inline]
    pub fn factor(&self) -> f32 {
        self.anim.value()
    }

    /// Card scale for the current factor.
    pub fn scale(&self) -> f32 {
        MIN_PROGRESS_SCALE + (1.0 - MIN_PROGRESS_SCALE) * self.anim.value()
    }

    pub fn drain_effects(&mut self) -> Vec<ProgressEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Show `message`. While already showing, only the message changes.
    pub fn show(&mut self, message: &str, cancellable: bool) {
        self.effects.push(ProgressEffect::Message(message.to_owned()));
        if self.showing {
            return;
        }
        self.showing = true;
        self.cancellable = cancellable;
        if !self.attached {
            self.attached = true;
            self.effects.push(ProgressEffect::Attach);
        }
        self.anim.animate_to(1.0);
    }

    /// Fade out. `forced` marks a user dismissal of a cancellable progress.
    pub fn hide(&mut self, forced: bool) {
        if !self.showing {
            return;
        }
        if forced && self.cancellable {
            self.effects.push(ProgressEffect::Closed);
        }
        self.showing = false;
        self.cancellable = false;
        self.anim.animate_to(0.0);
    }

    /// Route a back press. Consumed whenever the overlay is showing.
    pub fn on_back_pressed(&mut self) -> bool {
        if !self.showing {
            return false;
        }
        if self.cancellable {
            self.hide(true);
        }
        true
    }

    pub fn advance(&mut self, dt: Duration) {
        match self.anim.advance(dt) {
            None => {}
            Some(AnimatorEvent::Progress(v)) => self.effects.push(ProgressEffect::Factor(v)),
            Some(AnimatorEvent::Completed(v)) => {
                self.effects.push(ProgressEffect::Factor(v));
                if !self.showing && self.attached {
                    self.attached = false;
                    self.effects.push(ProgressEffect::Detach);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn show_then_hide_detaches() {
        let mut p = ProgressOverlay::new(ms(220));
        p.show("Loading", false);
        assert_eq!(
            p.drain_effects(),
            vec![ProgressEffect::Message("Loading".into()), ProgressEffect::Attach]
        );
        p.advance(ms(220));
        assert_eq!(p.factor(), 1.0);
        assert!((p.scale() - 1.0).abs() < 1e-6);
        p.hide(false);
        p.advance(ms(220));
        let effects = p.drain_effects();
        assert_eq!(effects.last(), Some(&ProgressEffect::Detach));
        assert!(!effects.contains(&ProgressEffect::Closed));
    }

    #[test]
    fn second_show_updates_message() {
        let mut p = ProgressOverlay::new(ms(220));
        p.show("a", false);
        p.drain_effects();
        p.show("b", true);
        assert_eq!(p.drain_effects(), vec![ProgressEffect::Message("b".into())]);
        assert!(!p.is_cancellable());
    }

    #[test]
    fn back_press_closes_cancellable() {
        let mut p = ProgressOverlay::new(ms(220));
        p.show("x", true);
        p.drain_effects();
        assert!(p.on_back_pressed());
        assert!(!p.is_showing());
        assert!(p.drain_effects().contains(&ProgressEffect::Closed));
        assert!(!p.on_back_pressed());
    }

    #[test]
    fn back_press_swallowed_when_not_cancellable() {
        let mut p = ProgressOverlay::new(ms(220));
        p.show("x", false);
        assert!(p.on_back_pressed());
        assert!(p.is_showing());
    }

    #[test]
    fn reshow_during_fade_out_keeps_surface() {
        let mut p = ProgressOverlay::new(ms(220));
        p.show("x", false);
        p.advance(ms(220));
        p.hide(false);
        p.advance(ms(50));
        p.drain_effects();
        p.show("y", false);
        assert!(!p.drain_effects().contains(&ProgressEffect::Attach));
        p.advance(ms(220));
        assert!(!p.drain_effects().contains(&ProgressEffect::Detach));
        assert_eq!(p.factor(), 1.0);
    }
}
