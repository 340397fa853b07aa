#![forbid(unsafe_code)]

//! The passcode gate: a full-screen lock that freezes every other surface.
//!
//! Like [`CameraMachine`](crate::camera::CameraMachine) the gate only
//! decides; platform work is queued as [`PasscodeEffect`]s in the order it
//! has to happen.
//!
//! # Invariants
//!
//! 1. `show` while showing and `hide` while hidden are no-ops.
//! 2. Live windows are suspended exactly once per lock and restored only
//!    after the fade-out completes.
//! 3. A pending navigation focus restore is cancelled by the next `show`
//!    instead of blurring navigation again.

use std::time::Duration;

use ovl_runtime::{Animator, AnimatorEvent};

/// Platform work requested by the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PasscodeEffect {
    /// Hide every live modal window without destroying it.
    SuspendWindows,
    RestoreWindows,
    /// Value of the `PASSCODE_ACTIVE` reason.
    Active(bool),
    BlurNavigation,
    /// Queue navigation focus after the restore delay.
    ScheduleFocusRestore,
    CancelFocusRestore,
    /// Tell passcode listeners about the new showing state.
    Notify(bool),
    PrepareLock,
    AttachLock,
    FocusLock,
    DetachLock,
    TeardownLock,
    DetachContent,
    /// Put main content back at `index` in the root.
    AttachContent { index: usize },
    LockAlpha(f32),
    StatusBarColor(u32),
}

/// Show/hide logic of the lock surface.
#[derive(Debug)]
pub struct PasscodeGate {
    showing: bool,
    lock_attached: bool,
    windows_suspended: bool,
    focus_restore_pending: bool,
    saved_status_color: u32,
    default_status_color: u32,
    fade: Animator,
    effects: Vec<PasscodeEffect>,
}

impl PasscodeGate {
    #[must_use]
    pub fn new(fade_duration: Duration) -> Self {
        Self {
            showing: false,
            lock_attached: false,
            windows_suspended: false,
            focus_restore_pending: false,
            saved_status_color: 0,
            default_status_color: 0,
            fade: Animator::new(0.0, fade_duration),
            effects: Vec::new(),
        }
    }

    #[inline]
    pub fn is_showing(&self) -> bool {
        self.showing
    }

    /// Lock surface is attached, shown or fading.
    #[inline]
    pub fn is_lock_attached(&self) -> bool {
        self.lock_attached
    }

    #[inline]
    pub fn is_fading(&self) -> bool {
        !self.showing && self.fade.is_animating()
    }

    /// Current lock opacity, `0.0` once detached.
    pub fn lock_alpha(&self) -> f32 {
        if self.lock_attached {
            self.fade.value()
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_focus_restore_pending(&self) -> bool {
        self.focus_restore_pending
    }

    pub fn drain_effects(&mut self) -> Vec<PasscodeEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Raise the lock. `status_color` is the color to restore on hide.
    pub fn show(&mut self, status_color: u32, default_status_color: u32) {
        if self.showing {
            return;
        }
        self.saved_status_color = status_color;
        self.default_status_color = default_status_color;
        self.set_showing(true);

        self.effects.push(PasscodeEffect::PrepareLock);
        self.effects.push(PasscodeEffect::DetachContent);
        if !self.lock_attached {
            self.effects.push(PasscodeEffect::AttachLock);
            self.lock_attached = true;
        }
        self.fade.force_value(1.0);
        self.effects.push(PasscodeEffect::LockAlpha(1.0));
        self.effects.push(PasscodeEffect::FocusLock);

        if self.restores_status_color() {
            self.effects
                .push(PasscodeEffect::StatusBarColor(self.default_status_color));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("passcode shown");
    }

    /// Start lowering the lock. Content goes above the camera when the
    /// camera surface is attached.
    pub fn hide(&mut self, camera_attached: bool) {
        if !self.showing {
            return;
        }
        let index = usize::from(camera_attached);
        self.effects.push(PasscodeEffect::AttachContent { index });
        self.set_showing(false);
        self.fade.animate_to(0.0);

        if self.restores_status_color() {
            self.effects
                .push(PasscodeEffect::StatusBarColor(self.saved_status_color));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("passcode hiding");
    }

    /// The deferred focus restore ran.
    pub fn focus_restored(&mut self) {
        self.focus_restore_pending = false;
    }

    /// Step the fade-out.
    pub fn advance(&mut self, dt: Duration) {
        match self.fade.advance(dt) {
            None => {}
            Some(AnimatorEvent::Progress(v)) => self.effects.push(PasscodeEffect::LockAlpha(v)),
            Some(AnimatorEvent::Completed(v)) => {
                self.effects.push(PasscodeEffect::LockAlpha(v));
                if !self.showing {
                    self.finish_hide();
                }
            }
        }
    }

    /// Drop the lock at once (host destroyed).
    pub fn destroy(&mut self) {
        self.fade.force_value(0.0);
        self.showing = false;
        self.focus_restore_pending = false;
        if self.lock_attached {
            self.lock_attached = false;
            self.effects.push(PasscodeEffect::TeardownLock);
        }
        self.windows_suspended = false;
    }

    fn set_showing(&mut self, showing: bool) {
        self.showing = showing;
        if showing {
            if !self.windows_suspended {
                self.effects.push(PasscodeEffect::SuspendWindows);
                self.windows_suspended = true;
            }
            self.effects.push(PasscodeEffect::Active(true));
            if self.focus_restore_pending {
                self.focus_restore_pending = false;
                self.effects.push(PasscodeEffect::CancelFocusRestore);
            } else {
                self.effects.push(PasscodeEffect::BlurNavigation);
            }
        } else {
            self.effects.push(PasscodeEffect::Active(false));
            self.focus_restore_pending = true;
            self.effects.push(PasscodeEffect::ScheduleFocusRestore);
        }
        self.effects.push(PasscodeEffect::Notify(showing));
    }

    fn finish_hide(&mut self) {
        if self.lock_attached {
            self.lock_attached = false;
            self.effects.push(PasscodeEffect::DetachLock);
            self.effects.push(PasscodeEffect::TeardownLock);
        }
        if self.windows_suspended {
            self.windows_suspended = false;
            self.effects.push(PasscodeEffect::RestoreWindows);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("passcode hidden");
    }

    fn restores_status_color(&self) -> bool {
        self.saved_status_color != 0 && self.saved_status_color != self.default_status_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn show_freezes_then_swaps_surfaces() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0, 0);
        assert!(gate.is_showing());
        assert_eq!(
            gate.drain_effects(),
            vec![
                PasscodeEffect::SuspendWindows,
                PasscodeEffect::Active(true),
                PasscodeEffect::BlurNavigation,
                PasscodeEffect::Notify(true),
                PasscodeEffect::PrepareLock,
                PasscodeEffect::DetachContent,
                PasscodeEffect::AttachLock,
                PasscodeEffect::LockAlpha(1.0),
                PasscodeEffect::FocusLock,
            ]
        );
        gate.show(0, 0);
        assert!(gate.drain_effects().is_empty());
    }

    #[test]
    fn hide_restores_windows_after_fade() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0, 0);
        gate.drain_effects();
        gate.hide(false);
        let effects = gate.drain_effects();
        assert_eq!(effects[0], PasscodeEffect::AttachContent { index: 0 });
        assert!(effects.contains(&PasscodeEffect::Active(false)));
        assert!(effects.contains(&PasscodeEffect::ScheduleFocusRestore));
        assert!(!effects.contains(&PasscodeEffect::RestoreWindows));
        assert!(gate.is_fading());

        gate.advance(ms(50));
        assert!(!gate.drain_effects().contains(&PasscodeEffect::RestoreWindows));
        assert!(gate.lock_alpha() > 0.0);

        gate.advance(ms(50));
        let effects = gate.drain_effects();
        assert!(effects.contains(&PasscodeEffect::TeardownLock));
        assert_eq!(effects.last(), Some(&PasscodeEffect::RestoreWindows));
        assert_eq!(gate.lock_alpha(), 0.0);
        assert!(!gate.is_lock_attached());
    }

    #[test]
    fn content_goes_above_attached_camera() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0, 0);
        gate.drain_effects();
        gate.hide(true);
        assert_eq!(
            gate.drain_effects()[0],
            PasscodeEffect::AttachContent { index: 1 }
        );
    }

    #[test]
    fn reshow_cancels_focus_restore() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0, 0);
        gate.hide(false);
        gate.drain_effects();
        assert!(gate.is_focus_restore_pending());

        gate.show(0, 0);
        let effects = gate.drain_effects();
        assert!(effects.contains(&PasscodeEffect::CancelFocusRestore));
        assert!(!effects.contains(&PasscodeEffect::BlurNavigation));
        // Still suspended from the first lock; lock never detached.
        assert!(!effects.contains(&PasscodeEffect::SuspendWindows));
        assert!(!effects.contains(&PasscodeEffect::AttachLock));
        assert!(!gate.is_focus_restore_pending());

        gate.advance(ms(200));
        assert!(!gate.drain_effects().contains(&PasscodeEffect::RestoreWindows));
    }

    #[test]
    fn status_color_round_trip() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0xff11_2233, 0xff00_0000);
        assert!(gate
            .drain_effects()
            .contains(&PasscodeEffect::StatusBarColor(0xff00_0000)));
        gate.hide(false);
        assert!(gate
            .drain_effects()
            .contains(&PasscodeEffect::StatusBarColor(0xff11_2233)));
    }

    #[test]
    fn default_status_color_untouched() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0xff00_0000, 0xff00_0000);
        gate.hide(false);
        assert!(!gate
            .drain_effects()
            .iter()
            .any(|e| matches!(e, PasscodeEffect::StatusBarColor(_))));
    }

    #[test]
    fn destroy_tears_down_lock() {
        let mut gate = PasscodeGate::new(ms(100));
        gate.show(0, 0);
        gate.drain_effects();
        gate.destroy();
        assert_eq!(gate.drain_effects(), vec![PasscodeEffect::TeardownLock]);
        assert!(!gate.is_showing());
    }
}
