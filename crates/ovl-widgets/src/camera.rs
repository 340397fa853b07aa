#![forbid(unsafe_code)]

//! State machine for the exclusive full-screen camera surface.
//!
//! The machine owns the camera `factor` (how visually open the camera is)
//! and the discrete target `open`. It never touches the platform: every
//! side effect is queued as a [`CameraEffect`] and applied by the owner
//! after each call, in order.
//!
//! ```text
//!            tap / drop(open)                completion at 1
//!   Closed ───────────────────▶ Opening ─────────────────────▶ Open
//!     ▲                           │ ▲                            │
//!     │ completion at 0           │ │ redirect                   │ close / drop(closed)
//!     └──────────────────────── Closing ◀─────────────────────────┘
//!
//!   Dragging(target) is entered from Closed/Open by `start_drag` and left
//!   by `drop_drag`, which hands the remaining distance to the animator.
//! ```
//!
//! # Invariants
//!
//! 1. `factor` stays within `[0, 1]`.
//! 2. Only a factor of exactly `1.0` with target open focuses the camera and
//!    detaches the main content. Only exactly `0.0` with target closed
//!    detaches the camera and refocuses the content.
//! 3. A redirect while animating continues from the current factor.
//! 4. The orientation is locked while `0 < factor < 1`, while dragging,
//!    while opening, and while fully open without free rotation; never
//!    while a media editor is open.
//!
//! # Failure Modes
//!
//! - Requests failing [`CameraMachine::can_open`] return `false` and queue
//!   nothing.
//! - Drag calls while not dragging are ignored.

use std::time::Duration;

use ovl_core::CameraOptions;
use ovl_runtime::{Animator, AnimatorEvent, OverlayConfig};

/// Host conditions consulted by [`CameraMachine::can_open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraGate {
    pub host_resumed: bool,
    /// A voice/video recording surface is open.
    pub recording: bool,
    /// Navigation, its header, or a modal window is mid-animation.
    pub navigation_busy: bool,
}

/// Capabilities reported by the camera view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraCaps {
    pub custom_rotations: bool,
    pub editor_open: bool,
}

/// Coarse view of the machine for callers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPhase {
    Closed,
    Opening,
    Open,
    Closing,
    Dragging { open: bool },
}

/// Platform work requested by the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEffect {
    /// Configure the camera for `options` and clear contextual windows.
    Prepare(CameraOptions),
    /// Attach the camera surface beneath the content.
    AttachCamera,
    DetachCamera,
    /// Re-attach the main content above the camera.
    AttachContent,
    DetachContent,
    FocusCamera,
    BlurCamera,
    FocusContent,
    BlurContent,
    /// The factor changed.
    Factor { value: f32, by_drag: bool, growing: bool },
    OrientationLock(bool),
    HideKeyboard,
    CleanAfterHide,
}

/// The camera surface state machine.
#[derive(Debug)]
pub struct CameraMachine {
    open: bool,
    dragging: bool,
    factor: f32,
    animator: Animator,
    options: Option<CameraOptions>,
    /// Camera surface is attached.
    prepared: bool,
    content_detached: bool,
    camera_focused: bool,
    blocked: bool,
    ownership_taken: bool,
    orientation_locked: bool,
    caps: CameraCaps,
    open_duration: Duration,
    fling_duration: Duration,
    drop_duration: Duration,
    drop_threshold: f32,
    effects: Vec<CameraEffect>,
}

impl CameraMachine {
    /// Create a closed machine using the camera timings of `config`.
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            open: false,
            dragging: false,
            factor: 0.0,
            animator: Animator::new(0.0, config.camera_open_duration),
            options: None,
            prepared: false,
            content_detached: false,
            camera_focused: false,
            blocked: false,
            ownership_taken: false,
            orientation_locked: false,
            caps: CameraCaps::default(),
            open_duration: config.camera_open_duration,
            fling_duration: config.camera_fling_duration,
            drop_duration: config.camera_drop_duration,
            drop_threshold: config.camera_drop_threshold,
            effects: Vec::new(),
        }
    }

    // --- Queries ---

    /// Target state: `true` once an open was committed.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[inline]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    #[inline]
    pub fn is_ownership_taken(&self) -> bool {
        self.ownership_taken
    }

    #[inline]
    pub fn is_orientation_locked(&self) -> bool {
        self.orientation_locked
    }

    /// Options of the last committed open.
    #[inline]
    pub fn options(&self) -> Option<CameraOptions> {
        self.options
    }

    /// The camera surface is attached and not lent to another caller.
    #[inline]
    pub fn is_owning_camera(&self) -> bool {
        self.prepared && !self.ownership_taken
    }

    /// Main content was detached by a completed open.
    #[inline]
    pub fn is_content_detached(&self) -> bool {
        self.content_detached
    }

    /// The camera keeps the host from starting other transitions.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.open || self.dragging
    }

    /// Whether the camera asks for fullscreen decor.
    pub fn wants_fullscreen(&self) -> bool {
        (self.factor > 0.0 || self.dragging) && !self.caps.editor_open
    }

    /// Whether the camera asks to keep the screen awake.
    pub fn keeps_awake(&self) -> bool {
        self.factor > 0.0 || self.dragging
    }

    pub fn phase(&self) -> CameraPhase {
        if self.dragging {
            CameraPhase::Dragging { open: self.open }
        } else if self.open {
            if self.factor >= 1.0 && !self.animator.is_animating() {
                CameraPhase::Open
            } else {
                CameraPhase::Opening
            }
        } else if self.factor <= 0.0 && !self.animator.is_animating() {
            CameraPhase::Closed
        } else {
            CameraPhase::Closing
        }
    }

    /// Whether a new camera transition may start.
    pub fn can_open(&self, gate: &CameraGate) -> bool {
        !(self.animator.is_animating()
            || !gate.host_resumed
            || gate.recording
            || self.ownership_taken
            || gate.navigation_busy)
    }

    /// Whether a touch-down may arm a drag toward `open`.
    pub fn can_toggle(&self, open: bool, gate: &CameraGate) -> bool {
        self.open != open && self.can_open(gate)
    }

    /// Take the queued effects.
    pub fn drain_effects(&mut self) -> Vec<CameraEffect> {
        std::mem::take(&mut self.effects)
    }

    // --- Commands ---

    /// Update view capabilities and re-derive the orientation lock.
    pub fn set_caps(&mut self, caps: CameraCaps) {
        if self.caps != caps {
            self.caps = caps;
            self.refresh();
        }
    }

    /// Tap-to-open, after the owner checked the gate, keyboard and permission.
    pub fn open(&mut self, options: CameraOptions) {
        self.set_open(Some(options), true, false);
    }

    /// Programmatic close with the regular animation.
    pub fn close(&mut self) {
        self.set_dragging(false);
        self.set_open(None, false, false);
    }

    /// Close in response to a back press. Ignored while recording or blocked.
    pub fn close_by_back_press(&mut self, recording: bool) -> bool {
        if recording || self.blocked {
            return false;
        }
        self.close();
        true
    }

    /// Jump to closed without waiting for an animation.
    pub fn force_close(&mut self) {
        if !self.open {
            return;
        }
        self.set_dragging(true);
        self.set_factor(0.0, true);
        self.drop_drag(Some(false), false);
    }

    /// Begin a drag toward `open` (the owner already ran [`can_toggle`](Self::can_toggle)
    /// and the permission check).
    ///
    /// Opening in a non-portrait orientation is refused unless the camera
    /// rotates freely.
    pub fn start_drag(&mut self, options: CameraOptions, open: bool, portrait: bool) -> bool {
        if self.open == open {
            return false;
        }
        if open && !portrait && !self.caps.custom_rotations {
            return false;
        }
        self.set_dragging(true);
        self.set_open(Some(options), open, true);
        true
    }

    /// Follow the finger. Ignored unless dragging.
    pub fn set_drag_factor(&mut self, factor: f32) {
        if self.dragging {
            self.set_factor(factor, true);
        }
    }

    /// Release the drag. `open = None` decides by the drop threshold.
    pub fn drop_drag(&mut self, open: Option<bool>, by_fling: bool) {
        if !self.dragging {
            return;
        }
        let open = open.unwrap_or(self.factor >= self.drop_threshold) || self.blocked;
        self.set_dragging(false);
        let options = self.options;
        self.set_open(options, open, true);
        if (open && self.factor == 1.0) || (!open && self.factor == 0.0) {
            self.finish(self.factor);
            return;
        }
        let duration = if by_fling && open {
            self.fling_duration
        } else {
            self.drop_duration
        };
        self.animator.set_duration(duration);
        self.animator.animate_to(if open { 1.0 } else { 0.0 });
    }

    /// Blocking drops a drag in progress and forces it open.
    pub fn set_blocked(&mut self, blocked: bool) {
        if self.blocked != blocked {
            self.blocked = blocked;
            if blocked {
                self.drop_drag(None, false);
            }
        }
    }

    /// Lend the camera surface to another caller.
    pub fn take_ownership(&mut self, options: CameraOptions, gate: &CameraGate) -> bool {
        if self.open || !self.can_open(gate) {
            return false;
        }
        self.effects.push(CameraEffect::Prepare(options));
        self.ownership_taken = true;
        true
    }

    pub fn release_ownership(&mut self) {
        if self.ownership_taken {
            self.ownership_taken = false;
            self.effects.push(CameraEffect::Prepare(CameraOptions::default()));
        }
    }

    /// Step the camera animation.
    pub fn advance(&mut self, dt: Duration) {
        match self.animator.advance(dt) {
            None => {}
            Some(AnimatorEvent::Progress(v)) => self.set_factor(v, false),
            Some(AnimatorEvent::Completed(v)) => {
                self.set_factor(v, false);
                self.finish(v);
            }
        }
    }

    // --- Internals ---

    fn set_open(&mut self, options: Option<CameraOptions>, open: bool, by_drag: bool) {
        if self.open == open {
            return;
        }
        self.open = open;
        if open {
            self.options = options;
        }
        let target = if open { 1.0 } else { 0.0 };
        if !by_drag {
            self.animator.set_duration(self.open_duration);
        }
        if self.animator.is_animating() {
            if by_drag {
                self.animator.cancel();
            } else {
                self.animator.animate_to(target);
            }
        } else if open {
            self.replace_content_with_camera(!by_drag);
        } else {
            self.replace_camera_with_content(!by_drag);
        }
    }

    fn replace_content_with_camera(&mut self, launch: bool) {
        if !self.prepared {
            self.effects
                .push(CameraEffect::Prepare(self.options.unwrap_or_default()));
            self.effects.push(CameraEffect::AttachCamera);
            self.effects.push(CameraEffect::BlurContent);
            self.prepared = true;
            self.refresh();
        }
        if launch {
            self.animator.animate_to(1.0);
        }
    }

    fn replace_camera_with_content(&mut self, launch: bool) {
        if self.content_detached {
            if self.camera_focused {
                self.effects.push(CameraEffect::AttachContent);
                self.effects.push(CameraEffect::BlurCamera);
                self.content_detached = false;
                self.camera_focused = false;
                if launch {
                    self.animator.animate_to(0.0);
                }
            }
        } else if launch {
            self.animator.animate_to(0.0);
        }
    }

    fn set_factor(&mut self, factor: f32, by_drag: bool) {
        let factor = factor.abs().min(1.0);
        if self.factor == factor {
            return;
        }
        let growing = factor > self.factor;
        self.factor = factor;
        if by_drag {
            self.animator.force_value(factor);
        }
        self.effects.push(CameraEffect::Factor {
            value: factor,
            by_drag,
            growing,
        });
        self.refresh();
    }

    fn set_dragging(&mut self, dragging: bool) {
        if self.dragging != dragging {
            self.dragging = dragging;
            self.refresh();
        }
    }

    fn finish(&mut self, factor: f32) {
        if factor == 1.0 && self.open {
            self.effects.push(CameraEffect::DetachContent);
            self.effects.push(CameraEffect::FocusCamera);
            self.effects.push(CameraEffect::HideKeyboard);
            self.content_detached = true;
            self.camera_focused = true;

            #[cfg(feature = "tracing")]
            tracing::debug!("camera completely open");
        } else if factor == 0.0 && !self.open {
            self.effects.push(CameraEffect::CleanAfterHide);
            self.effects.push(CameraEffect::DetachCamera);
            self.effects.push(CameraEffect::FocusContent);
            self.prepared = false;

            #[cfg(feature = "tracing")]
            tracing::debug!("camera completely closed");
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        let f = self.factor;
        let locked = ((f < 1.0 && self.open)
            || (f > 0.0 && f < 1.0)
            || self.dragging
            || (f == 1.0 && !self.caps.custom_rotations))
            && !self.caps.editor_open;
        if locked != self.orientation_locked {
            self.orientation_locked = locked;
            self.effects.push(CameraEffect::OrientationLock(locked));
        }
    }
}
