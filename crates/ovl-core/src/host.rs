#![forbid(unsafe_code)]

//! Collaborator traits.
//!
//! The orchestrator owns ordering and state; everything that touches the
//! platform is reached through these traits. Implementations report
//! failures as [`HostError`] and the orchestrator treats a failed call as a
//! no-op after logging it.
//!
//! Methods with a sensible neutral answer have default implementations so
//! test doubles only spell out what they care about.

use std::time::Duration;

use crate::decor::DecorFlags;
use crate::error::HostError;
use crate::lifecycle::{LifecycleEvent, Orientation};

/// Opaque identifier of a visual surface attached to the host root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Wrap a raw platform handle.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque identifier of a screen controller (owner of a surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u64);

impl ControllerId {
    /// Wrap a raw controller handle.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Root view of the host window.
///
/// Index `0` is the bottom of the root; `None` appends on top.
pub trait SurfaceHost {
    /// Attach `surface` at `index` (or on top).
    fn attach(&mut self, surface: SurfaceId, index: Option<usize>) -> Result<(), HostError>;

    /// Detach `surface` from the root.
    fn detach(&mut self, surface: SurfaceId) -> Result<(), HostError>;

    /// Position of `surface` in the root, if attached.
    fn index_of(&self, surface: SurfaceId) -> Option<usize>;

    /// Apply the aggregated decor state in a single platform call.
    fn apply_decor(&mut self, decor: &DecorFlags) -> Result<(), HostError>;

    /// Lock (or release) the current screen orientation.
    fn set_orientation_locked(&mut self, locked: bool) -> Result<(), HostError>;

    /// Current screen orientation.
    fn orientation(&self) -> Orientation {
        Orientation::Portrait
    }

    /// Current status-bar color (ARGB, `0` when unknown).
    fn status_bar_color(&self) -> u32 {
        0
    }

    /// Status-bar color used when no screen tints it.
    fn default_status_bar_color(&self) -> u32 {
        0
    }

    /// Set the status-bar color.
    fn set_status_bar_color(&mut self, _color: u32) -> Result<(), HostError> {
        Ok(())
    }
}

/// The main navigation area and its current foreground screen.
pub trait ContentLayer {
    /// Root surface of the main content.
    fn surface(&self) -> SurfaceId;

    /// Navigation or its header is mid-animation.
    fn is_busy(&self) -> bool {
        false
    }

    /// A voice/video recording surface is open.
    fn is_recording(&self) -> bool {
        false
    }

    /// The foreground screen tolerates a theme switch right now.
    fn allows_theme_change(&self) -> bool {
        true
    }

    /// The foreground screen shows content that must not be captured.
    fn disallows_screenshots(&self) -> bool {
        false
    }

    /// The soft keyboard is on screen.
    fn is_keyboard_visible(&self) -> bool {
        false
    }

    /// Dismiss the soft keyboard.
    fn hide_keyboard(&mut self) {}

    /// The content regained input focus.
    fn on_focus(&mut self);

    /// The content lost input focus.
    fn on_blur(&mut self);

    /// Offer a back press to the navigation stack. Returns `true` if consumed.
    fn on_back_pressed(&mut self, _from_top: bool) -> bool {
        false
    }

    /// Host lifecycle notification.
    fn on_lifecycle(&mut self, _event: LifecycleEvent) {}
}

/// Camera capture mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Main,
    QrScan,
}

/// Options carried by a camera open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraOptions {
    pub mode: CameraMode,
    /// Open even if microphone access is not granted.
    pub optional_microphone: bool,
}

impl CameraOptions {
    /// Options for a QR scanner.
    pub fn qr_scan() -> Self {
        Self {
            mode: CameraMode::QrScan,
            optional_microphone: true,
        }
    }
}

/// The exclusive full-screen camera surface.
pub trait CameraView {
    /// Root surface of the camera.
    fn surface(&self) -> SurfaceId;

    /// The camera UI rotates freely instead of needing a fixed orientation.
    fn supports_custom_rotations(&self) -> bool {
        false
    }

    /// A capture is in progress.
    fn is_recording(&self) -> bool {
        false
    }

    /// A media editor is open on top of the camera.
    fn has_open_editor(&self) -> bool {
        false
    }

    /// Configure the camera before it becomes visible.
    fn prepare(&mut self, _options: &CameraOptions) {}

    /// Visual openness changed.
    fn set_appear_factor(&mut self, _factor: f32, _by_drag: bool, _growing: bool) {}

    fn on_focus(&mut self);

    fn on_blur(&mut self);

    /// Release resources after the surface was fully hidden.
    fn on_clean_after_hide(&mut self) {}

    /// Host lifecycle notification.
    fn on_lifecycle(&mut self, _event: LifecycleEvent) {}
}

/// The passcode lock screen.
pub trait LockScreen {
    /// Root surface of the lock screen.
    fn surface(&self) -> SurfaceId;

    /// Reset input state before being shown.
    fn prepare(&mut self) {}

    fn on_focus(&mut self) {}

    /// Opacity of the lock surface while fading out.
    fn set_alpha(&mut self, _alpha: f32) {}

    /// Passcode settings forbid screenshots.
    fn disallows_screenshots(&self) -> bool {
        false
    }

    /// Host lifecycle notification.
    fn on_lifecycle(&mut self, _event: LifecycleEvent) {}

    /// Release everything after the fade-out finished.
    fn teardown(&mut self) {}
}

/// The blocking progress overlay.
pub trait ProgressView {
    /// Root surface of the overlay.
    fn surface(&self) -> SurfaceId;

    fn set_message(&mut self, _message: &str) {}

    /// Visibility factor: drives scale and opacity.
    fn set_factor(&mut self, _factor: f32) {}

    /// The user cancelled the operation behind the overlay.
    fn on_close(&mut self) {}
}

/// Ambient light sensor service. Samples are pushed to the orchestrator.
pub trait LightSensor {
    /// Whether the device has a light sensor at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Start delivering samples at most `latency` apart.
    fn register(&mut self, latency: Duration) -> Result<(), HostError>;

    /// Stop delivering samples.
    fn unregister(&mut self) -> Result<(), HostError>;
}

/// Receiver of day/night decisions.
pub trait ThemeSink {
    /// Whether the active theme is dark.
    fn is_dark(&self) -> bool;

    /// Switch the theme to night (or day).
    fn set_in_night_mode(&mut self, night: bool);
}

/// Result of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    /// A system prompt was shown; the answer arrives later.
    Requested,
    Denied,
}

/// Permission checks for operations that need them.
pub trait PermissionGate {
    /// Check (or request) camera access.
    fn camera_access(&mut self, optional_microphone: bool) -> Result<Permission, HostError>;
}
