#![forbid(unsafe_code)]

//! The modal window contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ovl_core::{ControllerId, LifecycleEvent};

/// Global counter for unique window IDs.
static WINDOW_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a window owned by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Create a new unique window ID.
    pub(crate) fn next() -> Self {
        Self(WINDOW_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Where a window is in its show/hide cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    /// Reveal animation running.
    Appearing,
    /// Fully shown.
    Shown,
    /// Hide animation running; removed when it completes.
    Disappearing,
    /// Hidden but preserved while the passcode lock is up.
    Suspended,
}

impl WindowPhase {
    /// Whether a window in this phase counts as showing.
    #[inline]
    pub const fn is_showing(self) -> bool {
        matches!(self, Self::Appearing | Self::Shown)
    }
}

/// A surface presented above the main content.
///
/// The stack owns the boxed window; screens that want to dismiss it keep
/// only its [`WindowId`].
///
/// # Invariants
///
/// - `on_show` is called once, before the reveal starts.
/// - `on_shown` is called once, when the reveal completes.
/// - `on_hide` is called once, when the hide animation starts (or when an
///   unanimated hide happens).
/// - `teardown` is the last call a window ever receives.
pub trait ModalSurface {
    /// Screen controller bound to this window, if any.
    fn controller(&self) -> Option<ControllerId> {
        None
    }

    /// Menus and option sheets: at most one may be visible at a time.
    fn is_contextual(&self) -> bool {
        false
    }

    /// Media preview opened from the camera. May interrupt a busy host.
    fn is_from_camera(&self) -> bool {
        false
    }

    fn disallows_screenshots(&self) -> bool {
        false
    }

    /// Reveal/hide animation length; `None` uses the stack default.
    fn reveal_duration(&self) -> Option<Duration> {
        None
    }

    /// Whether a key press should only dismiss this window's soft keyboard.
    fn can_hide_keyboard(&self) -> bool {
        false
    }

    /// Dismiss the soft keyboard. Returns `true` if it was visible.
    fn hide_keyboard(&mut self) -> bool {
        false
    }

    /// Offer a back press. Returns `true` if consumed internally.
    fn on_back_pressed(&mut self, _by_header: bool) -> bool {
        false
    }

    fn on_show(&mut self) {}

    fn on_shown(&mut self) {}

    fn on_hide(&mut self) {}

    /// Reveal progress, `1.0` when fully shown.
    fn set_reveal_factor(&mut self, _factor: f32) {}

    /// Hide without losing state (passcode lock).
    fn hide_temporarily(&mut self) {}

    /// Undo [`hide_temporarily`](Self::hide_temporarily).
    fn restore(&mut self) {}

    fn on_lifecycle(&mut self, _event: LifecycleEvent) {}

    /// Release everything. The window is dropped right after.
    fn teardown(&mut self) {}
}
