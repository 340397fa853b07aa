#![forbid(unsafe_code)]

//! Fullscreen, keep-awake, and screenshot decor aggregation.
//!
//! Independent parts of the host each own one or more boolean "reasons".
//! The [`FlagAggregator`] folds them into a single [`DecorFlags`] value that
//! is applied to the platform in one call.
//!
//! # Invariants
//!
//! 1. `is_fullscreen_active() == flags != 0 && !PASSCODE_ACTIVE && !NO_FULLSCREEN_SURFACES_REGISTERED`.
//! 2. System bars are hidden only when fullscreen is active *and*
//!    `HIDE_SYSTEM_BARS_REQUESTED` is set.
//! 3. Recomputation is pure: the same reasons always yield the same decor.
//! 4. [`FlagAggregator::pending`] returns a value only when it differs from the
//!    last successfully applied decor, so no intermediate state is rendered.

use ahash::AHashSet;

use crate::host::ControllerId;

bitflags::bitflags! {
    /// Reasons contributing to the fullscreen decision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FullscreenFlags: u8 {
        /// The camera surface is visible or being dragged.
        const CAMERA_OPEN = 1 << 0;
        /// The passcode lock is up. Forces fullscreen off.
        const PASSCODE_ACTIVE = 1 << 1;
        /// Some surface insists on regular decor. Forces fullscreen off.
        const NO_FULLSCREEN_SURFACES_REGISTERED = 1 << 2;
        /// Some surface asked for fullscreen.
        const FULLSCREEN_SURFACES_REGISTERED = 1 << 3;
        /// Some surface asked to hide system bars as well.
        const HIDE_SYSTEM_BARS_REQUESTED = 1 << 4;
    }
}

bitflags::bitflags! {
    /// Reasons to keep the screen awake.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeepAwakeFlags: u8 {
        const PLAYING_ROUND_VIDEO = 1 << 0;
        const PLAYING_REGULAR_VIDEO = 1 << 1;
        const RECORDING = 1 << 2;
        const CAMERA_OPEN = 1 << 3;
        const PLAYING_FULLSCREEN_WEB_VIDEO = 1 << 4;
    }
}

impl FullscreenFlags {
    /// Derived fullscreen decision.
    #[inline]
    pub fn is_fullscreen_active(self) -> bool {
        !self.is_empty()
            && !self.contains(Self::PASSCODE_ACTIVE)
            && !self.contains(Self::NO_FULLSCREEN_SURFACES_REGISTERED)
    }

    /// Derived system-bar decision.
    #[inline]
    pub fn hides_system_bars(self) -> bool {
        self.is_fullscreen_active() && self.contains(Self::HIDE_SYSTEM_BARS_REQUESTED)
    }
}

/// Navigation-bar treatment derived from the other decor bits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NavigationBar {
    /// Follow the current theme.
    #[default]
    Themed,
    /// System bars are hidden; use the immersive color.
    Immersive,
    /// The lock surface covers the screen with the given opacity.
    Passcode { alpha: f32 },
}

/// Platform decor state applied in one call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecorFlags {
    pub fullscreen: bool,
    pub hide_system_bars: bool,
    pub keep_awake: bool,
    /// Screenshots and screen recording are blocked.
    pub secure: bool,
    pub navigation_bar: NavigationBar,
}

/// Folds every decor reason into [`DecorFlags`].
#[derive(Debug, Default)]
pub struct FlagAggregator {
    fullscreen: FullscreenFlags,
    keep_awake: KeepAwakeFlags,
    secure: bool,
    passcode_alpha: f32,
    fullscreen_surfaces: AHashSet<ControllerId>,
    no_fullscreen_surfaces: AHashSet<ControllerId>,
    hide_bars_surfaces: AHashSet<ControllerId>,
    applied: Option<DecorFlags>,
}

impl FlagAggregator {
    /// Create an aggregator with every reason cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fullscreen reasons.
    #[inline]
    pub fn fullscreen_flags(&self) -> FullscreenFlags {
        self.fullscreen
    }

    /// Current keep-awake reasons.
    #[inline]
    pub fn keep_awake_flags(&self) -> KeepAwakeFlags {
        self.keep_awake
    }

    /// Set or clear a fullscreen reason. Returns `true` if the mask changed.
    pub fn set_fullscreen_flag(&mut self, flag: FullscreenFlags, enabled: bool) -> bool {
        let before = self.fullscreen;
        self.fullscreen.set(flag, enabled);
        before != self.fullscreen
    }

    /// Set or clear a keep-awake reason. Returns `true` if the mask changed.
    pub fn set_keep_awake_flag(&mut self, flag: KeepAwakeFlags, enabled: bool) -> bool {
        let before = self.keep_awake;
        self.keep_awake.set(flag, enabled);
        before != self.keep_awake
    }

    /// Register a screen that needs fullscreen (or needs it off).
    pub fn add_fullscreen_surface(&mut self, controller: ControllerId, need_fullscreen: bool) {
        let (set, flag) = self.fullscreen_set(need_fullscreen);
        if set.insert(controller) {
            self.set_fullscreen_flag(flag, true);
        }
    }

    /// Unregister a screen added by [`add_fullscreen_surface`](Self::add_fullscreen_surface).
    pub fn remove_fullscreen_surface(&mut self, controller: ControllerId, need_fullscreen: bool) {
        let (set, flag) = self.fullscreen_set(need_fullscreen);
        if set.remove(&controller) {
            let still_registered = !set.is_empty();
            self.set_fullscreen_flag(flag, still_registered);
        }
    }

    /// Register a screen that wants system bars hidden.
    pub fn add_hide_system_bars_surface(&mut self, controller: ControllerId) {
        if self.hide_bars_surfaces.insert(controller) {
            self.set_fullscreen_flag(FullscreenFlags::HIDE_SYSTEM_BARS_REQUESTED, true);
        }
    }

    /// Unregister a screen added by [`add_hide_system_bars_surface`](Self::add_hide_system_bars_surface).
    pub fn remove_hide_system_bars_surface(&mut self, controller: ControllerId) {
        if self.hide_bars_surfaces.remove(&controller) {
            let still_registered = !self.hide_bars_surfaces.is_empty();
            self.set_fullscreen_flag(FullscreenFlags::HIDE_SYSTEM_BARS_REQUESTED, still_registered);
        }
    }

    /// Result of the screenshot OR-reduction.
    pub fn set_screenshots_disallowed(&mut self, disallowed: bool) {
        self.secure = disallowed;
    }

    /// Opacity of the lock surface (`0.0` when hidden).
    pub fn set_passcode_alpha(&mut self, alpha: f32) {
        self.passcode_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Derived fullscreen decision.
    #[inline]
    pub fn is_fullscreen_active(&self) -> bool {
        self.fullscreen.is_fullscreen_active()
    }

    /// Compute the decor for the current reasons.
    pub fn compute(&self) -> DecorFlags {
        let fullscreen = self.fullscreen.is_fullscreen_active();
        let hide_system_bars = self.fullscreen.hides_system_bars();
        let navigation_bar = if self.passcode_alpha > 0.0 {
            NavigationBar::Passcode {
                alpha: self.passcode_alpha,
            }
        } else if hide_system_bars {
            NavigationBar::Immersive
        } else {
            NavigationBar::Themed
        };
        DecorFlags {
            fullscreen,
            hide_system_bars,
            keep_awake: !self.keep_awake.is_empty(),
            secure: self.secure,
            navigation_bar,
        }
    }

    /// Decor that still has to reach the platform, if any.
    pub fn pending(&self) -> Option<DecorFlags> {
        let decor = self.compute();
        if self.applied == Some(decor) {
            None
        } else {
            Some(decor)
        }
    }

    /// Record that `decor` was applied successfully.
    pub fn mark_applied(&mut self, decor: DecorFlags) {
        #[cfg(feature = "tracing")]
        tracing::trace!(?decor, "decor applied");
        self.applied = Some(decor);
    }

    /// Last successfully applied decor.
    #[inline]
    pub fn applied(&self) -> Option<DecorFlags> {
        self.applied
    }

    fn fullscreen_set(
        &mut self,
        need_fullscreen: bool,
    ) -> (&mut AHashSet<ControllerId>, FullscreenFlags) {
        if need_fullscreen {
            (
                &mut self.fullscreen_surfaces,
                FullscreenFlags::FULLSCREEN_SURFACES_REGISTERED,
            )
        } else {
            (
                &mut self.no_fullscreen_surfaces,
                FullscreenFlags::NO_FULLSCREEN_SURFACES_REGISTERED,
            )
        }
    }
}
