#![forbid(unsafe_code)]

//! Overlay and modal-surface orchestrator.
//!
//! One [`Orchestrator`] per host window owns the modal window stack, the
//! exclusive camera surface, the passcode lock, the progress overlay and the
//! ambient-light night-mode switch, and folds all of their demands into a
//! single set of platform [`DecorFlags`].
//!
//! The host supplies its collaborators as a [`Platform`] and drives time
//! with [`Orchestrator::advance`] (virtual) or [`Orchestrator::pump`]
//! (wall clock).
//!
//! # Crate layout
//!
//! - [`ovl_core`]: decor flags, lifecycle events, collaborator traits.
//! - [`ovl_runtime`]: scheduler, animator, listeners, night-mode debouncer,
//!   configuration.
//! - [`ovl_widgets`]: the surface state machines.
//!
//! Most hosts only need [`prelude`].

pub mod observer;
pub mod orchestrator;
pub mod platform;

pub use observer::{LifecycleListener, LuxListener, PasscodeListener, WindowObserver};
pub use orchestrator::Orchestrator;
pub use platform::Platform;

pub use ovl_core::{
    CameraMode, CameraOptions, CameraView, ContentLayer, ControllerId, DecorFlags,
    FullscreenFlags, HostError, HostState, KeepAwakeFlags, LifecycleEvent, LightSensor,
    LockScreen, NavigationBar, Orientation, Permission, PermissionGate, ProgressView, SurfaceHost,
    SurfaceId, ThemeSink,
};
pub use ovl_runtime::{ConfigError, ListenerId, OverlayConfig};
pub use ovl_widgets::{CameraPhase, ModalSurface, WindowId, WindowPhase};

pub use ovl_core as core;
pub use ovl_runtime as runtime;
pub use ovl_widgets as widgets;

/// Everything a host needs to wire up an orchestrator.
pub mod prelude {
    pub use crate::{
        CameraOptions, CameraView, ContentLayer, ControllerId, DecorFlags, FullscreenFlags,
        HostError, KeepAwakeFlags, LifecycleEvent, LifecycleListener, LightSensor, LockScreen,
        LuxListener, ModalSurface, Orchestrator, Orientation, OverlayConfig, PasscodeListener,
        Permission, PermissionGate, Platform, ProgressView, SurfaceHost, SurfaceId, ThemeSink,
        WindowId, WindowObserver,
    };
}
