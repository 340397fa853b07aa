#![forbid(unsafe_code)]

//! Core types for the overlay orchestrator.
//!
//! This crate holds the leaf pieces every other layer depends on:
//!
//! - [`decor`]: fullscreen / keep-awake reason bitmasks and the
//!   [`FlagAggregator`](decor::FlagAggregator) that folds them into the
//!   platform decor state.
//! - [`lifecycle`]: host lifecycle states, events, and orientation.
//! - [`host`]: collaborator traits for everything the orchestrator drives
//!   but does not own (root surface host, content layer, camera view, lock
//!   screen, progress view, light sensor, theme, permissions).
//! - [`error`]: the [`HostError`] returned by collaborator calls.

pub mod decor;
pub mod error;
pub mod host;
pub mod lifecycle;

pub use decor::{DecorFlags, FlagAggregator, FullscreenFlags, KeepAwakeFlags, NavigationBar};
pub use error::HostError;
pub use host::{
    CameraMode, CameraOptions, CameraView, ContentLayer, ControllerId, LightSensor, LockScreen,
    Permission, PermissionGate, ProgressView, SurfaceHost, SurfaceId, ThemeSink,
};
pub use lifecycle::{HostState, LifecycleEvent, Orientation};
