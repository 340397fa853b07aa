#![forbid(unsafe_code)]

//! Runtime primitives for the overlay orchestrator.
//!
//! Everything here runs on one cooperative thread and on virtual time:
//!
//! - [`scheduler`]: fixed-delay [`CancellableTask`]s and the one-per-kind
//!   [`TaskSlot`].
//! - [`animator`]: the single [`Animator`] abstraction behind every
//!   transition.
//! - [`listeners`]: observer registries iterated from snapshots.
//! - [`night_mode`]: the ambient-light [`NightModeDebouncer`].
//! - [`config`]: [`OverlayConfig`] timings and thresholds.
//! - [`clock`]: [`FrameClock`] for hosts that drive frames from a real clock.

pub mod animator;
pub mod clock;
pub mod config;
pub mod listeners;
pub mod night_mode;
pub mod scheduler;

pub use animator::{Animator, AnimatorEvent, Easing};
pub use clock::FrameClock;
pub use config::{ConfigError, OverlayConfig};
pub use listeners::{ListenerId, Listeners};
pub use night_mode::NightModeDebouncer;
pub use scheduler::{CancellableTask, Scheduler, TaskSlot};
