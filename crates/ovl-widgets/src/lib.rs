#![forbid(unsafe_code)]

//! Surface state machines for the overlay orchestrator.
//!
//! Each machine here owns its state and animator but never calls the
//! platform. The modal stack drives boxed [`ModalSurface`]s directly; the
//! camera, passcode and progress machines queue effects for the owner to
//! apply.

pub mod camera;
pub mod modal;
pub mod passcode;
pub mod progress;

pub use camera::{CameraCaps, CameraEffect, CameraGate, CameraMachine, CameraPhase};
pub use modal::{ForgottenTable, ModalSurface, StackEvent, WindowId, WindowPhase, WindowStack};
pub use passcode::{PasscodeEffect, PasscodeGate};
pub use progress::{ProgressEffect, ProgressOverlay};
