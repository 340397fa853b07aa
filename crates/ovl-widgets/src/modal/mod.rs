#![forbid(unsafe_code)]

//! Modal windows: the [`ModalSurface`] contract, the LIFO [`WindowStack`],
//! and the [`ForgottenTable`] for windows detached from it.

mod forgotten;
mod stack;
mod window;

pub use forgotten::ForgottenTable;
pub use stack::{StackEvent, WindowStack};
pub use window::{ModalSurface, WindowId, WindowPhase};
