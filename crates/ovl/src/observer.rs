#![forbid(unsafe_code)]

//! Observer interfaces registered on the [`Orchestrator`](crate::Orchestrator).
//!
//! Observers are shared `Rc` handles and receive `&self`; any state they
//! keep lives behind their own interior mutability. They only ever see ids
//! and values, never the surfaces the orchestrator owns.

use ovl_core::LifecycleEvent;
use ovl_widgets::WindowId;

/// Follows the host lifecycle alongside the built-in surfaces.
pub trait LifecycleListener {
    fn on_lifecycle(&self, event: LifecycleEvent);
}

/// Told whenever the passcode lock starts or stops showing.
///
/// Notified last-registered first.
pub trait PasscodeListener {
    fn on_passcode_showing(&self, showing: bool);
}

/// Dismiss notifications for windows a screen presented.
pub trait WindowObserver {
    /// The window finished its reveal.
    fn on_window_shown(&self, _id: WindowId) {}

    /// The window left the stack and was torn down (or handed back).
    fn on_window_dismissed(&self, id: WindowId);
}

/// Raw ambient-light samples. Registering one speeds up sensor sampling.
pub trait LuxListener {
    fn on_lux(&self, lux: f32);
}
