#![forbid(unsafe_code)]

//! Window stack for modal surfaces shown above the main content.
//!
//! The `WindowStack` owns every presented [`ModalSurface`] in LIFO order.
//! Windows may be detached into a [`ForgottenTable`] (floating video and
//! similar surfaces) and later reinserted at their original position.
//!
//! # Invariants
//!
//! - Order is insertion order: the bottom window is the oldest.
//! - Dismissal proceeds from the top: `dismiss_top` only ever touches the
//!   highest window that is showing.
//! - While the host is busy, only camera-originated or contextual windows
//!   (incoming, or already at the bottom) may be shown.
//! - Showing a window first hides every contextual window.
//! - `forget` followed by `remember` restores the exact previous order.
//! - Forgotten windows keep animating and receiving lifecycle events but are
//!   invisible to `dismiss_top`, `suspend_all` and `has_animating_window`.
//! - Between `suspend_all` and `restore_all`, newly shown and remembered
//!   windows join the stack suspended.
//!
//! # Failure Modes
//!
//! - A rejected window is torn down immediately and `show` returns `None`.
//! - `dismiss_top()` on an empty stack returns `false` and changes nothing.
//! - Operations on an unknown [`WindowId`] return `false` / `None`.
//!
//! # Example
//!
//! ```ignore
//! let mut stack = WindowStack::new(Duration::from_millis(250));
//!
//! let menu = stack.show(Box::new(menu_window), false);
//! stack.advance(Duration::from_millis(250)); // StackEvent::Shown
//!
//! stack.dismiss_top(false, true, false);
//! stack.advance(Duration::from_millis(250)); // StackEvent::Dismissed
//! ```

use std::time::Duration;

use ovl_core::{ControllerId, LifecycleEvent};
use ovl_runtime::{Animator, AnimatorEvent};

use super::forgotten::ForgottenTable;
use super::window::{ModalSurface, WindowId, WindowPhase};

/// Notification produced by the stack, drained by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    /// The reveal animation completed.
    Shown(WindowId),
    /// The window left the stack (hidden, removed or closed).
    Dismissed(WindowId),
}

/// A window together with its presentation state.
struct WindowEntry {
    id: WindowId,
    window: Box<dyn ModalSurface>,
    phase: WindowPhase,
    /// Phase to return to when un-suspended.
    resume_phase: WindowPhase,
    reveal: Animator,
}

impl std::fmt::Debug for WindowEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowEntry")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("reveal", &self.reveal.value())
            .finish()
    }
}

fn may_interrupt(window: &dyn ModalSurface) -> bool {
    window.is_from_camera() || window.is_contextual()
}

/// Ordered stack of modal windows plus the forgotten side table.
#[derive(Debug)]
pub struct WindowStack {
    /// Live windows, bottom to top.
    live: Vec<WindowEntry>,
    forgotten: ForgottenTable<WindowEntry>,
    default_reveal: Duration,
    events: Vec<StackEvent>,
    /// Set by `suspend_all`, cleared by `restore_all`.
    suspended: bool,
}

impl WindowStack {
    /// Create an empty stack. `default_reveal` applies to windows without
    /// their own reveal duration.
    pub fn new(default_reveal: Duration) -> Self {
        Self {
            live: Vec::new(),
            forgotten: ForgottenTable::new(),
            default_reveal,
            events: Vec::new(),
            suspended: false,
        }
    }

    // --- Presentation ---

    /// Present `window`.
    ///
    /// `host_busy` reports busyness outside the stack (camera transition,
    /// navigation animation, progress overlay). A window still mid-reveal
    /// also makes the host busy.
    pub fn show(
        &mut self,
        mut window: Box<dyn ModalSurface>,
        host_busy: bool,
    ) -> Option<WindowId> {
        if host_busy || self.has_animating_window() {
            let bottom_may_interrupt = self
                .live
                .first()
                .is_some_and(|e| may_interrupt(&*e.window));
            if !may_interrupt(&*window) && !bottom_may_interrupt {
                #[cfg(feature = "tracing")]
                tracing::debug!(depth = self.live.len(), "window rejected: host is busy");
                window.teardown();
                return None;
            }
        }

        self.hide_contextual();

        let duration = window.reveal_duration().unwrap_or(self.default_reveal);
        let mut entry = WindowEntry {
            id: WindowId::next(),
            window,
            phase: WindowPhase::Appearing,
            resume_phase: WindowPhase::Appearing,
            reveal: Animator::new(0.0, duration),
        };
        entry.window.on_show();
        entry.reveal.animate_to(1.0);
        if self.suspended {
            entry.phase = WindowPhase::Suspended;
            entry.window.hide_temporarily();
        }
        let id = entry.id;
        self.live.push(entry);

        #[cfg(feature = "tracing")]
        tracing::debug!(window = id.id(), depth = self.live.len(), "window shown");
        Some(id)
    }

    /// Hide a live or forgotten window.
    ///
    /// An animated hide runs the reveal backwards, then removes and tears the
    /// window down. Returns `false` if the window is unknown or already
    /// hiding.
    pub fn hide(&mut self, id: WindowId, animated: bool) -> bool {
        let finish_now = {
            let Some(entry) = self.entry_mut(id) else {
                return false;
            };
            if entry.phase == WindowPhase::Disappearing && animated {
                return false;
            }
            if entry.phase != WindowPhase::Disappearing {
                entry.window.on_hide();
            }
            if animated && entry.phase.is_showing() {
                entry.phase = WindowPhase::Disappearing;
                entry.reveal.animate_to(0.0);
                !entry.reveal.is_animating()
            } else {
                true
            }
        };
        if finish_now {
            self.finish(id);
        }
        true
    }

    /// Hide every showing contextual window. Returns how many were hidden.
    pub fn hide_contextual(&mut self) -> usize {
        let ids: Vec<WindowId> = self
            .live
            .iter()
            .rev()
            .filter(|e| e.phase.is_showing() && e.window.is_contextual())
            .map(|e| e.id)
            .collect();
        for id in &ids {
            self.hide(*id, true);
        }
        ids.len()
    }

    /// Dismiss the highest showing window.
    ///
    /// The window is asked, in order, to hide its keyboard (key presses), to
    /// consume the back action (back presses), or else it is hidden.
    pub fn dismiss_top(&mut self, by_key: bool, by_back: bool, by_header: bool) -> bool {
        let Some(pos) = self.live.iter().rposition(|e| e.phase.is_showing()) else {
            return false;
        };
        let entry = &mut self.live[pos];
        if by_key && entry.window.can_hide_keyboard() {
            return entry.window.hide_keyboard();
        }
        if by_back && entry.window.on_back_pressed(by_header) {
            return true;
        }
        let id = entry.id;
        self.hide(id, true);
        true
    }

    /// Take a window out of the stack (or the forgotten table) by identity.
    ///
    /// The window is handed back without being torn down.
    pub fn remove(&mut self, id: WindowId) -> Option<Box<dyn ModalSurface>> {
        let entry = self.take_entry(id)?;
        self.events.push(StackEvent::Dismissed(id));
        Some(entry.window)
    }

    // --- Forgotten windows ---

    /// Detach a live window into the side table, keyed by its position.
    pub fn forget(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.live.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.live.remove(pos);
        self.forgotten.insert(pos, entry);
        true
    }

    /// Reinsert a forgotten window at `min(key, len)`.
    pub fn remember(&mut self, id: WindowId) -> bool {
        let Some((key, mut entry)) = self.forgotten.take(|e| e.id == id) else {
            return false;
        };
        if self.suspended && entry.phase.is_showing() {
            entry.resume_phase = entry.phase;
            entry.phase = WindowPhase::Suspended;
            entry.window.hide_temporarily();
        }
        let at = key.min(self.live.len());
        self.live.insert(at, entry);
        true
    }

    /// Drop a forgotten window from the side table for good.
    pub fn forget_completely(&mut self, id: WindowId) -> Option<Box<dyn ModalSurface>> {
        self.forgotten
            .take(|e| e.id == id)
            .map(|(_, entry)| entry.window)
    }

    /// Hide every forgotten window matching `pred`. Returns how many.
    pub fn close_forgotten(&mut self, mut pred: impl FnMut(&dyn ModalSurface) -> bool) -> usize {
        let ids: Vec<WindowId> = self
            .forgotten
            .values()
            .filter(|e| e.phase != WindowPhase::Disappearing && pred(&*e.window))
            .map(|e| e.id)
            .collect();
        for id in &ids {
            self.hide(*id, true);
        }
        ids.len()
    }

    #[inline]
    pub fn is_forgotten(&self, id: WindowId) -> bool {
        self.forgotten.key_of(|e| e.id == id).is_some()
    }

    #[inline]
    pub fn forgotten_len(&self) -> usize {
        self.forgotten.len()
    }

    // --- Passcode freeze ---

    /// Hide every showing live window without losing it. Returns how many.
    pub fn suspend_all(&mut self) -> usize {
        self.suspended = true;
        let mut count = 0;
        for entry in self.live.iter_mut().rev() {
            if entry.phase.is_showing() {
                entry.resume_phase = entry.phase;
                entry.phase = WindowPhase::Suspended;
                entry.window.hide_temporarily();
                count += 1;
            }
        }
        count
    }

    /// Undo [`suspend_all`](Self::suspend_all).
    pub fn restore_all(&mut self) -> usize {
        self.suspended = false;
        let mut count = 0;
        for entry in &mut self.live {
            if entry.phase == WindowPhase::Suspended {
                entry.phase = entry.resume_phase;
                entry.window.restore();
                count += 1;
            }
        }
        count
    }

    // --- Time and lifecycle ---

    /// Step every reveal/hide animation.
    pub fn advance(&mut self, dt: Duration) {
        let mut hidden = Vec::new();
        for entry in self.live.iter_mut().chain(self.forgotten.values_mut()) {
            if entry.phase == WindowPhase::Suspended {
                continue;
            }
            match entry.reveal.advance(dt) {
                None => {}
                Some(AnimatorEvent::Progress(v)) => entry.window.set_reveal_factor(v),
                Some(AnimatorEvent::Completed(v)) => {
                    entry.window.set_reveal_factor(v);
                    match entry.phase {
                        WindowPhase::Appearing => {
                            entry.phase = WindowPhase::Shown;
                            entry.window.on_shown();
                            self.events.push(StackEvent::Shown(entry.id));
                        }
                        WindowPhase::Disappearing => hidden.push(entry.id),
                        WindowPhase::Shown | WindowPhase::Suspended => {}
                    }
                }
            }
        }
        for id in hidden {
            self.finish(id);
        }
    }

    /// Forward a host lifecycle event to every live and forgotten window.
    ///
    /// Destruction reaches live windows top first.
    pub fn dispatch_lifecycle(&mut self, event: LifecycleEvent) {
        if event == LifecycleEvent::Destroyed {
            for entry in self.live.iter_mut().rev() {
                entry.window.on_lifecycle(event);
            }
        } else {
            for entry in &mut self.live {
                entry.window.on_lifecycle(event);
            }
        }
        for entry in self.forgotten.values_mut() {
            entry.window.on_lifecycle(event);
        }
    }

    /// Tear down every window, live (top first) and forgotten.
    pub fn destroy_all(&mut self) {
        while let Some(mut entry) = self.live.pop() {
            entry.window.teardown();
        }
        for mut entry in self.forgotten.drain() {
            entry.window.teardown();
        }
    }

    /// Take the pending notifications.
    pub fn drain_events(&mut self) -> Vec<StackEvent> {
        std::mem::take(&mut self.events)
    }

    // --- State Queries ---

    /// Number of live windows.
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether live windows are frozen by [`suspend_all`](Self::suspend_all).
    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Whether `id` is in the live stack.
    pub fn contains(&self, id: WindowId) -> bool {
        self.live.iter().any(|e| e.id == id)
    }

    /// Whether any live window has not finished its reveal.
    pub fn has_animating_window(&self) -> bool {
        self.live.iter().any(|e| e.phase == WindowPhase::Appearing)
    }

    /// Highest live window, showing or not.
    pub fn top_id(&self) -> Option<WindowId> {
        self.live.last().map(|e| e.id)
    }

    /// Most recently shown window that is still showing.
    pub fn current_top(&self) -> Option<WindowId> {
        self.live.iter().rev().find(|e| e.phase.is_showing()).map(|e| e.id)
    }

    /// Controller bound to [`current_top`](Self::current_top).
    pub fn current_top_controller(&self) -> Option<ControllerId> {
        self.live
            .iter()
            .rev()
            .find(|e| e.phase.is_showing())
            .and_then(|e| e.window.controller())
    }

    /// Phase of a live or forgotten window.
    pub fn phase(&self, id: WindowId) -> Option<WindowPhase> {
        self.entry(id).map(|e| e.phase)
    }

    /// Live window ids, bottom to top.
    pub fn ids(&self) -> Vec<WindowId> {
        self.live.iter().map(|e| e.id).collect()
    }

    /// Borrow a live or forgotten window.
    pub fn window(&self, id: WindowId) -> Option<&(dyn ModalSurface + 'static)> {
        self.entry(id).map(|e| &*e.window)
    }

    /// Live windows, bottom to top.
    pub fn windows(&self) -> impl Iterator<Item = (WindowId, &(dyn ModalSurface + 'static))> {
        self.live.iter().map(|e| (e.id, &*e.window))
    }

    /// OR of every live and forgotten window's screenshot flag.
    pub fn disallows_screenshots(&self) -> bool {
        self.live
            .iter()
            .chain(self.forgotten.values())
            .any(|e| e.window.disallows_screenshots())
    }

    // --- Internals ---

    fn entry(&self, id: WindowId) -> Option<&WindowEntry> {
        if let Some(entry) = self.live.iter().find(|e| e.id == id) {
            return Some(entry);
        }
        let key = self.forgotten.key_of(|e| e.id == id)?;
        self.forgotten.get(key)
    }

    fn entry_mut(&mut self, id: WindowId) -> Option<&mut WindowEntry> {
        if let Some(pos) = self.live.iter().position(|e| e.id == id) {
            return self.live.get_mut(pos);
        }
        let key = self.forgotten.key_of(|e| e.id == id)?;
        self.forgotten.get_mut(key)
    }

    fn take_entry(&mut self, id: WindowId) -> Option<WindowEntry> {
        if let Some(pos) = self.live.iter().position(|e| e.id == id) {
            return Some(self.live.remove(pos));
        }
        self.forgotten.take(|e| e.id == id).map(|(_, entry)| entry)
    }

    fn finish(&mut self, id: WindowId) {
        if let Some(mut entry) = self.take_entry(id) {
            entry.window.teardown();
            self.events.push(StackEvent::Dismissed(id));
        }
    }
}
