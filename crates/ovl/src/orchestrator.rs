#![forbid(unsafe_code)]

//! The overlay orchestrator.
//!
//! [`Orchestrator`] owns every surface state machine, the cooperative
//! scheduler and the listener registries, and is the only place that calls
//! the platform. Each public operation follows the same shape:
//!
//! 1. Ask the relevant machine to decide.
//! 2. Apply the effects it queued, in order, to the [`Platform`].
//! 3. Settle: deliver window notifications, fold every reason into the
//!    [`FlagAggregator`] and push the decor if it changed.
//!
//! Platform failures are logged with `tracing::warn!` and otherwise ignored.
//!
//! # Invariants
//!
//! 1. Decor reaches the platform only from `settle`, once per operation.
//! 2. At most one deferred task per kind is pending.
//! 3. The light sensor is registered only while the host is resumed and
//!    automatic night mode is on.
//!
//! # Example
//!
//! ```ignore
//! let mut overlays = Orchestrator::new(platform, OverlayConfig::default())?;
//! overlays.dispatch_lifecycle(LifecycleEvent::Resumed);
//! let id = overlays.show_window(Box::new(menu));
//! overlays.advance(Duration::from_millis(16));
//! ```

use std::rc::Rc;
use std::time::Duration;

use ovl_core::{
    CameraOptions, ControllerId, DecorFlags, FlagAggregator, FullscreenFlags, HostError,
    HostState, KeepAwakeFlags, LifecycleEvent, Orientation, Permission, SurfaceHost, SurfaceId,
};
use ovl_runtime::{
    ConfigError, FrameClock, ListenerId, Listeners, NightModeDebouncer, OverlayConfig, Scheduler,
    TaskSlot,
};
use ovl_widgets::{
    CameraCaps, CameraEffect, CameraGate, CameraMachine, CameraPhase, ModalSurface,
    PasscodeEffect, PasscodeGate, ProgressEffect, ProgressOverlay, StackEvent, WindowId,
    WindowStack,
};
use web_time::Instant;

use crate::observer::{LifecycleListener, LuxListener, PasscodeListener, WindowObserver};
use crate::platform::Platform;

/// Work queued on the cooperative scheduler.
#[derive(Debug, Clone, PartialEq)]
enum Deferred {
    RestoreNavigationFocus,
    OpenCamera(CameraOptions),
    ShowProgress { message: String, cancellable: bool },
}

fn attach(host: &mut dyn SurfaceHost, surface: SurfaceId, index: Option<usize>, op: &'static str) {
    if host.index_of(surface).is_some() {
        return;
    }
    if let Err(err) = host.attach(surface, index) {
        tracing::warn!(op, surface = surface.raw(), %err, "attach failed");
    }
}

fn detach(host: &mut dyn SurfaceHost, surface: SurfaceId, op: &'static str) {
    if host.index_of(surface).is_none() {
        return;
    }
    if let Err(err) = host.detach(surface) {
        tracing::warn!(op, surface = surface.raw(), %err, "detach failed");
    }
}

fn log_failure(op: &'static str, result: Result<(), HostError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(op, %err, "platform call failed");
            false
        }
    }
}

/// Owner of every overlay surface on one host window.
pub struct Orchestrator {
    config: OverlayConfig,
    platform: Platform,
    state: HostState,
    orientation: Orientation,

    flags: FlagAggregator,
    windows: WindowStack,
    camera: CameraMachine,
    passcode: PasscodeGate,
    progress: ProgressOverlay,
    night: NightModeDebouncer,

    auto_night_mode: bool,
    proximity_locked: bool,
    /// Latency the light sensor is currently registered with.
    sensor_latency: Option<Duration>,

    scheduler: Scheduler<Deferred>,
    focus_task: TaskSlot,
    camera_task: TaskSlot,
    progress_task: TaskSlot,
    clock: FrameClock,

    lifecycle_listeners: Listeners<dyn LifecycleListener>,
    passcode_listeners: Listeners<dyn PasscodeListener>,
    window_observers: Listeners<dyn WindowObserver>,
    lux_listeners: Listeners<dyn LuxListener>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("windows", &self.windows.len())
            .field("camera", &self.camera.phase())
            .field("passcode", &self.passcode.is_showing())
            .field("decor", &self.flags.applied())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Build an orchestrator over `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(platform: Platform, config: OverlayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let in_night = platform.theme.is_dark();
        Ok(Self {
            flags: FlagAggregator::new(),
            windows: WindowStack::new(config.window_reveal_duration),
            camera: CameraMachine::new(&config),
            passcode: PasscodeGate::new(config.passcode_fade_duration),
            progress: ProgressOverlay::new(config.progress_duration),
            night: NightModeDebouncer::new(
                in_night,
                config.max_night_lux,
                config.night_mode_confirm_delay,
            ),
            config,
            platform,
            state: HostState::Unknown,
            orientation: Orientation::default(),
            auto_night_mode: false,
            proximity_locked: false,
            sensor_latency: None,
            scheduler: Scheduler::new(),
            focus_task: TaskSlot::new(),
            camera_task: TaskSlot::new(),
            progress_task: TaskSlot::new(),
            clock: FrameClock::new(),
            lifecycle_listeners: Listeners::new(),
            passcode_listeners: Listeners::new(),
            window_observers: Listeners::new(),
            lux_listeners: Listeners::new(),
        })
    }

    // --- Queries ---

    #[inline]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    #[inline]
    pub fn host_state(&self) -> HostState {
        self.state
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The modal stack, read-only.
    #[inline]
    pub fn windows(&self) -> &WindowStack {
        &self.windows
    }

    /// Decor computed from the current reasons.
    pub fn decor(&self) -> DecorFlags {
        self.flags.compute()
    }

    #[inline]
    pub fn fullscreen_flags(&self) -> FullscreenFlags {
        self.flags.fullscreen_flags()
    }

    #[inline]
    pub fn keep_awake_flags(&self) -> KeepAwakeFlags {
        self.flags.keep_awake_flags()
    }

    #[inline]
    pub fn is_fullscreen_active(&self) -> bool {
        self.flags.is_fullscreen_active()
    }

    /// Any transition in flight: navigation, a revealing window, the camera,
    /// or the progress overlay.
    pub fn is_animating(&self) -> bool {
        self.host_busy() || self.windows.has_animating_window()
    }

    /// Camera, dragging or navigation keep the host from other work.
    pub fn is_busy_with_something(&self) -> bool {
        self.camera.is_busy() || self.navigation_busy()
    }

    // --- Modal windows ---

    /// Present a window. `None` means it was rejected and already torn down.
    pub fn show_window(&mut self, window: Box<dyn ModalSurface>) -> Option<WindowId> {
        let busy = self.host_busy();
        let id = self.windows.show(window, busy);
        if id.is_none() {
            tracing::debug!("window rejected: host is busy");
        }
        self.settle();
        id
    }

    /// Hide a live or forgotten window.
    pub fn hide_window(&mut self, id: WindowId, animated: bool) -> bool {
        let hidden = self.windows.hide(id, animated);
        self.settle();
        hidden
    }

    /// Dismiss the top showing window (LIFO). See [`WindowStack::dismiss_top`].
    pub fn dismiss_top(&mut self, by_key: bool, by_back: bool, by_header: bool) -> bool {
        let handled = self.windows.dismiss_top(by_key, by_back, by_header);
        self.settle();
        handled
    }

    /// Take a window out of the stack (or the forgotten table) without teardown.
    pub fn remove_window(&mut self, id: WindowId) -> Option<Box<dyn ModalSurface>> {
        let window = self.windows.remove(id);
        self.settle();
        window
    }

    /// Detach a window from stack semantics while keeping it alive.
    pub fn forget_window(&mut self, id: WindowId) -> bool {
        let forgotten = self.windows.forget(id);
        self.settle();
        forgotten
    }

    /// Put a forgotten window back at its original relative position.
    pub fn remember_window(&mut self, id: WindowId) -> bool {
        let remembered = self.windows.remember(id);
        self.settle();
        remembered
    }

    /// Permanently drop a forgotten window from the side table.
    pub fn forget_window_completely(&mut self, id: WindowId) -> Option<Box<dyn ModalSurface>> {
        let window = self.windows.forget_completely(id);
        self.settle();
        window
    }

    /// Close every forgotten window matching `pred`.
    pub fn close_forgotten_windows(&mut self, pred: impl FnMut(&dyn ModalSurface) -> bool) -> usize {
        let closed = self.windows.close_forgotten(pred);
        self.settle();
        closed
    }

    #[inline]
    pub fn current_top_window(&self) -> Option<WindowId> {
        self.windows.current_top()
    }

    #[inline]
    pub fn current_top_controller(&self) -> Option<ControllerId> {
        self.windows.current_top_controller()
    }

    #[inline]
    pub fn has_animating_window(&self) -> bool {
        self.windows.has_animating_window()
    }

    // --- Camera ---

    #[inline]
    pub fn camera_phase(&self) -> CameraPhase {
        self.camera.phase()
    }

    #[inline]
    pub fn camera_factor(&self) -> f32 {
        self.camera.factor()
    }

    #[inline]
    pub fn is_camera_open(&self) -> bool {
        self.camera.is_open()
    }

    pub fn can_open_camera(&self) -> bool {
        self.camera.can_open(&self.camera_gate())
    }

    /// Open the camera by tap.
    ///
    /// With the soft keyboard up, the keyboard is dismissed and the open is
    /// retried after `keyboard_dismiss_delay`; this call then returns `false`.
    pub fn open_camera(&mut self, options: CameraOptions) -> bool {
        if self.camera.is_open() {
            return true;
        }
        self.sync_camera_caps();
        if !self.camera.can_open(&self.camera_gate()) {
            return false;
        }
        if self.platform.content.is_keyboard_visible() {
            self.platform.content.hide_keyboard();
            self.camera_task.replace(
                &mut self.scheduler,
                self.config.keyboard_dismiss_delay,
                Deferred::OpenCamera(options),
            );
            return false;
        }
        self.platform.content.hide_keyboard();
        if !self.camera_permitted(options) {
            return false;
        }
        self.camera.open(options);
        self.apply_camera_effects();
        self.settle();
        true
    }

    pub fn close_camera(&mut self) {
        self.camera_task.cancel(&mut self.scheduler);
        self.camera.close();
        self.apply_camera_effects();
        self.settle();
    }

    /// Whether a touch-down may arm a drag toward `open`.
    pub fn prepare_camera_drag(&mut self, open: bool) -> bool {
        self.sync_camera_caps();
        self.camera.can_toggle(open, &self.camera_gate())
    }

    /// Commit to a drag toward `open`.
    pub fn start_camera_drag(&mut self, options: CameraOptions, open: bool) -> bool {
        if !self.prepare_camera_drag(open) {
            return false;
        }
        if open && !self.camera_permitted(options) {
            return false;
        }
        let portrait = self.platform.host.orientation().is_portrait();
        let started = self.camera.start_drag(options, open, portrait);
        self.apply_camera_effects();
        self.settle();
        started
    }

    pub fn drag_camera(&mut self, factor: f32) {
        self.camera.set_drag_factor(factor);
        self.apply_camera_effects();
        self.settle();
    }

    /// Release the drag. `None` picks the target from the drop threshold.
    pub fn drop_camera_drag(&mut self, open: Option<bool>, by_fling: bool) {
        self.camera.drop_drag(open, by_fling);
        self.apply_camera_effects();
        self.settle();
    }

    pub fn force_close_camera(&mut self) {
        self.camera.force_close();
        self.apply_camera_effects();
        self.settle();
    }

    pub fn close_camera_by_back_press(&mut self) -> bool {
        let recording = self.camera_recording();
        let closed = self.camera.close_by_back_press(recording);
        self.apply_camera_effects();
        self.settle();
        closed
    }

    pub fn set_camera_blocked(&mut self, blocked: bool) {
        self.camera.set_blocked(blocked);
        self.apply_camera_effects();
        self.settle();
    }

    /// Lend the camera surface to another caller (e.g. a QR scanner).
    pub fn take_camera_ownership(&mut self, options: CameraOptions) -> bool {
        self.sync_camera_caps();
        let gate = self.camera_gate();
        let taken = self.camera.take_ownership(options, &gate);
        self.apply_camera_effects();
        self.settle();
        taken
    }

    pub fn release_camera_ownership(&mut self) {
        self.camera.release_ownership();
        self.apply_camera_effects();
        self.settle();
    }

    // --- Passcode ---

    #[inline]
    pub fn is_passcode_showing(&self) -> bool {
        self.passcode.is_showing()
    }

    pub fn show_passcode(&mut self) {
        let color = self.platform.host.status_bar_color();
        let default_color = self.platform.host.default_status_bar_color();
        self.passcode.show(color, default_color);
        self.apply_passcode_effects();
        self.settle();
    }

    pub fn hide_passcode(&mut self) {
        let camera_attached = self.camera.is_owning_camera();
        self.passcode.hide(camera_attached);
        self.apply_passcode_effects();
        self.settle();
    }

    // --- Progress ---

    #[inline]
    pub fn is_progress_showing(&self) -> bool {
        self.progress.is_showing()
    }

    pub fn show_progress(&mut self, message: &str, cancellable: bool) {
        self.progress_task.cancel(&mut self.scheduler);
        self.progress.show(message, cancellable);
        self.apply_progress_effects();
        self.settle();
    }

    /// Show the progress after `delay` unless hidden before then.
    pub fn show_progress_delayed(&mut self, message: &str, cancellable: bool, delay: Duration) {
        self.progress_task.replace(
            &mut self.scheduler,
            delay,
            Deferred::ShowProgress {
                message: message.to_owned(),
                cancellable,
            },
        );
    }

    pub fn hide_progress(&mut self, forced: bool) {
        self.progress_task.cancel(&mut self.scheduler);
        self.progress.hide(forced);
        self.apply_progress_effects();
        self.settle();
    }

    // --- Decor reasons ---

    pub fn set_fullscreen_flag(&mut self, flag: FullscreenFlags, enabled: bool) {
        if self.flags.set_fullscreen_flag(flag, enabled) {
            self.settle();
        }
    }

    pub fn set_keep_awake_flag(&mut self, flag: KeepAwakeFlags, enabled: bool) {
        if self.flags.set_keep_awake_flag(flag, enabled) {
            self.settle();
        }
    }

    pub fn add_fullscreen_surface(&mut self, controller: ControllerId, need_fullscreen: bool) {
        self.flags.add_fullscreen_surface(controller, need_fullscreen);
        self.settle();
    }

    pub fn remove_fullscreen_surface(&mut self, controller: ControllerId, need_fullscreen: bool) {
        self.flags
            .remove_fullscreen_surface(controller, need_fullscreen);
        self.settle();
    }

    pub fn add_hide_system_bars_surface(&mut self, controller: ControllerId) {
        self.flags.add_hide_system_bars_surface(controller);
        self.settle();
    }

    pub fn remove_hide_system_bars_surface(&mut self, controller: ControllerId) {
        self.flags.remove_hide_system_bars_surface(controller);
        self.settle();
    }

    /// Re-run the screenshot reduction after a screen changed its own flag.
    pub fn check_screenshots(&mut self) {
        self.settle();
    }

    // --- Back press ---

    /// Route a back press: progress, windows, camera, then content.
    ///
    /// Ignored while the passcode lock is up.
    pub fn on_back_pressed(&mut self, from_top: bool) -> bool {
        if self.passcode.is_showing() {
            tracing::debug!("back press ignored under passcode lock");
            return false;
        }
        if self.progress.is_showing() {
            self.progress.on_back_pressed();
            self.apply_progress_effects();
            self.settle();
            return true;
        }
        if self.dismiss_top(false, true, from_top) {
            return true;
        }
        if self.camera.is_open() {
            self.close_camera_by_back_press();
            return true;
        }
        if self.is_animating() {
            return false;
        }
        self.platform.content.on_back_pressed(from_top)
    }

    // --- Lifecycle ---

    /// Fan a host lifecycle event out to every surface and listener.
    pub fn dispatch_lifecycle(&mut self, event: LifecycleEvent) {
        if let Some(state) = event.target_state() {
            self.state = state;
        }
        if let LifecycleEvent::OrientationChanged(orientation) = event {
            self.orientation = orientation;
        }
        tracing::debug!(?event, "lifecycle");

        if event == LifecycleEvent::Destroyed {
            self.destroy();
            return;
        }

        if self.camera.is_owning_camera() {
            self.platform.camera.on_lifecycle(event);
        }
        if self.passcode.is_lock_attached() {
            self.platform.lock.on_lifecycle(event);
        }
        for listener in self.lifecycle_listeners.snapshot() {
            listener.on_lifecycle(event);
        }
        self.platform.content.on_lifecycle(event);
        self.windows.dispatch_lifecycle(event);

        self.sync_camera_caps();
        self.apply_camera_effects();
        self.check_auto_night_mode();
        self.settle();
    }

    pub fn add_lifecycle_listener(&mut self, listener: Rc<dyn LifecycleListener>) -> ListenerId {
        self.lifecycle_listeners.add(listener)
    }

    pub fn remove_lifecycle_listener(&mut self, id: ListenerId) -> bool {
        self.lifecycle_listeners.remove(id)
    }

    pub fn add_passcode_listener(&mut self, listener: Rc<dyn PasscodeListener>) -> ListenerId {
        self.passcode_listeners.add(listener)
    }

    pub fn remove_passcode_listener(&mut self, id: ListenerId) -> bool {
        self.passcode_listeners.remove(id)
    }

    pub fn add_window_observer(&mut self, observer: Rc<dyn WindowObserver>) -> ListenerId {
        self.window_observers.add(observer)
    }

    pub fn remove_window_observer(&mut self, id: ListenerId) -> bool {
        self.window_observers.remove(id)
    }

    // --- Night mode ---

    #[inline]
    pub fn is_sensor_registered(&self) -> bool {
        self.sensor_latency.is_some()
    }

    #[inline]
    pub fn in_night_mode(&self) -> bool {
        self.night.in_night()
    }

    /// Turn automatic (light-sensor driven) night mode on or off.
    pub fn set_auto_night_mode(&mut self, enabled: bool) {
        if self.auto_night_mode != enabled {
            self.auto_night_mode = enabled;
            self.check_auto_night_mode();
        }
    }

    #[inline]
    pub fn max_night_lux(&self) -> f32 {
        self.night.max_lux()
    }

    /// Set the night threshold and re-check the last sample.
    ///
    /// Negative or non-finite thresholds are ignored.
    pub fn set_max_night_lux(&mut self, max_lux: f32) {
        if !max_lux.is_finite() || max_lux < 0.0 {
            tracing::warn!(max_lux, "ignoring invalid night threshold");
            return;
        }
        self.night.set_max_lux(max_lux);
        self.check_night_mode();
    }

    /// A proximity lock suppresses theme switches.
    pub fn set_proximity_locked(&mut self, locked: bool) {
        self.proximity_locked = locked;
    }

    /// Feed one ambient-light sample. Dropped unless the sensor is registered.
    pub fn on_lux_changed(&mut self, lux: f32) {
        if !self.is_sensor_registered() {
            tracing::trace!(lux, "lux sample without registered sensor");
            return;
        }
        for listener in self.lux_listeners.snapshot() {
            listener.on_lux(lux);
        }
        let allowed = self.night_switch_allowed();
        if let Some(night) = self.night.sample(lux, allowed) {
            self.platform.theme.set_in_night_mode(night);
        }
    }

    /// The theme was switched by hand; re-check it against the last sample.
    pub fn force_night_mode(&mut self, night: bool) {
        if !self.is_sensor_registered() {
            self.night.sync(night);
            return;
        }
        let allowed = self.night_switch_allowed();
        if let Some(night) = self.night.force(night, allowed) {
            self.platform.theme.set_in_night_mode(night);
        }
    }

    /// Apply the last sample immediately.
    pub fn check_night_mode(&mut self) {
        if !self.is_sensor_registered() {
            return;
        }
        let allowed = self.night_switch_allowed();
        if let Some(night) = self.night.evaluate(allowed) {
            self.platform.theme.set_in_night_mode(night);
        }
    }

    /// Register a lux listener; sampling switches to the fast rate.
    pub fn add_lux_listener(&mut self, listener: Rc<dyn LuxListener>) -> ListenerId {
        let id = self.lux_listeners.add(listener);
        self.check_auto_night_mode();
        id
    }

    pub fn remove_lux_listener(&mut self, id: ListenerId) -> bool {
        let removed = self.lux_listeners.remove(id);
        if removed {
            self.check_auto_night_mode();
        }
        removed
    }

    // --- Time ---

    /// Advance virtual time by `dt`: deferred tasks first, then animations.
    pub fn advance(&mut self, dt: Duration) {
        for task in self.scheduler.advance(dt) {
            self.run_deferred(task);
        }

        self.camera.advance(dt);
        self.apply_camera_effects();
        self.passcode.advance(dt);
        self.apply_passcode_effects();
        self.progress.advance(dt);
        self.apply_progress_effects();
        self.windows.advance(dt);

        let allowed = self.night_switch_allowed();
        if let Some(night) = self.night.advance(dt, allowed) {
            self.platform.theme.set_in_night_mode(night);
        }

        self.settle();
    }

    /// Advance by the wall-clock time since the previous pump.
    pub fn pump(&mut self, now: Instant) {
        let dt = self.clock.tick(now);
        self.advance(dt);
    }

    // --- Internals ---

    fn navigation_busy(&self) -> bool {
        self.platform.content.is_recording()
            || self.windows.has_animating_window()
            || self.platform.content.is_busy()
    }

    fn host_busy(&self) -> bool {
        self.platform.content.is_busy()
            || self.camera.is_animating()
            || self.camera.is_dragging()
            || self.progress.is_showing()
    }

    fn camera_recording(&self) -> bool {
        self.platform.content.is_recording() || self.platform.camera.is_recording()
    }

    fn camera_gate(&self) -> CameraGate {
        CameraGate {
            host_resumed: self.state.is_resumed(),
            recording: self.platform.content.is_recording(),
            navigation_busy: self.navigation_busy(),
        }
    }

    fn sync_camera_caps(&mut self) {
        self.camera.set_caps(CameraCaps {
            custom_rotations: self.platform.camera.supports_custom_rotations(),
            editor_open: self.platform.camera.has_open_editor(),
        });
    }

    /// Camera permission; anything but an outright grant fails closed.
    fn camera_permitted(&mut self, options: CameraOptions) -> bool {
        match self
            .platform
            .permissions
            .camera_access(options.optional_microphone)
        {
            Ok(Permission::Granted) => true,
            Ok(permission) => {
                tracing::debug!(?permission, "camera permission not granted");
                false
            }
            Err(err) => {
                tracing::warn!(%err, "camera permission check failed");
                false
            }
        }
    }

    fn night_switch_allowed(&self) -> bool {
        self.platform.content.allows_theme_change() && !self.proximity_locked
    }

    fn check_auto_night_mode(&mut self) {
        let wanted = self.state.is_resumed()
            && self.auto_night_mode
            && self.platform.sensor.is_available();
        if !wanted {
            if self.sensor_latency.take().is_some() {
                log_failure("unregister light sensor", self.platform.sensor.unregister());
                self.night.sync(self.night.in_night());
            }
            return;
        }

        let latency = if self.lux_listeners.is_empty() {
            self.config.sensor_latency_regular
        } else {
            self.config.sensor_latency_fast
        };
        if self.sensor_latency == Some(latency) {
            return;
        }
        let newly = self.sensor_latency.is_none();
        if !newly {
            log_failure("unregister light sensor", self.platform.sensor.unregister());
            self.sensor_latency = None;
        }
        if log_failure("register light sensor", self.platform.sensor.register(latency)) {
            self.sensor_latency = Some(latency);
            if newly {
                self.night.sync(self.platform.theme.is_dark());
            }
        }
    }

    fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::RestoreNavigationFocus => {
                self.focus_task.clear();
                self.passcode.focus_restored();
                self.platform.content.on_focus();
            }
            Deferred::OpenCamera(options) => {
                self.camera_task.clear();
                self.open_camera(options);
            }
            Deferred::ShowProgress {
                message,
                cancellable,
            } => {
                self.progress_task.clear();
                self.progress.show(&message, cancellable);
                self.apply_progress_effects();
            }
        }
    }

    fn apply_camera_effects(&mut self) {
        let camera = self.platform.camera.surface();
        let content = self.platform.content.surface();
        for effect in self.camera.drain_effects() {
            let host = &mut *self.platform.host;
            match effect {
                CameraEffect::Prepare(options) => {
                    self.platform.camera.prepare(&options);
                    self.windows.hide_contextual();
                }
                CameraEffect::AttachCamera => attach(host, camera, Some(0), "attach camera"),
                CameraEffect::DetachCamera => detach(host, camera, "detach camera"),
                CameraEffect::AttachContent => attach(host, content, Some(1), "attach content"),
                CameraEffect::DetachContent => detach(host, content, "detach content"),
                CameraEffect::FocusCamera => {
                    self.platform.camera.on_focus();
                    tracing::debug!("camera completely open");
                }
                CameraEffect::BlurCamera => self.platform.camera.on_blur(),
                CameraEffect::FocusContent => {
                    self.platform.content.on_focus();
                    tracing::debug!("camera completely closed");
                }
                CameraEffect::BlurContent => self.platform.content.on_blur(),
                CameraEffect::Factor {
                    value,
                    by_drag,
                    growing,
                } => self
                    .platform
                    .camera
                    .set_appear_factor(value, by_drag, growing),
                CameraEffect::OrientationLock(locked) => {
                    log_failure("lock orientation", host.set_orientation_locked(locked));
                }
                CameraEffect::HideKeyboard => self.platform.content.hide_keyboard(),
                CameraEffect::CleanAfterHide => self.platform.camera.on_clean_after_hide(),
            }
        }
    }

    fn apply_passcode_effects(&mut self) {
        let lock = self.platform.lock.surface();
        let content = self.platform.content.surface();
        for effect in self.passcode.drain_effects() {
            let host = &mut *self.platform.host;
            match effect {
                PasscodeEffect::SuspendWindows => {
                    self.windows.suspend_all();
                }
                PasscodeEffect::RestoreWindows => {
                    self.windows.restore_all();
                }
                PasscodeEffect::Active(active) => {
                    self.flags
                        .set_fullscreen_flag(FullscreenFlags::PASSCODE_ACTIVE, active);
                }
                PasscodeEffect::BlurNavigation => self.platform.content.on_blur(),
                PasscodeEffect::ScheduleFocusRestore => {
                    self.focus_task.replace(
                        &mut self.scheduler,
                        self.config.focus_restore_delay,
                        Deferred::RestoreNavigationFocus,
                    );
                }
                PasscodeEffect::CancelFocusRestore => {
                    self.focus_task.cancel(&mut self.scheduler);
                }
                PasscodeEffect::Notify(showing) => {
                    tracing::debug!(showing, "passcode showing changed");
                    for listener in self.passcode_listeners.snapshot_rev() {
                        listener.on_passcode_showing(showing);
                    }
                }
                PasscodeEffect::PrepareLock => self.platform.lock.prepare(),
                PasscodeEffect::AttachLock => attach(host, lock, None, "attach lock"),
                PasscodeEffect::FocusLock => self.platform.lock.on_focus(),
                PasscodeEffect::DetachLock => detach(host, lock, "detach lock"),
                PasscodeEffect::TeardownLock => self.platform.lock.teardown(),
                PasscodeEffect::DetachContent => detach(host, content, "detach content"),
                PasscodeEffect::AttachContent { index } => {
                    // An open camera keeps the content detached.
                    if !self.camera.is_content_detached() {
                        attach(host, content, Some(index), "attach content");
                    }
                }
                PasscodeEffect::LockAlpha(alpha) => {
                    self.platform.lock.set_alpha(alpha);
                    self.flags.set_passcode_alpha(alpha);
                }
                PasscodeEffect::StatusBarColor(color) => {
                    log_failure("set status bar color", host.set_status_bar_color(color));
                }
            }
        }
    }

    fn apply_progress_effects(&mut self) {
        let surface = self.platform.progress.surface();
        for effect in self.progress.drain_effects() {
            let host = &mut *self.platform.host;
            match effect {
                ProgressEffect::Attach => attach(host, surface, None, "attach progress"),
                ProgressEffect::Message(message) => self.platform.progress.set_message(&message),
                ProgressEffect::Factor(factor) => self.platform.progress.set_factor(factor),
                ProgressEffect::Closed => self.platform.progress.on_close(),
                ProgressEffect::Detach => detach(host, surface, "detach progress"),
            }
        }
    }

    fn destroy(&mut self) {
        if self.passcode.is_lock_attached() {
            self.platform.lock.on_lifecycle(LifecycleEvent::Destroyed);
        }
        self.passcode.destroy();
        self.apply_passcode_effects();
        for listener in self.lifecycle_listeners.snapshot() {
            listener.on_lifecycle(LifecycleEvent::Destroyed);
        }
        self.platform.content.on_lifecycle(LifecycleEvent::Destroyed);
        self.windows.dispatch_lifecycle(LifecycleEvent::Destroyed);
        self.windows.destroy_all();
        if self.camera.is_owning_camera() {
            self.platform.camera.on_lifecycle(LifecycleEvent::Destroyed);
        }

        self.scheduler.clear();
        self.focus_task.clear();
        self.camera_task.clear();
        self.progress_task.clear();

        self.check_auto_night_mode();
        self.settle();
    }

    /// Deliver window notifications and push decor if it changed.
    fn settle(&mut self) {
        for event in self.windows.drain_events() {
            for observer in self.window_observers.snapshot() {
                match event {
                    StackEvent::Shown(id) => observer.on_window_shown(id),
                    StackEvent::Dismissed(id) => observer.on_window_dismissed(id),
                }
            }
        }

        let secure = self.platform.content.disallows_screenshots()
            || (self.passcode.is_lock_attached() && self.platform.lock.disallows_screenshots())
            || self.windows.disallows_screenshots();
        self.flags.set_screenshots_disallowed(secure);
        self.flags
            .set_fullscreen_flag(FullscreenFlags::CAMERA_OPEN, self.camera.wants_fullscreen());
        self.flags
            .set_keep_awake_flag(KeepAwakeFlags::CAMERA_OPEN, self.camera.keeps_awake());
        self.flags.set_passcode_alpha(self.passcode.lock_alpha());

        if let Some(decor) = self.flags.pending()
            && log_failure("apply decor", self.platform.host.apply_decor(&decor))
        {
            self.flags.mark_applied(decor);
        }
    }
}
