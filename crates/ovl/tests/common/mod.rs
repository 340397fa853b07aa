#![forbid(unsafe_code)]
#![allow(dead_code)]

//! In-memory fakes of every collaborator, sharing one observable [`World`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ovl::prelude::*;

pub const CONTENT: SurfaceId = SurfaceId::new(1);
pub const CAMERA: SurfaceId = SurfaceId::new(2);
pub const LOCK: SurfaceId = SurfaceId::new(3);
pub const PROGRESS: SurfaceId = SurfaceId::new(4);

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Everything the fakes record or read.
#[derive(Debug)]
pub struct World {
    pub root: Vec<SurfaceId>,
    pub decor: Vec<DecorFlags>,
    pub fail_decor: bool,
    pub orientation: Orientation,
    pub orientation_locked: bool,
    pub status_color: u32,
    pub default_status_color: u32,
    pub log: Vec<String>,

    pub keyboard_visible: bool,
    pub content_busy: bool,
    pub recording: bool,
    pub allows_theme_change: bool,
    pub content_secure: bool,
    pub content_consumes_back: bool,

    pub custom_rotations: bool,
    pub editor_open: bool,
    pub camera_factor: f32,

    pub lock_alpha: f32,
    pub lock_secure: bool,

    pub progress_message: String,
    pub progress_factor: f32,

    pub sensor_available: bool,
    pub sensor_fails: bool,
    pub sensor: Option<Duration>,
    pub registrations: usize,

    pub dark: bool,
    pub permission: Result<Permission, HostError>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            root: vec![CONTENT],
            decor: Vec::new(),
            fail_decor: false,
            orientation: Orientation::Portrait,
            orientation_locked: false,
            status_color: 0,
            default_status_color: 0,
            log: Vec::new(),
            keyboard_visible: false,
            content_busy: false,
            recording: false,
            allows_theme_change: true,
            content_secure: false,
            content_consumes_back: false,
            custom_rotations: false,
            editor_open: false,
            camera_factor: 0.0,
            lock_alpha: 0.0,
            lock_secure: false,
            progress_message: String::new(),
            progress_factor: 0.0,
            sensor_available: true,
            sensor_fails: false,
            sensor: None,
            registrations: 0,
            dark: false,
            permission: Ok(Permission::Granted),
        }
    }
}

pub type Shared = Rc<RefCell<World>>;

impl World {
    pub fn last_decor(&self) -> DecorFlags {
        self.decor.last().copied().unwrap_or_default()
    }

    pub fn logged(&self, entry: &str) -> bool {
        self.log.iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.log.iter().position(|e| e == entry)
    }
}

struct FakeHost(Shared);

impl SurfaceHost for FakeHost {
    fn attach(&mut self, surface: SurfaceId, index: Option<usize>) -> Result<(), HostError> {
        let mut w = self.0.borrow_mut();
        if w.root.contains(&surface) {
            return Err(HostError::SurfaceAlreadyAttached);
        }
        let at = index.unwrap_or(w.root.len()).min(w.root.len());
        w.root.insert(at, surface);
        Ok(())
    }

    fn detach(&mut self, surface: SurfaceId) -> Result<(), HostError> {
        let mut w = self.0.borrow_mut();
        let Some(pos) = w.root.iter().position(|s| *s == surface) else {
            return Err(HostError::SurfaceNotAttached);
        };
        w.root.remove(pos);
        Ok(())
    }

    fn index_of(&self, surface: SurfaceId) -> Option<usize> {
        self.0.borrow().root.iter().position(|s| *s == surface)
    }

    fn apply_decor(&mut self, decor: &DecorFlags) -> Result<(), HostError> {
        let mut w = self.0.borrow_mut();
        if w.fail_decor {
            return Err(HostError::platform("window is gone"));
        }
        w.decor.push(*decor);
        Ok(())
    }

    fn set_orientation_locked(&mut self, locked: bool) -> Result<(), HostError> {
        self.0.borrow_mut().orientation_locked = locked;
        Ok(())
    }

    fn orientation(&self) -> Orientation {
        self.0.borrow().orientation
    }

    fn status_bar_color(&self) -> u32 {
        self.0.borrow().status_color
    }

    fn default_status_bar_color(&self) -> u32 {
        self.0.borrow().default_status_color
    }

    fn set_status_bar_color(&mut self, color: u32) -> Result<(), HostError> {
        self.0.borrow_mut().status_color = color;
        Ok(())
    }
}

struct FakeContent(Shared);

impl ContentLayer for FakeContent {
    fn surface(&self) -> SurfaceId {
        CONTENT
    }

    fn is_busy(&self) -> bool {
        self.0.borrow().content_busy
    }

    fn is_recording(&self) -> bool {
        self.0.borrow().recording
    }

    fn allows_theme_change(&self) -> bool {
        self.0.borrow().allows_theme_change
    }

    fn disallows_screenshots(&self) -> bool {
        self.0.borrow().content_secure
    }

    fn is_keyboard_visible(&self) -> bool {
        self.0.borrow().keyboard_visible
    }

    fn hide_keyboard(&mut self) {
        self.0.borrow_mut().keyboard_visible = false;
    }

    fn on_focus(&mut self) {
        self.0.borrow_mut().log.push("content.focus".into());
    }

    fn on_blur(&mut self) {
        self.0.borrow_mut().log.push("content.blur".into());
    }

    fn on_back_pressed(&mut self, _from_top: bool) -> bool {
        let mut w = self.0.borrow_mut();
        w.log.push("content.back".into());
        w.content_consumes_back
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        self.0.borrow_mut().log.push(format!("content.{event:?}"));
    }
}

struct FakeCamera(Shared);

impl CameraView for FakeCamera {
    fn surface(&self) -> SurfaceId {
        CAMERA
    }

    fn supports_custom_rotations(&self) -> bool {
        self.0.borrow().custom_rotations
    }

    fn has_open_editor(&self) -> bool {
        self.0.borrow().editor_open
    }

    fn prepare(&mut self, options: &CameraOptions) {
        self.0
            .borrow_mut()
            .log
            .push(format!("camera.prepare.{:?}", options.mode));
    }

    fn set_appear_factor(&mut self, factor: f32, _by_drag: bool, _growing: bool) {
        self.0.borrow_mut().camera_factor = factor;
    }

    fn on_focus(&mut self) {
        self.0.borrow_mut().log.push("camera.focus".into());
    }

    fn on_blur(&mut self) {
        self.0.borrow_mut().log.push("camera.blur".into());
    }

    fn on_clean_after_hide(&mut self) {
        self.0.borrow_mut().log.push("camera.clean".into());
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        self.0.borrow_mut().log.push(format!("camera.{event:?}"));
    }
}

struct FakeLock(Shared);

impl LockScreen for FakeLock {
    fn surface(&self) -> SurfaceId {
        LOCK
    }

    fn prepare(&mut self) {
        self.0.borrow_mut().log.push("lock.prepare".into());
    }

    fn on_focus(&mut self) {
        self.0.borrow_mut().log.push("lock.focus".into());
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.0.borrow_mut().lock_alpha = alpha;
    }

    fn disallows_screenshots(&self) -> bool {
        self.0.borrow().lock_secure
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        self.0.borrow_mut().log.push(format!("lock.{event:?}"));
    }

    fn teardown(&mut self) {
        self.0.borrow_mut().log.push("lock.teardown".into());
    }
}

struct FakeProgress(Shared);

impl ProgressView for FakeProgress {
    fn surface(&self) -> SurfaceId {
        PROGRESS
    }

    fn set_message(&mut self, message: &str) {
        self.0.borrow_mut().progress_message = message.to_owned();
    }

    fn set_factor(&mut self, factor: f32) {
        self.0.borrow_mut().progress_factor = factor;
    }

    fn on_close(&mut self) {
        self.0.borrow_mut().log.push("progress.close".into());
    }
}

struct FakeSensor(Shared);

impl LightSensor for FakeSensor {
    fn is_available(&self) -> bool {
        self.0.borrow().sensor_available
    }

    fn register(&mut self, latency: Duration) -> Result<(), HostError> {
        let mut w = self.0.borrow_mut();
        if w.sensor_fails {
            return Err(HostError::SensorUnavailable);
        }
        w.sensor = Some(latency);
        w.registrations += 1;
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), HostError> {
        self.0.borrow_mut().sensor = None;
        Ok(())
    }
}

struct FakeTheme(Shared);

impl ThemeSink for FakeTheme {
    fn is_dark(&self) -> bool {
        self.0.borrow().dark
    }

    fn set_in_night_mode(&mut self, night: bool) {
        let mut w = self.0.borrow_mut();
        w.dark = night;
        w.log.push(format!("theme.night.{night}"));
    }
}

struct FakePermissions(Shared);

impl PermissionGate for FakePermissions {
    fn camera_access(&mut self, _optional_microphone: bool) -> Result<Permission, HostError> {
        self.0.borrow().permission.clone()
    }
}

/// Build a platform of fakes around `world`.
pub fn platform(world: &Shared) -> Platform {
    Platform {
        host: Box::new(FakeHost(world.clone())),
        content: Box::new(FakeContent(world.clone())),
        camera: Box::new(FakeCamera(world.clone())),
        lock: Box::new(FakeLock(world.clone())),
        progress: Box::new(FakeProgress(world.clone())),
        sensor: Box::new(FakeSensor(world.clone())),
        theme: Box::new(FakeTheme(world.clone())),
        permissions: Box::new(FakePermissions(world.clone())),
    }
}

/// Route `tracing` output through the test harness (`RUST_LOG` filters it).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A resumed orchestrator with default timings.
pub fn resumed() -> (Orchestrator, Shared) {
    init_tracing();
    let world = Shared::default();
    let mut overlays = Orchestrator::new(platform(&world), OverlayConfig::default())
        .expect("default config is valid");
    overlays.dispatch_lifecycle(LifecycleEvent::Resumed);
    (overlays, world)
}

/// Modal window that records its callbacks in the world log.
pub struct TestWindow {
    pub name: &'static str,
    pub contextual: bool,
    pub from_camera: bool,
    pub secure: bool,
    pub world: Shared,
}

impl TestWindow {
    pub fn new(name: &'static str, world: &Shared) -> Self {
        Self {
            name,
            contextual: false,
            from_camera: false,
            secure: false,
            world: world.clone(),
        }
    }

    pub fn contextual(mut self) -> Self {
        self.contextual = true;
        self
    }

    pub fn from_camera(mut self) -> Self {
        self.from_camera = true;
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn boxed(self) -> Box<dyn ModalSurface> {
        Box::new(self)
    }

    fn record(&self, what: &str) {
        self.world
            .borrow_mut()
            .log
            .push(format!("{}.{what}", self.name));
    }
}

impl ModalSurface for TestWindow {
    fn is_contextual(&self) -> bool {
        self.contextual
    }

    fn is_from_camera(&self) -> bool {
        self.from_camera
    }

    fn disallows_screenshots(&self) -> bool {
        self.secure
    }

    fn on_show(&mut self) {
        self.record("show");
    }

    fn on_hide(&mut self) {
        self.record("hide");
    }

    fn hide_temporarily(&mut self) {
        self.record("suspend");
    }

    fn restore(&mut self) {
        self.record("restore");
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        self.record(&format!("{event:?}"));
    }

    fn teardown(&mut self) {
        self.record("teardown");
    }
}
