#![forbid(unsafe_code)]

mod common;

use std::rc::Rc;

use common::{CONTENT, PROGRESS, Shared, TestWindow, ms, platform, resumed};
use ovl::prelude::*;
use ovl::{ConfigError, HostState};

struct Tracker(Shared);

impl LifecycleListener for Tracker {
    fn on_lifecycle(&self, event: LifecycleEvent) {
        self.0.borrow_mut().log.push(format!("listener.{event:?}"));
    }
}

#[test]
fn pause_reaches_everyone_in_order() {
    let (mut overlays, world) = resumed();
    overlays.add_lifecycle_listener(Rc::new(Tracker(world.clone())));
    overlays
        .show_window(TestWindow::new("a", &world).boxed())
        .unwrap();
    overlays.advance(ms(250));

    overlays.dispatch_lifecycle(LifecycleEvent::Paused);
    assert_eq!(overlays.host_state(), HostState::Paused);
    let w = world.borrow();
    let listener = w.position("listener.Paused").unwrap();
    let content = w.position("content.Paused").unwrap();
    let window = w.position("a.Paused").unwrap();
    assert!(listener < content);
    assert!(content < window);
}

#[test]
fn removed_listener_is_silent() {
    let (mut overlays, world) = resumed();
    let id = overlays.add_lifecycle_listener(Rc::new(Tracker(world.clone())));
    assert!(overlays.remove_lifecycle_listener(id));
    overlays.dispatch_lifecycle(LifecycleEvent::Paused);
    assert!(!world.borrow().logged("listener.Paused"));
}

#[test]
fn destroy_tears_down_top_first() {
    let (mut overlays, world) = resumed();
    for name in ["a", "b"] {
        overlays
            .show_window(TestWindow::new(name, &world).boxed())
            .unwrap();
        overlays.advance(ms(250));
    }
    let pip = overlays
        .show_window(TestWindow::new("pip", &world).boxed())
        .unwrap();
    overlays.advance(ms(250));
    overlays.forget_window(pip);

    overlays.dispatch_lifecycle(LifecycleEvent::Destroyed);
    assert_eq!(overlays.host_state(), HostState::Destroyed);
    assert!(overlays.windows().is_empty());
    assert_eq!(overlays.windows().forgotten_len(), 0);

    let w = world.borrow();
    assert!(w.position("b.Destroyed") < w.position("a.Destroyed"));
    assert!(w.position("a.Destroyed") < w.position("pip.Destroyed"));
    assert!(w.position("b.teardown") < w.position("a.teardown"));
    assert!(w.logged("pip.teardown"));
}

#[test]
fn destroy_cancels_deferred_work() {
    let (mut overlays, world) = resumed();
    world.borrow_mut().keyboard_visible = true;
    overlays.open_camera(CameraOptions::default());
    overlays.show_progress_delayed("Later", false, ms(50));
    overlays.dispatch_lifecycle(LifecycleEvent::Destroyed);
    overlays.advance(ms(500));
    assert!(!overlays.is_camera_open());
    assert!(!overlays.is_progress_showing());
}

#[test]
fn orientation_change_is_tracked() {
    let (mut overlays, _world) = resumed();
    overlays.dispatch_lifecycle(LifecycleEvent::OrientationChanged(Orientation::Landscape));
    assert_eq!(overlays.orientation(), Orientation::Landscape);
    assert_eq!(overlays.host_state(), HostState::Resumed);
}

#[test]
fn failed_decor_is_retried() {
    let (mut overlays, world) = resumed();
    world.borrow_mut().fail_decor = true;
    overlays.add_fullscreen_surface(ControllerId::new(1), true);
    assert!(!world.borrow().last_decor().fullscreen);

    world.borrow_mut().fail_decor = false;
    overlays.check_screenshots();
    assert!(world.borrow().last_decor().fullscreen);
}

#[test]
fn unchanged_decor_is_not_reapplied() {
    let (mut overlays, world) = resumed();
    let applied = world.borrow().decor.len();
    overlays.advance(ms(16));
    overlays.check_screenshots();
    assert_eq!(world.borrow().decor.len(), applied);
}

#[test]
fn keep_awake_reasons_fold_into_one_bit() {
    let (mut overlays, world) = resumed();
    overlays.set_keep_awake_flag(KeepAwakeFlags::RECORDING, true);
    overlays.set_keep_awake_flag(KeepAwakeFlags::PLAYING_REGULAR_VIDEO, true);
    assert!(world.borrow().last_decor().keep_awake);
    overlays.set_keep_awake_flag(KeepAwakeFlags::RECORDING, false);
    assert!(world.borrow().last_decor().keep_awake);
    overlays.set_keep_awake_flag(KeepAwakeFlags::PLAYING_REGULAR_VIDEO, false);
    assert!(!world.borrow().last_decor().keep_awake);
}

#[test]
fn no_fullscreen_surface_vetoes() {
    let (mut overlays, _world) = resumed();
    overlays.add_fullscreen_surface(ControllerId::new(1), true);
    assert!(overlays.is_fullscreen_active());
    overlays.add_fullscreen_surface(ControllerId::new(2), false);
    assert!(!overlays.is_fullscreen_active());
    overlays.remove_fullscreen_surface(ControllerId::new(2), false);
    assert!(overlays.is_fullscreen_active());
}

#[test]
fn progress_blocks_back_and_windows() {
    let (mut overlays, world) = resumed();
    overlays.show_progress("Saving", true);
    assert!(world.borrow().root.contains(&PROGRESS));
    assert_eq!(world.borrow().progress_message, "Saving");
    assert!(overlays.is_animating());
    assert!(overlays
        .show_window(TestWindow::new("late", &world).boxed())
        .is_none());

    assert!(overlays.on_back_pressed(false));
    assert!(world.borrow().logged("progress.close"));
    assert!(!overlays.is_progress_showing());
    overlays.advance(ms(220));
    assert_eq!(world.borrow().root, vec![CONTENT]);
}

#[test]
fn uncancellable_progress_swallows_back() {
    let (mut overlays, world) = resumed();
    overlays.show_progress("Working", false);
    assert!(overlays.on_back_pressed(false));
    assert!(overlays.is_progress_showing());
    assert!(!world.borrow().logged("content.back"));
}

#[test]
fn delayed_progress_can_be_called_off() {
    let (mut overlays, _world) = resumed();
    overlays.show_progress_delayed("Slow", false, ms(500));
    overlays.advance(ms(499));
    assert!(!overlays.is_progress_showing());
    overlays.hide_progress(false);
    overlays.advance(ms(100));
    assert!(!overlays.is_progress_showing());

    overlays.show_progress_delayed("Slow", false, ms(500));
    overlays.advance(ms(500));
    assert!(overlays.is_progress_showing());
}

#[test]
fn idle_back_press_reaches_content() {
    let (mut overlays, world) = resumed();
    world.borrow_mut().content_consumes_back = true;
    assert!(overlays.on_back_pressed(true));
    assert!(world.borrow().logged("content.back"));
}

#[test]
fn invalid_config_is_refused() {
    let world = Shared::default();
    let config = OverlayConfig::default().with_camera_drop_threshold(1.5);
    let err = Orchestrator::new(platform(&world), config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "camera_drop_threshold",
            ..
        }
    ));
}

#[test]
fn pump_turns_wall_clock_into_steps() {
    let (mut overlays, _world) = resumed();
    let start = web_time::Instant::now();
    assert!(overlays.open_camera(CameraOptions::default()));
    overlays.pump(start);
    assert_eq!(overlays.camera_factor(), 0.0);
    overlays.pump(start + ms(300));
    assert_eq!(overlays.camera_factor(), 1.0);
}
