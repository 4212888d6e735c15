//! Full window lifecycles on the headless platform

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::WindowConfig;
use crate::input::Key;
use crate::platform::headless::{HeadlessPlatform, HeadlessWindow, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::platform::{PlatformError, RequestedSize, WindowEvent};
use crate::render::{PixelFormat, RenderError, Renderer};

use super::{LifecycleState, Window, WindowError};

const FLUSH_CODE: u8 = 0xFF;

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

fn open(platform: &HeadlessPlatform, title: &str, width: u32, height: u32) -> Window<HeadlessPlatform> {
    Window::open(Arc::new(platform.clone()), WindowConfig::new(title, width, height)).unwrap()
}

fn send(platform: &HeadlessPlatform, window: HeadlessWindow, event: WindowEvent) {
    platform.send_event(window, event).unwrap();
}

/// Wait until every event queued so far has been dispatched
fn flush(platform: &HeadlessPlatform, window: &Window<HeadlessPlatform>) {
    send(platform, window.handle(), WindowEvent::KeyDown(FLUSH_CODE));
    assert!(wait_until(|| window.key_states().is_pressed(FLUSH_CODE)));
    send(platform, window.handle(), WindowEvent::KeyUp(FLUSH_CODE));
    assert!(wait_until(|| !window.key_states().is_pressed(FLUSH_CODE)));
}

#[test]
fn test_window_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Window<HeadlessPlatform>>();
}

#[test]
fn test_open_returns_visible_running_window() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 800, 600);

    assert_eq!(window.width(), 800);
    assert_eq!(window.height(), 600);
    assert!(window.running());
    assert_eq!(window.lifecycle_state(), LifecycleState::Live);
    assert!(platform.is_visible(window.handle()));
    assert!(!platform.cursor_visible());
    assert_eq!(platform.window_title(window.handle()).as_deref(), Some("test"));
}

#[test]
fn test_cursor_stays_visible_when_configured() {
    let platform = HeadlessPlatform::new();
    let config = WindowConfig::new("cursor", 320, 200).with_hidden_cursor(false);
    let _window = Window::open(Arc::new(platform.clone()), config).unwrap();
    assert!(platform.cursor_visible());
}

#[test]
fn test_close_then_drop() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 800, 600);
    let handle = window.handle();

    window.close();
    assert!(wait_until(|| !window.running()));
    assert_eq!(window.lifecycle_state(), LifecycleState::ClosePending);
    // A user close leaves the native window alive for the owner.
    assert!(!platform.is_destroyed(handle));
    assert_eq!(window.width(), 800);

    let started = Instant::now();
    drop(window);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(platform.is_destroyed(handle));
    assert_eq!(platform.destroy_calls(handle), 1);
    assert_eq!(platform.live_windows(), 0);
}

#[test]
fn test_drop_without_close_destroys_once() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    let handle = window.handle();
    drop(window);

    assert_eq!(platform.destroy_calls(handle), 1);
    assert!(!platform.is_visible(handle));
}

#[test]
fn test_running_never_returns() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    window.close();
    assert!(wait_until(|| !window.running()));

    send(&platform, window.handle(), WindowEvent::Resized { width: 10, height: 10 });
    flush(&platform, &window);
    assert!(!window.running());
}

#[test]
fn test_concurrent_close_destroys_exactly_once() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    let handle = window.handle();

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..50 {
                    window.close();
                }
            });
        }
    });
    assert!(wait_until(|| !window.running()));

    let started = Instant::now();
    drop(window);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(platform.destroy_calls(handle), 1);
}

#[test]
fn test_close_racing_drop() {
    let platform = HeadlessPlatform::new();
    let window = Arc::new(open(&platform, "test", 640, 480));
    let handle = window.handle();

    let closers: Vec<_> = (0..4)
        .map(|_| {
            let window = Arc::clone(&window);
            thread::spawn(move || {
                for _ in 0..25 {
                    window.close();
                }
            })
        })
        .collect();
    drop(window);
    for closer in closers {
        closer.join().unwrap();
    }

    assert_eq!(platform.destroy_calls(handle), 1);
    assert!(platform.is_destroyed(handle));
}

#[test]
fn test_queued_closes_then_drop_destroy_once() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    let handle = window.handle();

    for _ in 0..50 {
        window.close();
    }
    drop(window);

    assert_eq!(platform.destroy_calls(handle), 1);
    assert!(platform.is_destroyed(handle));
}

#[test]
fn test_last_resize_is_published() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    for (width, height) in [(100, 50), (1280, 720), (300, 900)] {
        send(&platform, window.handle(), WindowEvent::Resized { width, height });
    }
    flush(&platform, &window);

    assert_eq!((window.width(), window.height()), (300, 900));
}

#[test]
fn test_key_set_follows_latest_event_per_key() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    let handle = window.handle();
    send(&platform, handle, WindowEvent::KeyDown(Key::W.code()));
    send(&platform, handle, WindowEvent::KeyDown(Key::A.code()));
    send(&platform, handle, WindowEvent::KeyUp(Key::W.code()));
    send(&platform, handle, WindowEvent::KeyDown(Key::Space.code()));
    flush(&platform, &window);

    let states = window.key_states();
    assert!(!states.is_down(Key::W));
    assert!(states.is_down(Key::A));
    assert!(window.is_key_down(Key::Space));
    assert_eq!(states.count(), 2);
}

#[test]
fn test_focus_loss_clears_every_key() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    let handle = window.handle();
    for key in [Key::Shift, Key::Control, Key::Left, Key::F5] {
        send(&platform, handle, WindowEvent::KeyDown(key.code()));
    }
    flush(&platform, &window);
    assert_eq!(window.key_states().count(), 4);

    send(&platform, handle, WindowEvent::FocusLost);
    flush(&platform, &window);
    assert!(window.key_states().is_empty());
}

#[test]
fn test_cursor_deltas_are_consumed() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    send(&platform, window.handle(), WindowEvent::CursorMoved { x: 30, y: 40 });
    flush(&platform, &window);

    assert_eq!(window.cursor_position(), (30, 40));
    assert_eq!(window.retrieve_x_delta(), 30);
    assert_eq!(window.retrieve_x_delta(), 0);
    assert_eq!(window.retrieve_y_delta(), 40);
    assert_eq!(window.retrieve_y_delta(), 0);

    send(&platform, window.handle(), WindowEvent::CursorMoved { x: 25, y: 50 });
    flush(&platform, &window);
    assert_eq!(window.retrieve_x_delta(), -5);
    assert_eq!(window.retrieve_y_delta(), 10);
}

#[test]
fn test_trackers_are_independent_of_builtin_deltas() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    let mut early = window.cursor_tracker();
    send(&platform, window.handle(), WindowEvent::CursorMoved { x: 10, y: 10 });
    flush(&platform, &window);
    let mut late = window.cursor_tracker();

    assert_eq!(window.retrieve_x_delta(), 10);
    assert_eq!(early.delta(&window), (10, 10));
    assert_eq!(late.delta(&window), (0, 0));

    send(&platform, window.handle(), WindowEvent::CursorMoved { x: 13, y: 8 });
    flush(&platform, &window);
    assert_eq!(early.x_delta(&window), 3);
    assert_eq!(late.x_delta(&window), 3);
    assert_eq!(late.y_delta(&window), -2);
    assert_eq!(window.retrieve_x_delta(), 3);
}

#[test]
fn test_zero_size_requests_platform_default() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 0, 0);

    assert_eq!(platform.requested_size(window.handle()), Some(RequestedSize::default()));
    assert_eq!((window.width(), window.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
}

#[test]
fn test_second_window_reuses_class() {
    let platform = HeadlessPlatform::new();
    let first = open(&platform, "first", 320, 200);
    let second = open(&platform, "second", 320, 200);

    assert!(first.running());
    assert!(second.running());
    assert_ne!(first.handle(), second.handle());
    assert_eq!(platform.registration_count(), 1);
}

#[test]
fn test_creation_failure_is_reported() {
    let platform = HeadlessPlatform::new();
    platform.fail_creation(true);
    let result = Window::open(Arc::new(platform.clone()), WindowConfig::new("test", 640, 480));

    assert!(matches!(
        result,
        Err(WindowError::Creation(PlatformError::Injected(_)))
    ));
    assert_eq!(platform.live_windows(), 0);
}

#[test]
fn test_registration_failure_is_reported() {
    let platform = HeadlessPlatform::new();
    platform.fail_registration(true);
    let result = Window::open(Arc::new(platform.clone()), WindowConfig::new("test", 640, 480));

    assert!(matches!(result, Err(WindowError::ClassRegistration(_))));
}

#[test]
fn test_window_manager_destroy_stops_pump() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "test", 640, 480);
    send(&platform, window.handle(), WindowEvent::Destroyed);

    assert!(wait_until(|| window.lifecycle_state() == LifecycleState::Destroyed));
    assert!(!window.running());
    let started = Instant::now();
    drop(window);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_set_title() {
    let platform = HeadlessPlatform::new();
    let window = open(&platform, "before", 640, 480);
    window.set_title("after").unwrap();
    assert_eq!(platform.window_title(window.handle()).as_deref(), Some("after"));

    let wide: Vec<u16> = "wide title".encode_utf16().collect();
    window.set_title_wide(&wide).unwrap();
    assert_eq!(platform.window_title(window.handle()).as_deref(), Some("wide title"));
    assert!(matches!(window.set_title_wide(&[0xD800]), Err(WindowError::InvalidTitle(_))));
}

#[test]
fn test_invalid_wide_name_is_rejected() {
    let result = Window::new_wide(&[0xDC00, 0x0041], 640, 480);
    assert!(matches!(result, Err(WindowError::InvalidTitle(_))));
}

#[test]
fn test_renderer_lifecycle() {
    let platform = HeadlessPlatform::new();
    let graphics = crate::platform::Platform::graphics(&platform);
    let window = open(&platform, "test", 640, 480);

    let mut renderer = window.renderer().unwrap();
    assert_eq!(graphics.live_contexts(), 1);
    assert!(graphics.current_context().is_some());
    renderer.show_frame().unwrap();
    assert_eq!(graphics.swap_count(), 1);

    drop(renderer);
    assert_eq!(graphics.live_contexts(), 0);
    assert_eq!(graphics.live_surfaces(), 0);
}

#[test]
fn test_renderer_is_released_while_window_lives() {
    use crate::platform::headless::GraphicsCall;

    struct App<'w> {
        renderer: crate::render::RenderingContext<'w, crate::platform::headless::HeadlessGraphics>,
        window: &'w Window<HeadlessPlatform>,
    }

    let platform = HeadlessPlatform::new();
    let graphics = crate::platform::Platform::graphics(&platform);
    let window = open(&platform, "test", 640, 480);
    let handle = window.handle();

    let app = App { renderer: window.renderer().unwrap(), window: &window };
    assert_eq!(app.window.handle(), handle);
    drop(app);

    assert!(!platform.is_destroyed(handle));
    assert_eq!(graphics.live_surfaces(), 0);
    assert!(matches!(graphics.calls().last(), Some(GraphicsCall::ReleaseSurface(_))));

    drop(window);
    assert!(platform.is_destroyed(handle));
}

#[test]
fn test_renderer_with_custom_format() {
    let platform = HeadlessPlatform::new();
    let graphics = crate::platform::Platform::graphics(&platform);
    let window = open(&platform, "test", 640, 480);
    let format = PixelFormat { color_bits: 24, depth_bits: 24, double_buffered: true };

    let _renderer = window.renderer_with(&format).unwrap();
    assert_eq!(graphics.last_format(), Some(format));
}

#[test]
fn test_renderer_failure_is_reported() {
    use crate::platform::headless::GraphicsStage;

    let platform = HeadlessPlatform::new();
    let graphics = crate::platform::Platform::graphics(&platform);
    graphics.fail_at(Some(GraphicsStage::Context));
    let window = open(&platform, "test", 640, 480);

    assert!(matches!(window.renderer(), Err(RenderError::ContextCreation(_))));
    assert_eq!(graphics.live_surfaces(), 0);
}
