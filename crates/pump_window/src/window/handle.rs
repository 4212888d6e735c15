//! The public window type
//!
//! [`Window`] is the only thing callers hold. Construction spawns the pump
//! thread and blocks until the window is built or has failed; every accessor
//! reads published state and is safe from any thread; dropping the window
//! tears it down and joins the pump thread.

use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use crate::config::WindowConfig;
use crate::input::{Key, KeyStates};
use crate::platform::{NativePlatform, Platform};
use crate::render::{PixelFormat, RenderResult, RenderingContext};

use super::cursor::CursorTracker;
use super::lifecycle::LifecycleState;
use super::pump;
use super::state::WindowShared;
use super::{WindowError, WindowResult};

/// A native window pumped by its own background thread
///
/// `Window` is `Send + Sync`: share it by reference (or in an `Arc`) with
/// any number of reader threads.
///
/// # Cursor deltas
///
/// [`retrieve_x_delta`](Self::retrieve_x_delta) and
/// [`retrieve_y_delta`](Self::retrieve_y_delta) consume movement against a
/// single last-seen position stored on the window. They serve one logical
/// consumer; concurrent callers split the movement between them. Additional
/// consumers should use [`cursor_tracker`](Self::cursor_tracker).
pub struct Window<P: Platform = NativePlatform> {
    platform: Arc<P>,
    shared: Arc<WindowShared>,
    handle: P::Handle,
    pump: Option<JoinHandle<()>>,
}

impl Window<NativePlatform> {
    /// Create a native window; `0` for a dimension picks the platform default
    ///
    /// Returns once the window is visible, or with the reason it could not be
    /// built.
    pub fn new(name: &str, width: u32, height: u32) -> WindowResult<Self> {
        Self::open(Arc::new(NativePlatform::default()), WindowConfig::new(name, width, height))
    }

    /// Create a native window from a UTF-16 title
    pub fn new_wide(name: &[u16], width: u32, height: u32) -> WindowResult<Self> {
        let name = String::from_utf16(name)?;
        Self::new(&name, width, height)
    }
}

impl<P: Platform> Window<P> {
    /// Create a window on `platform`
    ///
    /// Spawns the pump thread and blocks until it reports the window built or
    /// failed. On failure the pump thread is joined before the error returns.
    pub fn open(platform: Arc<P>, config: WindowConfig) -> WindowResult<Self> {
        let shared = Arc::new(WindowShared::new());
        let (built_tx, built_rx) = mpsc::sync_channel(1);

        let pump = thread::Builder::new()
            .name("window-pump".to_string())
            .spawn({
                let platform = Arc::clone(&platform);
                let shared = Arc::clone(&shared);
                move || pump::run(platform, shared, config, built_tx)
            })
            .map_err(WindowError::Spawn)?;

        let outcome = built_rx.recv().unwrap_or(Err(WindowError::PumpThreadExited));
        match outcome {
            Ok(handle) => {
                log::info!("Window {handle:?} created");
                Ok(Self { platform, shared, handle, pump: Some(pump) })
            }
            Err(e) => {
                if pump.join().is_err() {
                    log::error!("Event-pump thread panicked during construction");
                }
                Err(e)
            }
        }
    }

    /// Native handle of the window
    pub const fn handle(&self) -> P::Handle {
        self.handle
    }

    /// Latest client width; 0 until the first resize
    pub fn width(&self) -> u32 {
        self.shared.width()
    }

    /// Latest client height; 0 until the first resize
    ///
    /// Read independently of [`width`](Self::width): the two may come from
    /// different resize events.
    pub fn height(&self) -> u32 {
        self.shared.height()
    }

    /// Latest absolute cursor position in client coordinates
    pub fn cursor_position(&self) -> (i32, i32) {
        self.shared.cursor_position()
    }

    /// Horizontal cursor movement since the previous call
    pub fn retrieve_x_delta(&self) -> i32 {
        self.shared.take_x_delta()
    }

    /// Vertical cursor movement since the previous call
    pub fn retrieve_y_delta(&self) -> i32 {
        self.shared.take_y_delta()
    }

    /// A delta consumer starting from the current cursor position
    pub fn cursor_tracker(&self) -> CursorTracker {
        let (x, y) = self.cursor_position();
        CursorTracker::at(x, y)
    }

    /// Snapshot of the key-press set
    pub fn key_states(&self) -> KeyStates {
        self.shared.key_states()
    }

    /// Whether `key` is held down right now
    pub fn is_key_down(&self, key: Key) -> bool {
        self.key_states().is_down(key)
    }

    /// True until a close request has been processed; never true again after
    pub fn running(&self) -> bool {
        self.shared.lifecycle().is_running()
    }

    /// Current lifecycle state
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.shared.lifecycle().state()
    }

    /// Ask the window to close
    ///
    /// Returns before the request is processed. Safe from any thread, any
    /// number of times; requests after the window is gone are dropped.
    pub fn close(&self) {
        if let Err(e) = self.platform.post_close(self.handle) {
            log::debug!("Close request for window {:?} dropped: {e}", self.handle);
        }
    }

    /// Replace the title text
    pub fn set_title(&self, title: &str) -> WindowResult<()> {
        Ok(self.platform.set_title(self.handle, title)?)
    }

    /// Replace the title text from UTF-16
    pub fn set_title_wide(&self, title: &[u16]) -> WindowResult<()> {
        self.set_title(&String::from_utf16(title)?)
    }

    /// Create a rendering context with the default pixel format
    ///
    /// The context becomes current on the calling thread and borrows the
    /// window, so it is always released before the window is torn down.
    pub fn renderer(&self) -> RenderResult<RenderingContext<'_, P::Graphics>> {
        self.renderer_with(&PixelFormat::default())
    }

    /// Create a rendering context with `format`
    pub fn renderer_with(&self, format: &PixelFormat) -> RenderResult<RenderingContext<'_, P::Graphics>> {
        RenderingContext::new(self.platform.graphics(), self.handle, format)
    }

    /// The platform the window lives on
    pub fn platform(&self) -> &P {
        &self.platform
    }
}

impl<P: Platform> Drop for Window<P> {
    fn drop(&mut self) {
        self.shared.lifecycle().begin_teardown();
        self.close();
        if let Some(pump) = self.pump.take() {
            if pump.join().is_err() {
                log::error!("Event-pump thread for window {:?} panicked", self.handle);
            }
        }
        log::debug!("Window {:?} torn down", self.handle);
    }
}
