//! Platform window-manager seam
//!
//! The window lifecycle never calls an OS API directly. Everything it needs
//! from the native window manager goes through [`Platform`], and everything
//! the window manager reports comes back through an [`EventSink`] installed
//! on the pump thread.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Window (any thread)          │ close(), set_title(), renderer()
//! └──────────────┬───────────────┘
//!                │ Platform
//!   ┌────────────▼─────────────┐
//!   │ Win32Platform / Headless │ ← native window + message queue
//!   └────────────┬─────────────┘
//!                │ EventSink::dispatch (pump thread only)
//!   ┌────────────▼─────────────┐
//!   │ Dispatcher → Registry    │ ← window/dispatch.rs
//!   └──────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - **`headless`**: In-memory window manager, used on non-Windows targets and in tests
//! - **`win32`**: Native Win32 windows with a WGL rendering context (Windows only)

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroU32;
use std::sync::Arc;

use thiserror::Error;

use crate::render::GraphicsDriver;

pub mod headless;
#[cfg(windows)]
pub mod win32;

/// The platform windows are created on by [`Window::new`](crate::Window::new)
#[cfg(windows)]
pub type NativePlatform = win32::Win32Platform;

/// The platform windows are created on by [`Window::new`](crate::Window::new)
#[cfg(not(windows))]
pub type NativePlatform = headless::HeadlessPlatform;

/// Failures reported by the window manager or graphics driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A native call failed
    #[error("{operation} failed with OS error {code}")]
    Os {
        /// The native call that failed
        operation: &'static str,
        /// OS error code reported for the failure
        code: u32,
    },

    /// The window was already destroyed
    #[error("Window no longer exists")]
    WindowGone,

    /// The call needs an event sink installed on the calling thread
    #[error("No event loop is installed on this thread")]
    NoEventLoop,

    /// Failure injected by a test platform
    #[error("Injected failure: {0}")]
    Injected(&'static str),
}

/// Outcome of registering the window class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRegistration {
    /// This call registered the class
    Registered,
    /// The class existed already; treated as success
    AlreadyRegistered,
}

/// Client-area size requested at creation
///
/// A dimension left as `None` is chosen by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestedSize {
    /// Requested width, or platform default
    pub width: Option<NonZeroU32>,
    /// Requested height, or platform default
    pub height: Option<NonZeroU32>,
}

impl RequestedSize {
    /// Map raw dimensions, treating `0` as "platform default"
    pub const fn from_dimensions(width: u32, height: u32) -> Self {
        Self {
            width: NonZeroU32::new(width),
            height: NonZeroU32::new(height),
        }
    }

    /// Resolve against the platform's default dimensions
    pub fn resolve(self, default_width: u32, default_height: u32) -> (u32, u32) {
        (
            self.width.map_or(default_width, NonZeroU32::get),
            self.height.map_or(default_height, NonZeroU32::get),
        )
    }
}

/// Window-manager notifications the pump thread acts on
///
/// Anything else the platform delivers is never translated and gets the
/// platform's default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Pointer moved to an absolute client position
    CursorMoved {
        /// Client-area x
        x: i32,
        /// Client-area y
        y: i32,
    },
    /// Key pressed, by native virtual-key code
    KeyDown(u8),
    /// Key released, by native virtual-key code
    KeyUp(u8),
    /// Client area resized
    Resized {
        /// New client width
        width: u32,
        /// New client height
        height: u32,
    },
    /// Keyboard focus moved to another window
    FocusLost,
    /// Close requested by the user, the owner or [`Platform::post_close`]
    CloseRequested,
    /// The native window is gone
    Destroyed,
}

/// How the platform should finish an event after the sink saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The sink consumed the event
    Handled,
    /// Apply the platform's default handling
    Default,
}

/// Receiver of window-manager events on the pump thread
pub trait EventSink<H> {
    /// Handle one event for `window`
    ///
    /// Called synchronously on the thread that installed the sink, possibly
    /// re-entrantly (a destroy triggered while handling a close request
    /// delivers [`WindowEvent::Destroyed`] before the outer call returns).
    fn dispatch(&self, window: H, event: WindowEvent) -> Dispatch;
}

/// Native window-manager and event subsystem
///
/// Methods documented as "pump thread only" must be called from the thread
/// that called [`install_sink`](Platform::install_sink); everything else is
/// safe from any thread.
pub trait Platform: Send + Sync + 'static {
    /// Opaque window identifier
    type Handle: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Graphics driver producing rendering surfaces for this platform's windows
    type Graphics: GraphicsDriver<Window = Self::Handle>;

    /// Bind `sink` as the receiver of every event delivered on this thread
    fn install_sink(&self, sink: Arc<dyn EventSink<Self::Handle>>);

    /// Register the window class, idempotently
    fn register_class(&self, class_name: &str) -> Result<ClassRegistration, PlatformError>;

    /// Create a window (pump thread only)
    fn create_window(
        &self,
        class_name: &str,
        title: &str,
        size: RequestedSize,
    ) -> Result<Self::Handle, PlatformError>;

    /// Make the window visible (pump thread only)
    ///
    /// May synchronously deliver [`WindowEvent::Resized`].
    fn show_window(&self, window: Self::Handle);

    /// Show or hide the system cursor
    fn set_cursor_visible(&self, visible: bool);

    /// Retrieve and dispatch events until [`post_quit`](Platform::post_quit) (pump thread only)
    fn pump_events(&self);

    /// Queue a close request on the window's own queue
    fn post_close(&self, window: Self::Handle) -> Result<(), PlatformError>;

    /// Destroy the native window (pump thread only)
    ///
    /// Delivers [`WindowEvent::Destroyed`] before returning.
    fn destroy_window(&self, window: Self::Handle) -> Result<(), PlatformError>;

    /// Make [`pump_events`](Platform::pump_events) return (pump thread only)
    fn post_quit(&self);

    /// Replace the window's title text
    fn set_title(&self, window: Self::Handle, title: &str) -> Result<(), PlatformError>;

    /// Graphics driver for this platform's windows
    fn graphics(&self) -> Self::Graphics;
}
