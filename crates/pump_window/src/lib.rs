//! # Pump Window
//!
//! A single native window whose event pump runs on a dedicated thread, with
//! the window's live input state published to any number of other threads.
//!
//! ## Features
//!
//! - **Dedicated Pump Thread**: The window is created, owned and pumped by one
//!   background thread; callers never touch the native event loop
//! - **Handshake Construction**: [`Window::open`] returns only once the window
//!   exists and is visible, or creation has definitively failed
//! - **Snapshot Reads**: Geometry and cursor position live in atomics, the
//!   key-press set behind a mutex, so reads never observe a half-applied event
//! - **Idempotent Teardown**: Any mix of user closes, window-manager destroys
//!   and owner drops destroys the native window exactly once
//! - **Rendering Context**: Double-buffered hardware drawing surface bound to
//!   the window, released in the right order on drop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pump_window::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     pump_window::logging::init();
//!
//!     let window = Window::new("Demo", 800, 600)?;
//!     let mut renderer = window.renderer()?;
//!
//!     while window.running() {
//!         if window.is_key_down(Key::Escape) {
//!             window.close();
//!         }
//!         let (dx, dy) = (window.retrieve_x_delta(), window.retrieve_y_delta());
//!         log::trace!("cursor moved by ({dx}, {dy})");
//!         renderer.show_frame()?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod input;
pub mod logging;
pub mod platform;
pub mod render;
pub mod window;

pub use config::{Config, ConfigError, DisplayConfig, WindowConfig};
pub use input::{Key, KeyStates};
pub use platform::{NativePlatform, Platform, PlatformError};
pub use render::{PixelFormat, RenderError, Renderer, RenderingContext};
pub use window::{CursorTracker, LifecycleState, Window, WindowError};

/// Common imports for window users
pub mod prelude {
    pub use crate::{
        config::{Config, DisplayConfig, WindowConfig},
        input::{Key, KeyStates},
        platform::{headless::HeadlessPlatform, NativePlatform, Platform},
        render::{PixelFormat, Renderer, RenderingContext},
        window::{CursorTracker, Window, WindowError},
    };
}
