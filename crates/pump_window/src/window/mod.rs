//! Window lifecycle and cross-thread state
//!
//! ```text
//!  owner thread(s)                          pump thread
//!  ───────────────                          ───────────
//!  Window::open ──spawn──────────────────▶  register class, create, show
//!       │ (blocks on `built`)               │
//!       ◀───────────── built(Ok | Err) ─────┘
//!  width/height/keys ◀── atomics, mutex ──  apply(event) per dispatched event
//!  close() ──────────── post close ──────▶  CloseRequested
//!  drop: teardown, close(), join  ───────▶  destroy once → Destroyed → quit
//! ```
//!
//! # Module Organization
//!
//! - **`handle`**: [`Window`], the public surface
//! - **`lifecycle`**: `Live → ClosePending → Destroying → Destroyed` with the one-shot destroy latch
//! - **`state`**: Atomics and the key-set mutex the pump thread publishes through
//! - **`registry`** / **`dispatch`**: Routing native events back to their window
//! - **`pump`**: The pump thread body
//! - **`cursor`**: Per-consumer cursor deltas

use std::string::FromUtf16Error;

use thiserror::Error;

use crate::platform::PlatformError;

pub mod cursor;
mod dispatch;
pub mod handle;
mod lifecycle;
mod pump;
mod registry;
mod state;

#[cfg(test)]
mod tests;

pub use cursor::CursorTracker;
pub use handle::Window;
pub use lifecycle::LifecycleState;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The window class could not be registered
    #[error("Window class registration failed: {0}")]
    ClassRegistration(#[source] PlatformError),

    /// The native window could not be created
    #[error("Window creation failed: {0}")]
    Creation(#[source] PlatformError),

    /// A wide title was not valid UTF-16
    #[error("Window title is not valid UTF-16: {0}")]
    InvalidTitle(#[from] FromUtf16Error),

    /// The event-pump thread could not be started
    #[error("Failed to spawn the event-pump thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The event-pump thread ended without reporting whether the window was built
    #[error("Event-pump thread exited before the window was built")]
    PumpThreadExited,

    /// A platform call on a live window failed
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result alias for window operations
pub type WindowResult<T> = Result<T, WindowError>;
