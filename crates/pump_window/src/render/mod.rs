//! Rendering surface bound to a window
//!
//! - **`driver`**: The graphics-driver seam ([`GraphicsDriver`])
//! - **`context`**: [`RenderingContext`], one current hardware context plus its drawing surface
//!
//! Only "create surface" and "present frame" live here; drawing itself is the
//! caller's business once the context is current.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::PlatformError;

pub mod context;
pub mod driver;

pub use context::RenderingContext;
pub use driver::GraphicsDriver;

/// Generic renderer abstraction
pub trait Renderer {
    /// Present the back buffer
    fn show_frame(&mut self) -> RenderResult<()>;
}

/// Surface format requested when a rendering context is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelFormat {
    /// Bits per pixel of the RGBA color buffer
    pub color_bits: u8,
    /// Bits of the depth buffer
    pub depth_bits: u8,
    /// Front and back buffer, presented by swapping
    pub double_buffered: bool,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self {
            color_bits: 32,
            depth_bits: 16,
            double_buffered: true,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBA{} depth{} {}",
            self.color_bits,
            self.depth_bits,
            if self.double_buffered { "double-buffered" } else { "single-buffered" }
        )
    }
}

/// Rendering context errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No drawing surface could be obtained for the window
    #[error("Failed to acquire drawing surface: {0}")]
    Surface(PlatformError),

    /// The driver offers no usable pixel format
    #[error("Pixel format {format} unavailable: {source}")]
    PixelFormat {
        /// The format that was requested
        format: PixelFormat,
        /// Driver failure
        source: PlatformError,
    },

    /// The hardware context could not be created
    #[error("Rendering context creation failed: {0}")]
    ContextCreation(PlatformError),

    /// The context could not be made current on this thread
    #[error("Failed to make rendering context current: {0}")]
    MakeCurrent(PlatformError),

    /// Swapping buffers failed
    #[error("Buffer swap failed: {0}")]
    Present(PlatformError),
}

/// Result alias for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
