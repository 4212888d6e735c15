//! Graphics-driver seam
//!
//! Wraps the driver calls a [`RenderingContext`](super::RenderingContext)
//! needs: obtain a drawing surface for a window, negotiate its pixel format,
//! create/bind/delete a hardware context and swap buffers.

use crate::platform::PlatformError;

use super::PixelFormat;

/// Native graphics driver
///
/// Implementations are cheap handles (`Clone`) so each rendering context can
/// keep its own copy for teardown.
pub trait GraphicsDriver: Clone {
    /// Window handle type surfaces are acquired for
    type Window: Copy;
    /// Drawing-surface handle
    type Surface;
    /// Hardware rendering-context handle
    type Context;

    /// Obtain the drawing surface of `window`
    fn acquire_surface(&self, window: Self::Window) -> Result<Self::Surface, PlatformError>;

    /// Choose and set a pixel format matching `format` on `surface`
    fn apply_format(&self, surface: &Self::Surface, format: &PixelFormat) -> Result<(), PlatformError>;

    /// Create a rendering context on `surface`
    fn create_context(&self, surface: &Self::Surface) -> Result<Self::Context, PlatformError>;

    /// Bind a context to the calling thread, or unbind with `None`
    fn make_current(&self, binding: Option<(&Self::Surface, &Self::Context)>) -> Result<(), PlatformError>;

    /// Delete a context that is no longer current anywhere
    ///
    /// The handle is dead afterwards and must not be passed to the driver again.
    fn delete_context(&self, context: &Self::Context);

    /// Give the drawing surface back to the window
    ///
    /// The handle is dead afterwards and must not be passed to the driver again.
    fn release_surface(&self, surface: &Self::Surface);

    /// Present the back buffer of `surface`
    fn swap_buffers(&self, surface: &Self::Surface) -> Result<(), PlatformError>;
}
