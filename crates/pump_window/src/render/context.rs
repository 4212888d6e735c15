//! Hardware rendering context
//!
//! A [`RenderingContext`] owns a drawing surface and a rendering context on
//! it, acquired together in [`RenderingContext::new`] and released together on
//! drop: the context is unbound and deleted first, then the surface is given
//! back.
//!
//! # Lifetime
//!
//! The surface belongs to a window, so a context obtained through
//! [`Window::renderer`](crate::Window::renderer) borrows that window and
//! cannot outlive it:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use pump_window::prelude::*;
//!
//! let platform = Arc::new(HeadlessPlatform::new());
//! let window = Window::open(platform, WindowConfig::new("demo", 320, 200)).unwrap();
//! let renderer = window.renderer().unwrap();
//! drop(window);
//! drop(renderer);
//! ```
//!
//! # Thread affinity
//!
//! The context is made current on the thread that creates it and stays there:
//! the type is `!Send`, so [`show_frame`](Renderer::show_frame) always runs on
//! the owning thread. Only one context may be current per thread; creating a
//! second one on the same thread rebinds the thread to the newer context.

use std::marker::PhantomData;

use super::{GraphicsDriver, PixelFormat, RenderError, RenderResult, Renderer};

/// Double-buffered hardware drawing surface bound to a window
///
/// `'w` is the borrow of the window the surface was acquired from.
pub struct RenderingContext<'w, G: GraphicsDriver> {
    driver: G,
    surface: G::Surface,
    context: G::Context,
    _window: PhantomData<(&'w (), *const ())>,
}

impl<'w, G: GraphicsDriver> RenderingContext<'w, G> {
    /// Create a context for `window` and make it current on this thread
    ///
    /// The caller picks `'w` to cover the window's lifetime. Anything
    /// acquired before a failing step is released before the error is
    /// returned.
    pub fn new(driver: G, window: G::Window, format: &PixelFormat) -> RenderResult<Self> {
        let surface = driver.acquire_surface(window).map_err(RenderError::Surface)?;

        if let Err(source) = driver.apply_format(&surface, format) {
            driver.release_surface(&surface);
            return Err(RenderError::PixelFormat { format: *format, source });
        }

        let context = match driver.create_context(&surface) {
            Ok(context) => context,
            Err(e) => {
                driver.release_surface(&surface);
                return Err(RenderError::ContextCreation(e));
            }
        };

        if let Err(e) = driver.make_current(Some((&surface, &context))) {
            driver.delete_context(&context);
            driver.release_surface(&surface);
            return Err(RenderError::MakeCurrent(e));
        }

        log::debug!("Rendering context created ({format})");
        Ok(Self { driver, surface, context, _window: PhantomData })
    }

    /// Rebind this context to the calling thread
    pub fn make_current(&self) -> RenderResult<()> {
        self.driver
            .make_current(Some((&self.surface, &self.context)))
            .map_err(RenderError::MakeCurrent)
    }
}

impl<G: GraphicsDriver> Renderer for RenderingContext<'_, G> {
    fn show_frame(&mut self) -> RenderResult<()> {
        self.driver.swap_buffers(&self.surface).map_err(RenderError::Present)
    }
}

impl<G: GraphicsDriver> Drop for RenderingContext<'_, G> {
    fn drop(&mut self) {
        if let Err(e) = self.driver.make_current(None) {
            log::warn!("Failed to unbind rendering context: {e}");
        }
        self.driver.delete_context(&self.context);
        self.driver.release_surface(&self.surface);
        log::debug!("Rendering context released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{GraphicsCall, GraphicsStage, HeadlessGraphics, HeadlessWindow};
    use crate::platform::PlatformError;

    fn window() -> HeadlessWindow {
        HeadlessWindow::from_raw(7)
    }

    #[test]
    fn test_create_makes_context_current() {
        let driver = HeadlessGraphics::default();
        let context = RenderingContext::new(driver.clone(), window(), &PixelFormat::default()).unwrap();

        assert_eq!(driver.live_contexts(), 1);
        assert!(driver.current_context().is_some());
        assert_eq!(driver.last_format(), Some(PixelFormat::default()));
        drop(context);
    }

    #[test]
    fn test_show_frame_swaps() {
        let driver = HeadlessGraphics::default();
        let mut context = RenderingContext::new(driver.clone(), window(), &PixelFormat::default()).unwrap();
        context.show_frame().unwrap();
        context.show_frame().unwrap();
        assert_eq!(driver.swap_count(), 2);
    }

    #[test]
    fn test_drop_unbinds_then_deletes_then_releases() {
        let driver = HeadlessGraphics::default();
        let context = RenderingContext::new(driver.clone(), window(), &PixelFormat::default()).unwrap();
        driver.clear_calls();
        drop(context);

        let calls = driver.calls();
        assert!(matches!(
            calls.as_slice(),
            [GraphicsCall::MakeCurrent(None), GraphicsCall::DeleteContext(_), GraphicsCall::ReleaseSurface(_)]
        ));
        assert_eq!(driver.live_contexts(), 0);
        assert_eq!(driver.live_surfaces(), 0);
        assert!(driver.current_context().is_none());
    }

    #[test]
    fn test_make_current_rebinds_after_unbind() {
        let driver = HeadlessGraphics::default();
        let context = RenderingContext::new(driver.clone(), window(), &PixelFormat::default()).unwrap();
        let bound = driver.current_context();

        driver.make_current(None).unwrap();
        assert_eq!(driver.current_context(), None);
        context.make_current().unwrap();
        assert_eq!(driver.current_context(), bound);
    }

    #[test]
    fn test_moved_context_is_released_once() {
        let driver = HeadlessGraphics::default();
        let context = RenderingContext::new(driver.clone(), window(), &PixelFormat::default()).unwrap();
        let mut holder = Vec::new();
        holder.push(context);
        let moved = holder.pop().unwrap();
        drop(moved);

        assert_eq!(driver.contexts_deleted(), 1);
        assert_eq!(driver.live_surfaces(), 0);
    }

    #[test]
    fn test_format_failure_releases_surface() {
        let driver = HeadlessGraphics::default();
        driver.fail_at(Some(GraphicsStage::Format));
        let result = RenderingContext::new(driver.clone(), window(), &PixelFormat::default());

        assert!(matches!(result, Err(RenderError::PixelFormat { .. })));
        assert_eq!(driver.live_surfaces(), 0);
        assert_eq!(driver.live_contexts(), 0);
    }

    #[test]
    fn test_make_current_failure_deletes_context() {
        let driver = HeadlessGraphics::default();
        driver.fail_at(Some(GraphicsStage::MakeCurrent));
        let result = RenderingContext::new(driver.clone(), window(), &PixelFormat::default());

        assert_eq!(
            result.err(),
            Some(RenderError::MakeCurrent(PlatformError::Injected("make current")))
        );
        assert_eq!(driver.live_contexts(), 0);
        assert_eq!(driver.live_surfaces(), 0);
    }

    #[test]
    fn test_present_failure_is_reported() {
        let driver = HeadlessGraphics::default();
        let mut context = RenderingContext::new(driver.clone(), window(), &PixelFormat::default()).unwrap();
        driver.fail_at(Some(GraphicsStage::Swap));
        assert!(matches!(context.show_frame(), Err(RenderError::Present(_))));
    }
}
