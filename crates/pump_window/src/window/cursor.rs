//! Per-consumer cursor deltas
//!
//! [`Window::retrieve_x_delta`] and [`Window::retrieve_y_delta`] share one
//! last-seen position stored on the window, so they serve exactly one
//! consumer. Every additional consumer takes its own [`CursorTracker`].

use crate::platform::Platform;

use super::Window;

/// Last-seen cursor position of one delta consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorTracker {
    last_x: i32,
    last_y: i32,
}

impl CursorTracker {
    /// A tracker whose last-seen position is `(x, y)`
    pub const fn at(x: i32, y: i32) -> Self {
        Self { last_x: x, last_y: y }
    }

    /// Horizontal movement since this tracker last looked
    pub fn x_delta<P: Platform>(&mut self, window: &Window<P>) -> i32 {
        let (x, _) = window.cursor_position();
        let delta = x - self.last_x;
        self.last_x = x;
        delta
    }

    /// Vertical movement since this tracker last looked
    pub fn y_delta<P: Platform>(&mut self, window: &Window<P>) -> i32 {
        let (_, y) = window.cursor_position();
        let delta = y - self.last_y;
        self.last_y = y;
        delta
    }

    /// Movement on both axes from a single position snapshot
    pub fn delta<P: Platform>(&mut self, window: &Window<P>) -> (i32, i32) {
        let (x, y) = window.cursor_position();
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        delta
    }
}
