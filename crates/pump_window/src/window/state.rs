//! State the pump thread publishes to every other thread
//!
//! Geometry and cursor position are independent atomic slots: a reader may
//! see a width from one resize and a height from the next. The key-press set
//! is guarded by a mutex for the whole of every update and every copy, so a
//! focus-loss reset never interleaves with a snapshot.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::input::KeyStates;
use crate::platform::WindowEvent;

use super::lifecycle::Lifecycle;

/// Side effect the pump thread must carry out after an event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reaction {
    None,
    /// The owner is tearing down and this close request won the destroy latch
    DestroyWindow,
    /// The native window is gone: forget it and stop pumping
    DetachAndQuit,
}

#[derive(Debug)]
pub(crate) struct WindowShared {
    width: AtomicU32,
    height: AtomicU32,
    cursor_x: AtomicI32,
    cursor_y: AtomicI32,
    last_x: AtomicI32,
    last_y: AtomicI32,
    keys: Mutex<KeyStates>,
    lifecycle: Lifecycle,
}

impl WindowShared {
    pub(crate) const fn new() -> Self {
        Self {
            width: AtomicU32::new(0),
            height: AtomicU32::new(0),
            cursor_x: AtomicI32::new(0),
            cursor_y: AtomicI32::new(0),
            last_x: AtomicI32::new(0),
            last_y: AtomicI32::new(0),
            keys: Mutex::new(KeyStates::new()),
            lifecycle: Lifecycle::new(),
        }
    }

    pub(crate) const fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn keys(&self) -> MutexGuard<'_, KeyStates> {
        // A plain bitset cannot be left half-updated by a panic.
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one event; called on the pump thread only
    pub(crate) fn apply(&self, event: WindowEvent) -> Reaction {
        match event {
            WindowEvent::CursorMoved { x, y } => {
                self.cursor_x.store(x, Ordering::Release);
                self.cursor_y.store(y, Ordering::Release);
            }
            WindowEvent::KeyDown(code) => self.keys().set(code),
            WindowEvent::KeyUp(code) => self.keys().clear(code),
            WindowEvent::Resized { width, height } => {
                self.width.store(width, Ordering::Release);
                self.height.store(height, Ordering::Release);
            }
            WindowEvent::FocusLost => self.keys().clear_all(),
            WindowEvent::CloseRequested => {
                if self.lifecycle.request_close() {
                    log::debug!("Close requested");
                }
                if self.lifecycle.is_tearing_down() && self.lifecycle.try_begin_destroy() {
                    return Reaction::DestroyWindow;
                }
            }
            WindowEvent::Destroyed => {
                self.lifecycle.mark_destroyed();
                return Reaction::DetachAndQuit;
            }
        }
        Reaction::None
    }

    pub(crate) fn width(&self) -> u32 {
        self.width.load(Ordering::Acquire)
    }

    pub(crate) fn height(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }

    pub(crate) fn cursor_position(&self) -> (i32, i32) {
        (self.cursor_x.load(Ordering::Acquire), self.cursor_y.load(Ordering::Acquire))
    }

    /// Consuming x delta against the built-in last-seen position
    pub(crate) fn take_x_delta(&self) -> i32 {
        let x = self.cursor_x.load(Ordering::Acquire);
        x - self.last_x.swap(x, Ordering::AcqRel)
    }

    /// Consuming y delta against the built-in last-seen position
    pub(crate) fn take_y_delta(&self) -> i32 {
        let y = self.cursor_y.load(Ordering::Acquire);
        y - self.last_y.swap(y, Ordering::AcqRel)
    }

    pub(crate) fn key_states(&self) -> KeyStates {
        *self.keys()
    }
}
