//! Window lifecycle state machine
//!
//! ```text
//!   Live ──close request──▶ ClosePending
//!    │                          │
//!    └──────try_begin_destroy───┴──▶ Destroying ──notification──▶ Destroyed
//! ```
//!
//! Transitions only move forward, so `running()` is monotonic. The teardown
//! flag is independent of the state: the owner raises it before posting its
//! own close request, and the close handler only destroys the native window
//! once it is raised. [`Lifecycle::try_begin_destroy`] is the one-shot latch
//! that keeps every other close request from destroying the window again.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Where a window is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    /// Created and running
    Live = 0,
    /// Close requested; the native window is still alive
    ClosePending = 1,
    /// Native destruction has been started
    Destroying = 2,
    /// The native window is gone, or was never created
    Destroyed = 3,
}

impl LifecycleState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Live,
            1 => Self::ClosePending,
            2 => Self::Destroying,
            _ => Self::Destroyed,
        }
    }
}

/// Lifecycle flags shared between the owner and the pump thread
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
    teardown: AtomicBool,
}

impl Lifecycle {
    pub(crate) const fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Live as u8),
            teardown: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        LifecycleState::from_raw(self.state.load(Ordering::SeqCst))
    }

    /// True until a close request has been processed
    pub(crate) fn is_running(&self) -> bool {
        self.state() == LifecycleState::Live
    }

    /// Live → ClosePending; returns whether this call made the transition
    pub(crate) fn request_close(&self) -> bool {
        self.state
            .compare_exchange(
                LifecycleState::Live as u8,
                LifecycleState::ClosePending as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Mark that the owner is tearing the window down
    pub(crate) fn begin_teardown(&self) {
        self.teardown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_tearing_down(&self) -> bool {
        self.teardown.load(Ordering::SeqCst)
    }

    /// One-shot latch: true for exactly one caller, from Live or ClosePending
    pub(crate) fn try_begin_destroy(&self) -> bool {
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                match LifecycleState::from_raw(raw) {
                    LifecycleState::Live | LifecycleState::ClosePending => {
                        Some(LifecycleState::Destroying as u8)
                    }
                    LifecycleState::Destroying | LifecycleState::Destroyed => None,
                }
            })
            .is_ok()
    }

    /// Terminal state; returns the state it replaced
    pub(crate) fn mark_destroyed(&self) -> LifecycleState {
        LifecycleState::from_raw(self.state.swap(LifecycleState::Destroyed as u8, Ordering::SeqCst))
    }
}
