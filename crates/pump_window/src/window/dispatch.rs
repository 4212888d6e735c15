//! The event sink installed on a window's pump thread

use std::sync::Arc;

use crate::platform::{Dispatch, EventSink, Platform, WindowEvent};

use super::registry::Registry;
use super::state::{Reaction, WindowShared};

/// Routes platform events to window state and carries out the reactions
pub(crate) struct Dispatcher<P: Platform> {
    platform: Arc<P>,
    registry: Registry<P::Handle>,
}

impl<P: Platform> Dispatcher<P> {
    pub(crate) fn new(platform: Arc<P>) -> Self {
        Self { platform, registry: Registry::new() }
    }

    /// Start routing events for `window` to `shared`
    pub(crate) fn attach(&self, window: P::Handle, shared: Arc<WindowShared>) {
        self.registry.insert(window, shared);
    }

    fn detach(&self, window: P::Handle) {
        self.registry.remove(window);
        log::debug!("Window {window:?} detached, stopping event pump");
        self.platform.post_quit();
    }
}

impl<P: Platform> EventSink<P::Handle> for Dispatcher<P> {
    fn dispatch(&self, window: P::Handle, event: WindowEvent) -> Dispatch {
        let Some(shared) = self.registry.get(window) else {
            log::trace!("Unattached window {window:?}: default handling for {event:?}");
            return Dispatch::Default;
        };
        log::trace!("Window {window:?}: {event:?}");

        match shared.apply(event) {
            Reaction::None => {}
            Reaction::DestroyWindow => {
                log::debug!("Destroying window {window:?}");
                if let Err(e) = self.platform.destroy_window(window) {
                    log::error!("Failed to destroy window {window:?}: {e}");
                    shared.lifecycle().mark_destroyed();
                    self.detach(window);
                }
            }
            Reaction::DetachAndQuit => self.detach(window),
        }
        Dispatch::Handled
    }
}
