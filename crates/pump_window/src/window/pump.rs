//! Body of the event-pump thread
//!
//! The pump thread owns the native window outright: it registers the class,
//! creates and shows the window, reports the outcome through the `built`
//! handshake and then pumps events until the destroy notification posts quit.

use std::sync::mpsc::SyncSender;
use std::sync::Arc;

use crate::config::WindowConfig;
use crate::platform::{ClassRegistration, EventSink, Platform, RequestedSize};

use super::dispatch::Dispatcher;
use super::state::WindowShared;
use super::{WindowError, WindowResult};

pub(crate) fn run<P: Platform>(
    platform: Arc<P>,
    shared: Arc<WindowShared>,
    config: WindowConfig,
    built: SyncSender<WindowResult<P::Handle>>,
) {
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&platform)));
    let sink: Arc<dyn EventSink<P::Handle>> = dispatcher.clone();
    platform.install_sink(sink);

    let window = match create(&*platform, &config) {
        Ok(window) => window,
        Err(e) => {
            log::error!("Failed to build window \"{}\": {e}", config.title);
            shared.lifecycle().mark_destroyed();
            // A vanished owner has nothing left to tell.
            let _ = built.send(Err(e));
            return;
        }
    };

    dispatcher.attach(window, Arc::clone(&shared));
    platform.show_window(window);
    if config.hide_cursor {
        platform.set_cursor_visible(false);
    }

    if built.send(Ok(window)).is_err() {
        log::warn!("Window {window:?} built after its owner went away, tearing it down");
        shared.lifecycle().begin_teardown();
        if let Err(e) = platform.post_close(window) {
            log::error!("Failed to close orphaned window {window:?}: {e}");
            return;
        }
    }
    drop(built);

    log::debug!("Window {window:?} built, pumping events");
    platform.pump_events();
    log::debug!("Event pump for window {window:?} exited");
}

fn create<P: Platform>(platform: &P, config: &WindowConfig) -> WindowResult<P::Handle> {
    match platform
        .register_class(&config.class_name)
        .map_err(WindowError::ClassRegistration)?
    {
        ClassRegistration::Registered => log::debug!("Registered window class \"{}\"", config.class_name),
        ClassRegistration::AlreadyRegistered => {
            log::trace!("Window class \"{}\" already registered", config.class_name);
        }
    }

    platform
        .create_window(
            &config.class_name,
            &config.title,
            RequestedSize::from_dimensions(config.width, config.height),
        )
        .map_err(WindowError::Creation)
}
