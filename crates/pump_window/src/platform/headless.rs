//! In-memory window manager
//!
//! [`HeadlessPlatform`] behaves like a native window manager without putting
//! anything on screen: windows are records, each pump thread owns a FIFO
//! message queue, and the notifications a real window manager sends
//! synchronously (resize on show, destroy notification on destroy) are
//! delivered synchronously here too.
//!
//! It is the native platform on non-Windows targets and the test platform
//! everywhere. Tests drive it through [`HeadlessPlatform::send_event`] and
//! inspect it through the query methods; failures can be injected for class
//! registration, window creation and every graphics-driver stage.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::render::{GraphicsDriver, PixelFormat};

use super::{ClassRegistration, Dispatch, EventSink, Platform, PlatformError, RequestedSize, WindowEvent};

/// Width chosen when creation asks for the platform default
pub const DEFAULT_WIDTH: u32 = 1024;
/// Height chosen when creation asks for the platform default
pub const DEFAULT_HEIGHT: u32 = 768;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identifier of a headless window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlessWindow(u64);

impl HeadlessWindow {
    /// Wrap a raw identifier
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

enum Message {
    Event(HeadlessWindow, WindowEvent),
    Quit,
}

struct PumpState {
    sink: Arc<dyn EventSink<HeadlessWindow>>,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

thread_local! {
    static PUMP: RefCell<Option<Rc<PumpState>>> = const { RefCell::new(None) };
}

fn current_pump() -> Option<Rc<PumpState>> {
    PUMP.with(|pump| pump.borrow().clone())
}

struct WindowRecord {
    title: String,
    requested: RequestedSize,
    size: (u32, u32),
    visible: bool,
    destroyed: bool,
    destroy_calls: usize,
    queue: Sender<Message>,
}

#[derive(Default)]
struct Faults {
    registration: bool,
    creation: bool,
}

struct Inner {
    classes: Mutex<HashSet<String>>,
    registrations: AtomicUsize,
    windows: Mutex<HashMap<HeadlessWindow, WindowRecord>>,
    next_id: AtomicU64,
    cursor_visible: AtomicBool,
    faults: Mutex<Faults>,
    graphics: HeadlessGraphics,
}

/// In-memory window manager
///
/// Cloning yields another handle to the same window manager.
#[derive(Clone)]
pub struct HeadlessPlatform {
    inner: Arc<Inner>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// A window manager with no classes and no windows
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                classes: Mutex::new(HashSet::new()),
                registrations: AtomicUsize::new(0),
                windows: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                cursor_visible: AtomicBool::new(true),
                faults: Mutex::new(Faults::default()),
                graphics: HeadlessGraphics::default(),
            }),
        }
    }

    /// Make every following class registration fail
    pub fn fail_registration(&self, fail: bool) {
        lock(&self.inner.faults).registration = fail;
    }

    /// Make every following window creation fail
    pub fn fail_creation(&self, fail: bool) {
        lock(&self.inner.faults).creation = fail;
    }

    /// Queue `event` for `window`, as the window manager would
    ///
    /// Safe from any thread; the event is dispatched on the window's pump
    /// thread in queue order.
    pub fn send_event(&self, window: HeadlessWindow, event: WindowEvent) -> Result<(), PlatformError> {
        let windows = lock(&self.inner.windows);
        let record = windows
            .get(&window)
            .filter(|record| !record.destroyed)
            .ok_or(PlatformError::WindowGone)?;
        record
            .queue
            .send(Message::Event(window, event))
            .map_err(|_| PlatformError::WindowGone)
    }

    /// Whether `class_name` has been registered
    pub fn is_class_registered(&self, class_name: &str) -> bool {
        lock(&self.inner.classes).contains(class_name)
    }

    /// Number of registrations that actually created a class
    pub fn registration_count(&self) -> usize {
        self.inner.registrations.load(Ordering::SeqCst)
    }

    /// Current title of `window`
    pub fn window_title(&self, window: HeadlessWindow) -> Option<String> {
        lock(&self.inner.windows).get(&window).map(|record| record.title.clone())
    }

    /// Size `window` was requested with
    pub fn requested_size(&self, window: HeadlessWindow) -> Option<RequestedSize> {
        lock(&self.inner.windows).get(&window).map(|record| record.requested)
    }

    /// Client size `window` was created with
    pub fn client_size(&self, window: HeadlessWindow) -> Option<(u32, u32)> {
        lock(&self.inner.windows).get(&window).map(|record| record.size)
    }

    /// Whether `window` is shown
    pub fn is_visible(&self, window: HeadlessWindow) -> bool {
        lock(&self.inner.windows).get(&window).is_some_and(|record| record.visible)
    }

    /// Whether `window` has been destroyed
    pub fn is_destroyed(&self, window: HeadlessWindow) -> bool {
        lock(&self.inner.windows).get(&window).is_some_and(|record| record.destroyed)
    }

    /// How many times destruction of `window` was attempted
    pub fn destroy_calls(&self, window: HeadlessWindow) -> usize {
        lock(&self.inner.windows).get(&window).map_or(0, |record| record.destroy_calls)
    }

    /// Number of windows not yet destroyed
    pub fn live_windows(&self) -> usize {
        lock(&self.inner.windows).values().filter(|record| !record.destroyed).count()
    }

    /// Whether the system cursor is shown
    pub fn cursor_visible(&self) -> bool {
        self.inner.cursor_visible.load(Ordering::SeqCst)
    }

    fn deliver(&self, pump: &PumpState, window: HeadlessWindow, event: WindowEvent) {
        log::trace!("Headless dispatch {window:?}: {event:?}");
        if pump.sink.dispatch(window, event) == Dispatch::Default {
            self.default_handling(window, event);
        }
    }

    fn default_handling(&self, window: HeadlessWindow, event: WindowEvent) {
        if event == WindowEvent::CloseRequested {
            if let Err(e) = self.destroy_window(window) {
                log::debug!("Default close handling for {window:?}: {e}");
            }
        }
    }
}

impl Platform for HeadlessPlatform {
    type Handle = HeadlessWindow;
    type Graphics = HeadlessGraphics;

    fn install_sink(&self, sink: Arc<dyn EventSink<HeadlessWindow>>) {
        let (sender, receiver) = mpsc::channel();
        PUMP.with(|pump| {
            *pump.borrow_mut() = Some(Rc::new(PumpState { sink, sender, receiver }));
        });
    }

    fn register_class(&self, class_name: &str) -> Result<ClassRegistration, PlatformError> {
        if lock(&self.inner.faults).registration {
            return Err(PlatformError::Injected("class registration"));
        }
        if lock(&self.inner.classes).insert(class_name.to_string()) {
            self.inner.registrations.fetch_add(1, Ordering::SeqCst);
            Ok(ClassRegistration::Registered)
        } else {
            Ok(ClassRegistration::AlreadyRegistered)
        }
    }

    fn create_window(
        &self,
        class_name: &str,
        title: &str,
        size: RequestedSize,
    ) -> Result<HeadlessWindow, PlatformError> {
        if lock(&self.inner.faults).creation {
            return Err(PlatformError::Injected("window creation"));
        }
        if !self.is_class_registered(class_name) {
            return Err(PlatformError::Os { operation: "create_window", code: 1407 });
        }
        let pump = current_pump().ok_or(PlatformError::NoEventLoop)?;

        let window = HeadlessWindow(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        lock(&self.inner.windows).insert(
            window,
            WindowRecord {
                title: title.to_string(),
                requested: size,
                size: size.resolve(DEFAULT_WIDTH, DEFAULT_HEIGHT),
                visible: false,
                destroyed: false,
                destroy_calls: 0,
                queue: pump.sender.clone(),
            },
        );
        Ok(window)
    }

    fn show_window(&self, window: HeadlessWindow) {
        let size = {
            let mut windows = lock(&self.inner.windows);
            match windows.get_mut(&window) {
                Some(record) if !record.destroyed => {
                    record.visible = true;
                    record.size
                }
                _ => return,
            }
        };
        if let Some(pump) = current_pump() {
            self.deliver(&pump, window, WindowEvent::Resized { width: size.0, height: size.1 });
        }
    }

    fn set_cursor_visible(&self, visible: bool) {
        self.inner.cursor_visible.store(visible, Ordering::SeqCst);
    }

    fn pump_events(&self) {
        let Some(pump) = current_pump() else {
            log::warn!("pump_events called on a thread without an event sink");
            return;
        };
        while let Ok(message) = pump.receiver.recv() {
            match message {
                // Destroying a window discards whatever was still queued for it.
                Message::Event(window, event) if self.is_destroyed(window) => {
                    log::trace!("Dropping {event:?} queued for destroyed window {window:?}");
                }
                Message::Event(window, event) => self.deliver(&pump, window, event),
                Message::Quit => break,
            }
        }
    }

    fn post_close(&self, window: HeadlessWindow) -> Result<(), PlatformError> {
        self.send_event(window, WindowEvent::CloseRequested)
    }

    fn destroy_window(&self, window: HeadlessWindow) -> Result<(), PlatformError> {
        {
            let mut windows = lock(&self.inner.windows);
            let record = windows.get_mut(&window).ok_or(PlatformError::WindowGone)?;
            record.destroy_calls += 1;
            if record.destroyed {
                return Err(PlatformError::WindowGone);
            }
            record.destroyed = true;
            record.visible = false;
        }
        log::debug!("Headless window {window:?} destroyed");
        if let Some(pump) = current_pump() {
            self.deliver(&pump, window, WindowEvent::Destroyed);
        }
        Ok(())
    }

    fn post_quit(&self) {
        if let Some(pump) = current_pump() {
            // The receiver lives in the same state, so this cannot fail.
            let _ = pump.sender.send(Message::Quit);
        }
    }

    fn set_title(&self, window: HeadlessWindow, title: &str) -> Result<(), PlatformError> {
        let mut windows = lock(&self.inner.windows);
        let record = windows
            .get_mut(&window)
            .filter(|record| !record.destroyed)
            .ok_or(PlatformError::WindowGone)?;
        record.title = title.to_string();
        Ok(())
    }

    fn graphics(&self) -> HeadlessGraphics {
        self.inner.graphics.clone()
    }
}

/// Driver stage a [`HeadlessGraphics`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsStage {
    /// Surface acquisition
    Surface,
    /// Pixel format negotiation
    Format,
    /// Context creation
    Context,
    /// Binding a context to a thread
    MakeCurrent,
    /// Buffer swap
    Swap,
}

/// A call observed by [`HeadlessGraphics`], in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsCall {
    /// Surface acquired, by surface id
    AcquireSurface(u64),
    /// Format applied
    ApplyFormat(PixelFormat),
    /// Context created, by context id
    CreateContext(u64),
    /// Context bound (`Some`) or thread unbound (`None`)
    MakeCurrent(Option<u64>),
    /// Context deleted
    DeleteContext(u64),
    /// Surface released
    ReleaseSurface(u64),
    /// Buffers swapped
    SwapBuffers(u64),
}

/// Drawing surface of a headless window
#[derive(Debug)]
pub struct HeadlessSurface {
    id: u64,
    window: HeadlessWindow,
}

impl HeadlessSurface {
    /// Window the surface belongs to
    pub const fn window(&self) -> HeadlessWindow {
        self.window
    }
}

/// Headless rendering context
#[derive(Debug)]
pub struct HeadlessContext {
    id: u64,
}

#[derive(Default)]
struct GraphicsInner {
    next_id: AtomicU64,
    live_surfaces: AtomicUsize,
    live_contexts: AtomicUsize,
    contexts_deleted: AtomicUsize,
    swaps: AtomicUsize,
    failure: Mutex<Option<GraphicsStage>>,
    current: Mutex<HashMap<ThreadId, u64>>,
    calls: Mutex<Vec<GraphicsCall>>,
}

/// Graphics driver of the headless platform
///
/// Tracks live surfaces and contexts, which context is current on which
/// thread, and the order of every driver call.
#[derive(Clone, Default)]
pub struct HeadlessGraphics {
    inner: Arc<GraphicsInner>,
}

impl HeadlessGraphics {
    /// Fail the given stage from now on, or stop failing with `None`
    pub fn fail_at(&self, stage: Option<GraphicsStage>) {
        *lock(&self.inner.failure) = stage;
    }

    /// Surfaces acquired and not yet released
    pub fn live_surfaces(&self) -> usize {
        self.inner.live_surfaces.load(Ordering::SeqCst)
    }

    /// Contexts created and not yet deleted
    pub fn live_contexts(&self) -> usize {
        self.inner.live_contexts.load(Ordering::SeqCst)
    }

    /// Contexts deleted so far
    pub fn contexts_deleted(&self) -> usize {
        self.inner.contexts_deleted.load(Ordering::SeqCst)
    }

    /// Buffer swaps so far
    pub fn swap_count(&self) -> usize {
        self.inner.swaps.load(Ordering::SeqCst)
    }

    /// Context current on the calling thread
    pub fn current_context(&self) -> Option<u64> {
        lock(&self.inner.current).get(&thread::current().id()).copied()
    }

    /// Format most recently applied
    pub fn last_format(&self) -> Option<PixelFormat> {
        lock(&self.inner.calls).iter().rev().find_map(|call| match call {
            GraphicsCall::ApplyFormat(format) => Some(*format),
            _ => None,
        })
    }

    /// Every call observed so far
    pub fn calls(&self) -> Vec<GraphicsCall> {
        lock(&self.inner.calls).clone()
    }

    /// Forget the observed calls
    pub fn clear_calls(&self) {
        lock(&self.inner.calls).clear();
    }

    fn check(&self, stage: GraphicsStage, what: &'static str) -> Result<(), PlatformError> {
        if *lock(&self.inner.failure) == Some(stage) {
            Err(PlatformError::Injected(what))
        } else {
            Ok(())
        }
    }

    fn record(&self, call: GraphicsCall) {
        lock(&self.inner.calls).push(call);
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl GraphicsDriver for HeadlessGraphics {
    type Window = HeadlessWindow;
    type Surface = HeadlessSurface;
    type Context = HeadlessContext;

    fn acquire_surface(&self, window: HeadlessWindow) -> Result<HeadlessSurface, PlatformError> {
        self.check(GraphicsStage::Surface, "surface")?;
        let id = self.next_id();
        self.inner.live_surfaces.fetch_add(1, Ordering::SeqCst);
        self.record(GraphicsCall::AcquireSurface(id));
        Ok(HeadlessSurface { id, window })
    }

    fn apply_format(&self, _surface: &HeadlessSurface, format: &PixelFormat) -> Result<(), PlatformError> {
        self.check(GraphicsStage::Format, "pixel format")?;
        self.record(GraphicsCall::ApplyFormat(*format));
        Ok(())
    }

    fn create_context(&self, _surface: &HeadlessSurface) -> Result<HeadlessContext, PlatformError> {
        self.check(GraphicsStage::Context, "context")?;
        let id = self.next_id();
        self.inner.live_contexts.fetch_add(1, Ordering::SeqCst);
        self.record(GraphicsCall::CreateContext(id));
        Ok(HeadlessContext { id })
    }

    fn make_current(&self, binding: Option<(&HeadlessSurface, &HeadlessContext)>) -> Result<(), PlatformError> {
        let context = binding.map(|(_, context)| context.id);
        if context.is_some() {
            self.check(GraphicsStage::MakeCurrent, "make current")?;
        }
        let mut current = lock(&self.inner.current);
        match context {
            Some(id) => current.insert(thread::current().id(), id),
            None => current.remove(&thread::current().id()),
        };
        drop(current);
        self.record(GraphicsCall::MakeCurrent(context));
        Ok(())
    }

    fn delete_context(&self, context: &HeadlessContext) {
        self.inner.live_contexts.fetch_sub(1, Ordering::SeqCst);
        self.inner.contexts_deleted.fetch_add(1, Ordering::SeqCst);
        self.record(GraphicsCall::DeleteContext(context.id));
    }

    fn release_surface(&self, surface: &HeadlessSurface) {
        self.inner.live_surfaces.fetch_sub(1, Ordering::SeqCst);
        self.record(GraphicsCall::ReleaseSurface(surface.id));
    }

    fn swap_buffers(&self, surface: &HeadlessSurface) -> Result<(), PlatformError> {
        self.check(GraphicsStage::Swap, "swap buffers")?;
        self.inner.swaps.fetch_add(1, Ordering::SeqCst);
        self.record(GraphicsCall::SwapBuffers(surface.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        events: Mutex<Vec<(HeadlessWindow, WindowEvent)>>,
        answer: Dispatch,
    }

    impl EventSink<HeadlessWindow> for Recorder {
        fn dispatch(&self, window: HeadlessWindow, event: WindowEvent) -> Dispatch {
            lock(&self.events).push((window, event));
            self.answer
        }
    }

    fn recorder(answer: Dispatch) -> Arc<Recorder> {
        Arc::new(Recorder { events: Mutex::new(Vec::new()), answer })
    }

    #[test]
    fn test_registration_is_idempotent() {
        let platform = HeadlessPlatform::new();
        assert_eq!(platform.register_class("demo"), Ok(ClassRegistration::Registered));
        assert_eq!(platform.register_class("demo"), Ok(ClassRegistration::AlreadyRegistered));
        assert_eq!(platform.registration_count(), 1);
    }

    #[test]
    fn test_create_requires_event_loop() {
        let platform = HeadlessPlatform::new();
        platform.register_class("demo").unwrap();
        let result = thread::spawn(move || platform.create_window("demo", "t", RequestedSize::default()))
            .join()
            .unwrap();
        assert_eq!(result, Err(PlatformError::NoEventLoop));
    }

    #[test]
    fn test_show_delivers_resize_with_default_size() {
        let platform = HeadlessPlatform::new();
        let sink = recorder(Dispatch::Handled);
        platform.install_sink(sink.clone());
        platform.register_class("demo").unwrap();
        let window = platform.create_window("demo", "t", RequestedSize::from_dimensions(0, 0)).unwrap();
        platform.show_window(window);

        assert!(platform.is_visible(window));
        assert_eq!(
            lock(&sink.events).as_slice(),
            &[(window, WindowEvent::Resized { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT })]
        );
    }

    #[test]
    fn test_unhandled_close_destroys_window() {
        let platform = HeadlessPlatform::new();
        let sink = recorder(Dispatch::Default);
        platform.install_sink(sink.clone());
        platform.register_class("demo").unwrap();
        let window = platform.create_window("demo", "t", RequestedSize::default()).unwrap();

        platform.post_close(window).unwrap();
        platform.post_quit();
        platform.pump_events();

        assert!(platform.is_destroyed(window));
        assert_eq!(platform.destroy_calls(window), 1);
        assert_eq!(
            lock(&sink.events).as_slice(),
            &[(window, WindowEvent::CloseRequested), (window, WindowEvent::Destroyed)]
        );
        assert_eq!(platform.post_close(window), Err(PlatformError::WindowGone));
    }

    #[test]
    fn test_destroy_discards_queued_events() {
        let platform = HeadlessPlatform::new();
        let sink = recorder(Dispatch::Default);
        platform.install_sink(sink.clone());
        platform.register_class("demo").unwrap();
        let window = platform.create_window("demo", "t", RequestedSize::default()).unwrap();

        for _ in 0..3 {
            platform.post_close(window).unwrap();
        }
        platform.send_event(window, WindowEvent::KeyDown(0x41)).unwrap();
        platform.post_quit();
        platform.pump_events();

        assert_eq!(platform.destroy_calls(window), 1);
        assert_eq!(
            lock(&sink.events).as_slice(),
            &[(window, WindowEvent::CloseRequested), (window, WindowEvent::Destroyed)]
        );
    }

    #[test]
    fn test_second_destroy_is_rejected_but_counted() {
        let platform = HeadlessPlatform::new();
        platform.install_sink(recorder(Dispatch::Handled));
        platform.register_class("demo").unwrap();
        let window = platform.create_window("demo", "t", RequestedSize::default()).unwrap();

        assert_eq!(platform.destroy_window(window), Ok(()));
        assert_eq!(platform.destroy_window(window), Err(PlatformError::WindowGone));
        assert_eq!(platform.destroy_calls(window), 2);
    }

    #[test]
    fn test_graphics_tracks_current_context_per_thread() {
        let graphics = HeadlessGraphics::default();
        let surface = graphics.acquire_surface(HeadlessWindow::from_raw(1)).unwrap();
        let context = graphics.create_context(&surface).unwrap();
        graphics.make_current(Some((&surface, &context))).unwrap();
        assert_eq!(graphics.current_context(), Some(context.id));

        let other = graphics.clone();
        let seen = thread::spawn(move || other.current_context()).join().unwrap();
        assert_eq!(seen, None);

        graphics.make_current(None).unwrap();
        graphics.delete_context(&context);
        graphics.release_surface(&surface);
        assert_eq!(graphics.live_contexts(), 0);
        assert_eq!(graphics.live_surfaces(), 0);
    }
}
