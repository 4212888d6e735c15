//! Native Win32 windows with a WGL rendering context
//!
//! The window procedure is a plain `extern "system"` function, so it reaches
//! the pump thread's [`EventSink`] through a thread-local installed by
//! [`Platform::install_sink`]. Every message it translates goes to the sink;
//! everything else, and everything the sink declines, goes to
//! `DefWindowProcW`.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::mem::size_of;
use std::num::NonZeroU32;
use std::ptr;
use std::sync::Arc;

use winapi::ctypes::c_int;
use winapi::shared::minwindef::{FALSE, LPARAM, LRESULT, TRUE, UINT, WPARAM};
use winapi::shared::windef::{HDC, HGLRC, HWND};
use winapi::shared::winerror::{ERROR_CLASS_ALREADY_EXISTS, ERROR_INVALID_WINDOW_HANDLE};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::GetModuleHandleW;
use winapi::um::wingdi::{
    wglCreateContext, wglDeleteContext, wglMakeCurrent, ChoosePixelFormat, SetPixelFormat, SwapBuffers,
    PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA,
    PIXELFORMATDESCRIPTOR,
};
use winapi::um::winuser::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetDC, GetMessageW, PostMessageW,
    PostQuitMessage, RegisterClassExW, ReleaseDC, SetWindowTextW, ShowCursor, ShowWindow, TranslateMessage,
    CS_HREDRAW, CS_OWNDC, CS_VREDRAW, CW_USEDEFAULT, MSG, SW_SHOWDEFAULT, WM_CLOSE, WM_DESTROY, WM_KEYDOWN,
    WM_KEYUP, WM_KILLFOCUS, WM_MOUSEMOVE, WM_SIZE, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
};

use crate::render::{GraphicsDriver, PixelFormat};

use super::{ClassRegistration, Dispatch, EventSink, Platform, PlatformError, RequestedSize, WindowEvent};

thread_local! {
    static SINK: RefCell<Option<Arc<dyn EventSink<Hwnd>>>> = const { RefCell::new(None) };
}

/// A Win32 window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hwnd(isize);

impl Hwnd {
    fn from_raw(hwnd: HWND) -> Self {
        Self(hwnd as isize)
    }

    fn as_raw(self) -> HWND {
        self.0 as HWND
    }
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error() -> u32 {
    // SAFETY: reads thread-local error state only.
    unsafe { GetLastError() }
}

fn os_error(operation: &'static str) -> PlatformError {
    match last_error() {
        ERROR_INVALID_WINDOW_HANDLE => PlatformError::WindowGone,
        code => PlatformError::Os { operation, code },
    }
}

const fn low_word(lparam: LPARAM) -> u16 {
    (lparam as usize & 0xFFFF) as u16
}

const fn high_word(lparam: LPARAM) -> u16 {
    ((lparam as usize >> 16) & 0xFFFF) as u16
}

/// Translate the messages the window lifecycle cares about
fn translate(msg: UINT, wparam: WPARAM, lparam: LPARAM) -> Option<WindowEvent> {
    match msg {
        // Client coordinates are signed: they go negative while the mouse is captured.
        WM_MOUSEMOVE => Some(WindowEvent::CursorMoved {
            x: i32::from(low_word(lparam) as i16),
            y: i32::from(high_word(lparam) as i16),
        }),
        WM_KEYDOWN => u8::try_from(wparam).ok().map(WindowEvent::KeyDown),
        WM_KEYUP => u8::try_from(wparam).ok().map(WindowEvent::KeyUp),
        WM_SIZE => Some(WindowEvent::Resized {
            width: u32::from(low_word(lparam)),
            height: u32::from(high_word(lparam)),
        }),
        WM_KILLFOCUS => Some(WindowEvent::FocusLost),
        WM_CLOSE => Some(WindowEvent::CloseRequested),
        WM_DESTROY => Some(WindowEvent::Destroyed),
        _ => None,
    }
}

unsafe extern "system" fn window_proc(hwnd: HWND, msg: UINT, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if let Some(event) = translate(msg, wparam, lparam) {
        // Clone out of the cell: dispatch may re-enter this procedure.
        let sink = SINK.with(|sink| sink.borrow().clone());
        if let Some(sink) = sink {
            if sink.dispatch(Hwnd::from_raw(hwnd), event) == Dispatch::Handled {
                return 0;
            }
        }
    }
    // SAFETY: forwarding the arguments Windows passed to this procedure.
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

fn module_handle() -> winapi::shared::minwindef::HINSTANCE {
    // SAFETY: a null name asks for the handle of the running executable.
    unsafe { GetModuleHandleW(ptr::null()) }
}

fn dimension(value: Option<NonZeroU32>) -> c_int {
    value.map_or(CW_USEDEFAULT, |v| c_int::try_from(v.get()).unwrap_or(c_int::MAX))
}

/// The Win32 window manager
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Platform;

impl Platform for Win32Platform {
    type Handle = Hwnd;
    type Graphics = WglDriver;

    fn install_sink(&self, sink: Arc<dyn EventSink<Hwnd>>) {
        SINK.with(|slot| *slot.borrow_mut() = Some(sink));
    }

    fn register_class(&self, class_name: &str) -> Result<ClassRegistration, PlatformError> {
        let class_name = wide(class_name);
        let class = WNDCLASSEXW {
            cbSize: size_of::<WNDCLASSEXW>() as UINT,
            style: CS_OWNDC | CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(window_proc),
            hInstance: module_handle(),
            lpszClassName: class_name.as_ptr(),
            ..WNDCLASSEXW::default()
        };

        // SAFETY: `class` and the name it points to outlive the call; Windows copies both.
        if unsafe { RegisterClassExW(&class) } != 0 {
            return Ok(ClassRegistration::Registered);
        }
        match last_error() {
            ERROR_CLASS_ALREADY_EXISTS => Ok(ClassRegistration::AlreadyRegistered),
            code => Err(PlatformError::Os { operation: "RegisterClassExW", code }),
        }
    }

    fn create_window(&self, class_name: &str, title: &str, size: RequestedSize) -> Result<Hwnd, PlatformError> {
        let class_name = wide(class_name);
        let title = wide(title);

        // SAFETY: both strings are NUL-terminated and live across the call.
        let hwnd = unsafe {
            CreateWindowExW(
                0,
                class_name.as_ptr(),
                title.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                dimension(size.width),
                dimension(size.height),
                ptr::null_mut(),
                ptr::null_mut(),
                module_handle(),
                ptr::null_mut(),
            )
        };
        if hwnd.is_null() {
            Err(os_error("CreateWindowExW"))
        } else {
            Ok(Hwnd::from_raw(hwnd))
        }
    }

    fn show_window(&self, window: Hwnd) {
        // SAFETY: the return value is the previous visibility, not an error.
        unsafe { ShowWindow(window.as_raw(), SW_SHOWDEFAULT) };
    }

    fn set_cursor_visible(&self, visible: bool) {
        // SAFETY: adjusts this thread's cursor display counter only.
        unsafe { ShowCursor(if visible { TRUE } else { FALSE }) };
    }

    fn pump_events(&self) {
        let mut msg = MSG::default();
        loop {
            // SAFETY: `msg` is a valid out-parameter for the whole loop.
            let status = unsafe { GetMessageW(&mut msg, ptr::null_mut(), 0, 0) };
            if status == 0 {
                break;
            }
            if status < 0 {
                log::error!("GetMessageW failed with OS error {}", last_error());
                break;
            }
            // SAFETY: `msg` was just filled in by GetMessageW.
            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn post_close(&self, window: Hwnd) -> Result<(), PlatformError> {
        // SAFETY: posting to a stale handle fails cleanly with ERROR_INVALID_WINDOW_HANDLE.
        if unsafe { PostMessageW(window.as_raw(), WM_CLOSE, 0, 0) } == 0 {
            Err(os_error("PostMessageW"))
        } else {
            Ok(())
        }
    }

    fn destroy_window(&self, window: Hwnd) -> Result<(), PlatformError> {
        // SAFETY: called on the thread that created the window.
        if unsafe { DestroyWindow(window.as_raw()) } == 0 {
            Err(os_error("DestroyWindow"))
        } else {
            Ok(())
        }
    }

    fn post_quit(&self) {
        // SAFETY: posts WM_QUIT to the calling thread's queue.
        unsafe { PostQuitMessage(0) };
    }

    fn set_title(&self, window: Hwnd, title: &str) -> Result<(), PlatformError> {
        let title = wide(title);
        // SAFETY: `title` is NUL-terminated and outlives the call.
        if unsafe { SetWindowTextW(window.as_raw(), title.as_ptr()) } == 0 {
            Err(os_error("SetWindowTextW"))
        } else {
            Ok(())
        }
    }

    fn graphics(&self) -> WglDriver {
        WglDriver
    }
}

/// Device context of a window
#[derive(Debug)]
pub struct DeviceContext {
    window: Hwnd,
    hdc: isize,
}

impl DeviceContext {
    fn as_raw(&self) -> HDC {
        self.hdc as HDC
    }
}

/// A WGL rendering context
#[derive(Debug)]
pub struct GlContext(isize);

impl GlContext {
    fn as_raw(&self) -> HGLRC {
        self.0 as HGLRC
    }
}

/// The WGL graphics driver
#[derive(Debug, Clone, Copy, Default)]
pub struct WglDriver;

impl GraphicsDriver for WglDriver {
    type Window = Hwnd;
    type Surface = DeviceContext;
    type Context = GlContext;

    fn acquire_surface(&self, window: Hwnd) -> Result<DeviceContext, PlatformError> {
        // SAFETY: a stale handle makes GetDC return null.
        let hdc = unsafe { GetDC(window.as_raw()) };
        if hdc.is_null() {
            Err(os_error("GetDC"))
        } else {
            Ok(DeviceContext { window, hdc: hdc as isize })
        }
    }

    fn apply_format(&self, surface: &DeviceContext, format: &PixelFormat) -> Result<(), PlatformError> {
        let buffering = if format.double_buffered { PFD_DOUBLEBUFFER } else { 0 };
        let descriptor = PIXELFORMATDESCRIPTOR {
            nSize: size_of::<PIXELFORMATDESCRIPTOR>() as u16,
            nVersion: 1,
            dwFlags: PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL | buffering,
            iPixelType: PFD_TYPE_RGBA,
            cColorBits: format.color_bits,
            cDepthBits: format.depth_bits,
            iLayerType: PFD_MAIN_PLANE,
            ..PIXELFORMATDESCRIPTOR::default()
        };

        // SAFETY: `descriptor` lives across both calls and the DC is owned by `surface`.
        let index = unsafe { ChoosePixelFormat(surface.as_raw(), &descriptor) };
        if index == 0 {
            return Err(os_error("ChoosePixelFormat"));
        }
        // SAFETY: as above; `index` came from ChoosePixelFormat on the same DC.
        if unsafe { SetPixelFormat(surface.as_raw(), index, &descriptor) } == 0 {
            return Err(os_error("SetPixelFormat"));
        }
        Ok(())
    }

    fn create_context(&self, surface: &DeviceContext) -> Result<GlContext, PlatformError> {
        // SAFETY: the DC has a pixel format set.
        let hglrc = unsafe { wglCreateContext(surface.as_raw()) };
        if hglrc.is_null() {
            Err(os_error("wglCreateContext"))
        } else {
            Ok(GlContext(hglrc as isize))
        }
    }

    fn make_current(&self, binding: Option<(&DeviceContext, &GlContext)>) -> Result<(), PlatformError> {
        let (hdc, hglrc) = binding.map_or((ptr::null_mut(), ptr::null_mut()), |(surface, context)| {
            (surface.as_raw(), context.as_raw())
        });
        // SAFETY: null/null unbinds; otherwise both handles are live.
        if unsafe { wglMakeCurrent(hdc, hglrc) } == 0 {
            Err(os_error("wglMakeCurrent"))
        } else {
            Ok(())
        }
    }

    fn delete_context(&self, context: &GlContext) {
        // SAFETY: the context is no longer current on this thread.
        if unsafe { wglDeleteContext(context.as_raw()) } == 0 {
            log::warn!("wglDeleteContext failed with OS error {}", last_error());
        }
    }

    fn release_surface(&self, surface: &DeviceContext) {
        // SAFETY: releases the DC obtained from GetDC for the same window.
        unsafe { ReleaseDC(surface.window.as_raw(), surface.as_raw()) };
    }

    fn swap_buffers(&self, surface: &DeviceContext) -> Result<(), PlatformError> {
        // SAFETY: the DC is live for as long as `surface`.
        if unsafe { SwapBuffers(surface.as_raw()) } == 0 {
            Err(os_error("SwapBuffers"))
        } else {
            Ok(())
        }
    }
}
