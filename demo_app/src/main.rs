//! Pump window demo
//!
//! Opens a window on its own pump thread, binds a rendering context on the
//! main thread and presents frames until Escape is pressed or the window is
//! closed. Cursor movement and held keys are logged as they change.
//!
//! Usage: `pump_demo [display.toml|display.ron] [max-frames]`

use std::sync::Arc;
use std::time::{Duration, Instant};

use pump_window::prelude::*;
use pump_window::{ConfigError, RenderError};
use thiserror::Error;

/// Frame pacing when the driver does not block on present
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Error, Debug)]
enum DemoError {
    #[error("Failed to load display configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open window: {0}")]
    Window(#[from] WindowError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid frame limit '{0}'")]
    FrameLimit(String),
}

struct DemoApp<'w> {
    renderer: RenderingContext<'w, <NativePlatform as Platform>::Graphics>,
    window: &'w Window,
    held: KeyStates,
    frames: u64,
    max_frames: Option<u64>,
}

impl<'w> DemoApp<'w> {
    fn new(window: &'w Window, format: &PixelFormat, max_frames: Option<u64>) -> Result<Self, DemoError> {
        log::info!("Creating rendering context ({format})...");
        let renderer = window.renderer_with(format)?;

        Ok(Self { renderer, window, held: KeyStates::new(), frames: 0, max_frames })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        let started = Instant::now();

        while self.window.running() {
            if self.window.is_key_down(Key::Escape) {
                log::info!("Escape pressed, closing");
                self.window.close();
                break;
            }

            self.report_input();
            self.renderer.show_frame()?;
            self.frames += 1;

            if self.max_frames.is_some_and(|max| self.frames >= max) {
                log::info!("Frame limit reached");
                break;
            }
            std::thread::sleep(FRAME_INTERVAL);
        }

        let elapsed = started.elapsed().as_secs_f64();
        log::info!("Presented {} frames in {elapsed:.2}s", self.frames);
        Ok(())
    }

    fn report_input(&mut self) {
        let (dx, dy) = (self.window.retrieve_x_delta(), self.window.retrieve_y_delta());
        if dx != 0 || dy != 0 {
            log::debug!("Cursor moved by ({dx}, {dy})");
        }

        let held = self.window.key_states();
        if held != self.held {
            let names: Vec<_> = held.pressed_keys().map(Key::name).collect();
            log::info!("Held keys: [{}]", names.join(", "));
            self.held = held;
        }
    }
}

fn parse_args() -> Result<(DisplayConfig, Option<u64>), DemoError> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => DisplayConfig::load_or_default(path)?,
        None => DisplayConfig::default(),
    };
    let max_frames = args
        .next()
        .map(|limit| limit.parse().map_err(|_| DemoError::FrameLimit(limit)))
        .transpose()?;

    Ok((config, max_frames))
}

fn open_and_run(config: DisplayConfig, max_frames: Option<u64>) -> Result<(), DemoError> {
    log::info!("Opening '{}'...", config.window.title);
    let window = Window::open(Arc::new(NativePlatform::default()), config.window)?;
    log::info!("Window is {}x{}", window.width(), window.height());

    let mut app = DemoApp::new(&window, &config.pixel_format, max_frames)?;
    app.run()
}

fn main() {
    pump_window::logging::init();

    let result = parse_args().and_then(|(config, max_frames)| open_and_run(config, max_frames));
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
