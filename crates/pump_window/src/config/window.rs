//! Window and display configuration

use serde::{Deserialize, Serialize};

use crate::render::PixelFormat;

use super::Config;

/// Class name windows are registered under unless configured otherwise
pub const DEFAULT_CLASS_NAME: &str = "pump_window";

/// How the pump thread creates the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Requested width; 0 lets the platform choose
    pub width: u32,
    /// Requested height; 0 lets the platform choose
    pub height: u32,
    /// Hide the system cursor once the window is shown
    pub hide_cursor: bool,
    /// Window class the window is registered under
    pub class_name: String,
}

impl WindowConfig {
    /// A configuration with the given title and size
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Set whether the system cursor is hidden over the window
    #[must_use]
    pub fn with_hidden_cursor(mut self, hide: bool) -> Self {
        self.hide_cursor = hide;
        self
    }

    /// Register the window under a custom class name
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Pump Window".to_string(),
            width: 0,
            height: 0,
            hide_cursor: true,
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

impl Config for WindowConfig {}

/// Window plus the surface format its renderer is created with
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window creation settings
    pub window: WindowConfig,
    /// Rendering surface format
    pub pixel_format: PixelFormat,
}

impl Config for DisplayConfig {}
