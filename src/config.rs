//! Display configuration
//!
//! Everything the backend reads from its host. The only environment input is
//! the background toggle, resolved once when the display initializes.

use std::env;
use std::path::PathBuf;

/// Environment variable whose presence selects the wallpaper layer
pub const BACKGROUND_ENV: &str = "WAYGLASS_BACKGROUND";

/// How the background (wallpaper) mode is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundMode {
    /// Read [`BACKGROUND_ENV`] during initialization
    #[default]
    FromEnv,
    /// Always render as a background layer
    Enabled,
    /// Always render as a normal window
    Disabled,
}

impl BackgroundMode {
    /// Resolve to a concrete answer
    pub fn resolve(self) -> bool {
        match self {
            BackgroundMode::FromEnv => env::var_os(BACKGROUND_ENV).is_some(),
            BackgroundMode::Enabled => true,
            BackgroundMode::Disabled => false,
        }
    }
}

/// Display backend configuration
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Initial window title
    pub title: String,
    /// Application identifier reported to the compositor
    pub app_id: String,
    /// Explicit compositor socket; `None` uses `WAYLAND_DISPLAY`
    pub socket: Option<PathBuf>,
    /// Background mode selection
    pub background: BackgroundMode,
}

impl DisplayConfig {
    pub fn new() -> Self {
        Self {
            title: "wayglass".to_string(),
            app_id: "org.wayglass.Display".to_string(),
            socket: None,
            background: BackgroundMode::FromEnv,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn with_socket(mut self, socket: impl Into<PathBuf>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    pub fn with_background(mut self, background: BackgroundMode) -> Self {
        self.background = background;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}
