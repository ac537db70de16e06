//! Output tracking
//!
//! Follows the bound wl_output: its current mode, scale and name. Values
//! arrive as a batch and only become current once the compositor sends
//! `done`.

use crate::shell::configure::Size;

/// An output mode (resolution + refresh rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Refresh rate in mHz (e.g., 60000 for 60Hz)
    pub refresh: u32,
}

/// Values received since the last `done`
#[derive(Debug, Default)]
struct PendingOutput {
    mode: Option<OutputMode>,
    scale: Option<i32>,
    name: Option<String>,
}

/// State of the output this session bound
#[derive(Debug)]
pub struct OutputInfo {
    /// Output name (e.g., "eDP-1")
    pub name: Option<String>,
    /// Current mode
    pub mode: Option<OutputMode>,
    /// Integer scale factor
    pub scale: i32,
    pending: PendingOutput,
}

impl OutputInfo {
    pub fn new() -> Self {
        Self {
            name: None,
            mode: None,
            scale: 1,
            pending: PendingOutput::default(),
        }
    }

    /// Record a mode; only the compositor's current mode is kept
    pub fn set_mode(&mut self, width: i32, height: i32, refresh: i32, current: bool) {
        if !current || width <= 0 || height <= 0 {
            return;
        }
        self.pending.mode = Some(OutputMode {
            width: width as u32,
            height: height as u32,
            refresh: refresh.max(0) as u32,
        });
    }

    pub fn set_scale(&mut self, factor: i32) {
        self.pending.scale = Some(factor.max(1));
    }

    pub fn set_name(&mut self, name: String) {
        self.pending.name = Some(name);
    }

    /// Apply the pending batch
    pub fn done(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(mode) = pending.mode {
            self.mode = Some(mode);
        }
        if let Some(scale) = pending.scale {
            self.scale = scale;
        }
        if let Some(name) = pending.name {
            self.name = Some(name);
        }
    }

    /// Current mode size, if the output reported one
    pub fn size(&self) -> Option<Size> {
        self.mode.map(|mode| Size::new(mode.width, mode.height))
    }

    /// Refresh rate in Hz
    pub fn refresh_hz(&self) -> Option<f64> {
        self.mode
            .filter(|mode| mode.refresh > 0)
            .map(|mode| mode.refresh as f64 / 1000.0)
    }
}

impl Default for OutputInfo {
    fn default() -> Self {
        Self::new()
    }
}
