//! Pointer (mouse/trackpad) handling

use log::debug;

/// Maximum gap between two presses that still counts as a double click
pub const DOUBLE_CLICK_MS: u32 = 500;

/// Pointer state
#[derive(Debug)]
pub struct Pointer {
    /// Timestamp of the last press that did not complete a double click
    last_press: Option<u32>,
    /// Double click threshold in milliseconds
    threshold: u32,
}

impl Pointer {
    /// Create a new pointer
    pub fn new() -> Self {
        Self::with_threshold(DOUBLE_CLICK_MS)
    }

    /// Create a pointer with a custom double click threshold
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            last_press: None,
            threshold,
        }
    }

    /// Handle a button press at compositor time `time` (ms)
    ///
    /// Returns true when this press completes a double click.
    pub fn button_press(&mut self, button: u32, time: u32) -> bool {
        debug!("Button pressed: {} at {}", button, time);

        match self.last_press {
            Some(last) if time.wrapping_sub(last) < self.threshold => {
                self.last_press = None;
                true
            }
            _ => {
                self.last_press = Some(time);
                false
            }
        }
    }

    /// Forget the pending click, e.g. when the pointer leaves the surface
    pub fn reset(&mut self) {
        self.last_press = None;
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new()
    }
}
