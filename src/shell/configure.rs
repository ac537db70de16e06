//! Configure/ack bookkeeping
//!
//! Tracks the surface size negotiated with the compositor and the readiness
//! flag that gates the first present.

use log::{debug, trace};

/// A surface size in surface-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Both dimensions as protocol integers, `None` if either exceeds `i32::MAX`
    pub fn to_i32(&self) -> Option<(i32, i32)> {
        Some((i32::try_from(self.width).ok()?, i32::try_from(self.height).ok()?))
    }

    /// Build from a configure pair; zero in either dimension yields `None`
    pub fn from_configure(width: i32, height: i32) -> Option<Self> {
        if width > 0 && height > 0 {
            Some(Self::new(width as u32, height as u32))
        } else {
            None
        }
    }
}

/// Configure state of the presented surface
#[derive(Debug)]
pub struct ConfigureTracker {
    /// Effective size
    size: Size,
    /// Size from a top-level configure, applied on the next surface configure
    pending: Option<Size>,
    /// Size change not yet applied to the drawable
    resized: Option<Size>,
    /// At least one surface configure has been acknowledged
    acked: bool,
    configured: bool,
}

impl ConfigureTracker {
    /// Start from the size requested by the application
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pending: None,
            resized: None,
            acked: false,
            configured: false,
        }
    }

    /// Top-level configure; zero means the compositor leaves sizing to us
    pub fn toplevel_configure(&mut self, width: i32, height: i32) {
        match Size::from_configure(width, height) {
            Some(size) => self.pending = Some(size),
            None => trace!("Ignoring deferred toplevel size {}x{}", width, height),
        }
    }

    /// Surface configure, sent after the role-specific configure and acked
    pub fn surface_configure(&mut self) -> bool {
        if let Some(size) = self.pending.take() {
            self.apply(size);
        }
        self.acked = true;
        self.update_configured()
    }

    /// Layer-surface configure, carrying size and serial in one event
    pub fn layer_configure(&mut self, width: u32, height: u32) -> bool {
        let size = Size::new(width, height);
        if size.is_valid() {
            self.apply(size);
        } else {
            trace!("Ignoring deferred layer size {}x{}", width, height);
        }
        self.acked = true;
        self.update_configured()
    }

    /// Decoration-frame configure with its content size
    pub fn frame_configure(&mut self, width: u32, height: u32) -> bool {
        self.layer_configure(width, height)
    }

    /// Returns true the first time readiness is reached
    fn update_configured(&mut self) -> bool {
        let was = self.configured;
        self.configured = self.acked && self.size.is_valid();
        if self.configured && !was {
            debug!("Surface configured at {}x{}", self.size.width, self.size.height);
        }
        self.configured && !was
    }

    fn apply(&mut self, size: Size) {
        if size != self.size {
            debug!(
                "Surface resized {}x{} -> {}x{}",
                self.size.width, self.size.height, size.width, size.height
            );
            self.size = size;
            self.resized = Some(size);
        }
    }

    /// Whether presents may happen
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Current effective size
    pub fn size(&self) -> Size {
        self.size
    }

    /// Take a size change that still has to reach the drawable
    pub fn take_resize(&mut self) -> Option<Size> {
        self.resized.take()
    }
}
