//! Rendering context module
//!
//! Owns the GPU side of the drawable: display connection, framebuffer
//! configuration, context and on-screen surface. The GPU pipeline that
//! issues draw calls lives outside this crate and only needs the context
//! to be current.

pub mod egl;

pub use egl::{EglContext, FramebufferRequest};

use std::ffi::c_void;

use wayland_client::protocol::wl_surface;

use crate::error::DisplayError;
use crate::shell::configure::Size;

/// A GPU context bound to a compositor surface
///
/// Calls arrive in this order during initialization: `initialize`,
/// `select_config`, `create_context`, `create_drawable`, `make_current`,
/// `set_present_interval`. `release` may come at any point and must only
/// release what was actually acquired.
pub trait RenderContext {
    /// Acquire the GPU display for the compositor connection
    fn initialize(&mut self, display: *mut c_void) -> Result<(), DisplayError>;

    /// Pick the first framebuffer configuration matching `request`
    fn select_config(&mut self, request: &FramebufferRequest) -> Result<(), DisplayError>;

    /// Create a context for the selected configuration
    fn create_context(&mut self) -> Result<(), DisplayError>;

    /// Create the native window handle and the on-screen drawable for `surface`
    fn create_drawable(
        &mut self,
        surface: &wl_surface::WlSurface,
        size: Size,
    ) -> Result<(), DisplayError>;

    /// Bind display, drawable and context on the calling thread
    fn make_current(&mut self) -> Result<(), DisplayError>;

    /// Set how many vblanks a present waits for; 0 never blocks
    fn set_present_interval(&mut self, interval: i32) -> Result<(), DisplayError>;

    /// Swap buffers
    fn present(&mut self) -> Result<(), DisplayError>;

    /// Resize the native window handle
    fn resize(&mut self, size: Size) -> Result<(), DisplayError>;

    /// Release drawable, context and display, then the native window handle
    fn release(&mut self);
}
