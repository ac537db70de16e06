//! Compositor callback interfaces
//!
//! The protocol glue in [`crate::connection::dispatch`] decodes wire events
//! and forwards them through these traits. [`super::DisplayState`] implements
//! all three; tests drive them directly without a compositor.

use std::os::fd::OwnedFd;

use wayland_client::protocol::{wl_keyboard, wl_seat};
use wayland_client::QueueHandle;

use super::DisplayState;
use crate::input::{ModifierState, SeatCapabilities};

/// Session-level events: liveness, output and seat changes
pub trait ConnectionListener {
    /// The window-manager base pinged us; the pong is already sent
    fn ping(&mut self, serial: u32);

    /// A mode of the bound output
    fn output_mode(&mut self, width: i32, height: i32, refresh: i32, current: bool);

    /// Scale factor of the bound output
    fn output_scale(&mut self, factor: i32);

    /// Name of the bound output
    fn output_name(&mut self, name: String);

    /// End of an output property batch
    fn output_done(&mut self);

    /// The seat's capabilities changed
    fn seat_capabilities(
        &mut self,
        seat: &wl_seat::WlSeat,
        capabilities: SeatCapabilities,
        qh: &QueueHandle<DisplayState>,
    );
}

/// Surface role events: configure, decoration feedback and close
pub trait DecorationListener {
    /// Top-level size suggestion; zero means the client decides
    fn toplevel_configure(&mut self, width: i32, height: i32);

    /// The window-manager surface configure was acknowledged
    fn surface_configure(&mut self);

    /// The layer surface was configured and acknowledged
    fn layer_configure(&mut self, width: u32, height: u32);

    /// The client-side decoration frame assigned a content size
    fn frame_configure(&mut self, width: u32, height: u32);

    /// The compositor chose a decoration mode
    fn decoration_mode(&mut self, server_side: bool);

    /// The compositor or the user asked the surface to close
    fn close(&mut self);
}

/// Keyboard and pointer events
pub trait InputListener {
    /// A new keymap descriptor
    fn keymap(&mut self, format: wl_keyboard::KeymapFormat, fd: OwnedFd, size: u32);

    /// A key press or release (evdev keycode)
    fn key(&mut self, keycode: u32, pressed: bool);

    /// New modifier masks
    fn modifiers(&mut self, modifiers: ModifierState);

    /// Key repeat rate (keys/s) and delay (ms)
    fn repeat_info(&mut self, rate: i32, delay: i32);

    /// Keyboard focus left the surface
    fn keyboard_leave(&mut self);

    /// A pointer button changed state; `time` is the compositor timestamp in ms
    fn button(&mut self, button: u32, time: u32, pressed: bool);

    /// Pointer left the surface
    fn pointer_leave(&mut self);
}
