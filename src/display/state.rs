//! Session state mutated by compositor callbacks
//!
//! Everything the protocol glue touches while dispatching lives here, so
//! the event queue can borrow it separately from the display object.

use std::collections::VecDeque;
use std::os::fd::OwnedFd;

use log::{debug, info, trace, warn};
use wayland_client::protocol::{wl_keyboard, wl_pointer, wl_seat};
use wayland_client::{Proxy, QueueHandle};
use xkbcommon::xkb;

use super::listener::{ConnectionListener, DecorationListener, InputListener};
use super::output::OutputInfo;
use crate::connection::Globals;
use crate::input::{DeviceChange, KeyEvent, Keyboard, ModifierState, Pointer, SeatCapabilities, XkbKeymap};
use crate::shell::ConfigureTracker;

/// State shared between the display and its dispatch callbacks
pub struct DisplayState {
    pub(crate) globals: Globals,
    pub(crate) configure: ConfigureTracker,
    output: OutputInfo,
    xkb_context: xkb::Context,
    keyboard: Keyboard,
    pointer: Pointer,
    seat_capabilities: SeatCapabilities,
    wl_keyboard: Option<wl_keyboard::WlKeyboard>,
    wl_pointer: Option<wl_pointer::WlPointer>,
    /// Double click asked for a fullscreen toggle
    fullscreen_toggle: bool,
    closed: bool,
    events: VecDeque<KeyEvent>,
}

impl DisplayState {
    /// Create state for a surface of the requested size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            globals: Globals::new(),
            configure: ConfigureTracker::new(width, height),
            output: OutputInfo::new(),
            xkb_context: xkb::Context::new(xkb::CONTEXT_NO_FLAGS),
            keyboard: Keyboard::new(),
            pointer: Pointer::new(),
            seat_capabilities: SeatCapabilities::default(),
            wl_keyboard: None,
            wl_pointer: None,
            fullscreen_toggle: false,
            closed: false,
            events: VecDeque::new(),
        }
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn is_configured(&self) -> bool {
        self.configure.is_configured()
    }

    pub fn output(&self) -> &OutputInfo {
        &self.output
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn set_closed(&mut self) {
        self.closed = true;
    }

    /// Take a pending fullscreen toggle
    pub(crate) fn take_fullscreen_toggle(&mut self) -> bool {
        std::mem::take(&mut self.fullscreen_toggle)
    }

    pub(crate) fn pop_event(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }

    pub(crate) fn drain_events(&mut self) -> std::collections::vec_deque::Drain<'_, KeyEvent> {
        self.events.drain(..)
    }

    /// Release keyboard and pointer objects
    pub(crate) fn release_devices(&mut self) {
        if let Some(keyboard) = self.wl_keyboard.take() {
            release_keyboard(keyboard);
        }
        if let Some(pointer) = self.wl_pointer.take() {
            release_pointer(pointer);
        }
        self.keyboard.clear_keymap();
        self.pointer.reset();
        self.seat_capabilities = SeatCapabilities::default();
    }
}

fn release_keyboard(keyboard: wl_keyboard::WlKeyboard) {
    if keyboard.version() >= 3 {
        keyboard.release();
    }
    debug!("Released keyboard");
}

fn release_pointer(pointer: wl_pointer::WlPointer) {
    if pointer.version() >= 3 {
        pointer.release();
    }
    debug!("Released pointer");
}

// ============================================================================
// ConnectionListener
// ============================================================================

impl ConnectionListener for DisplayState {
    fn ping(&mut self, serial: u32) {
        trace!("Answered ping {}", serial);
    }

    fn output_mode(&mut self, width: i32, height: i32, refresh: i32, current: bool) {
        self.output.set_mode(width, height, refresh, current);
    }

    fn output_scale(&mut self, factor: i32) {
        self.output.set_scale(factor);
    }

    fn output_name(&mut self, name: String) {
        self.output.set_name(name);
    }

    fn output_done(&mut self) {
        self.output.done();
        if let Some(mode) = self.output.mode {
            debug!(
                "Output {}: {}x{} @ {} mHz, scale {}",
                self.output.name.as_deref().unwrap_or("?"),
                mode.width,
                mode.height,
                mode.refresh,
                self.output.scale
            );
        }
    }

    fn seat_capabilities(
        &mut self,
        seat: &wl_seat::WlSeat,
        capabilities: SeatCapabilities,
        qh: &QueueHandle<DisplayState>,
    ) {
        let changes = self.seat_capabilities.changes(capabilities);
        self.seat_capabilities = capabilities;

        match changes.keyboard {
            DeviceChange::Added => {
                self.wl_keyboard = Some(seat.get_keyboard(qh, ()));
                debug!("Keyboard available");
            }
            DeviceChange::Removed => {
                if let Some(keyboard) = self.wl_keyboard.take() {
                    release_keyboard(keyboard);
                }
                self.keyboard.clear_keymap();
            }
            DeviceChange::Unchanged => {}
        }
        match changes.pointer {
            DeviceChange::Added => {
                self.wl_pointer = Some(seat.get_pointer(qh, ()));
                debug!("Pointer available");
            }
            DeviceChange::Removed => {
                if let Some(pointer) = self.wl_pointer.take() {
                    release_pointer(pointer);
                }
                self.pointer.reset();
            }
            DeviceChange::Unchanged => {}
        }
    }
}

// ============================================================================
// DecorationListener
// ============================================================================

impl DecorationListener for DisplayState {
    fn toplevel_configure(&mut self, width: i32, height: i32) {
        self.configure.toplevel_configure(width, height);
    }

    fn surface_configure(&mut self) {
        self.configure.surface_configure();
    }

    fn layer_configure(&mut self, width: u32, height: u32) {
        self.configure.layer_configure(width, height);
    }

    fn frame_configure(&mut self, width: u32, height: u32) {
        self.configure.frame_configure(width, height);
    }

    fn decoration_mode(&mut self, server_side: bool) {
        if server_side {
            debug!("Compositor draws window decorations");
        } else {
            warn!("Compositor requested client-side decorations; window stays undecorated");
        }
    }

    fn close(&mut self) {
        info!("Compositor requested close");
        self.closed = true;
    }
}

// ============================================================================
// InputListener
// ============================================================================

impl InputListener for DisplayState {
    fn keymap(&mut self, format: wl_keyboard::KeymapFormat, fd: OwnedFd, size: u32) {
        if format != wl_keyboard::KeymapFormat::XkbV1 {
            warn!("Discarding keymap in format {:?}", format);
            return;
        }
        match XkbKeymap::from_fd(&self.xkb_context, fd, size as usize) {
            Ok(keymap) => {
                drop(self.keyboard.replace_keymap(keymap));
                debug!("Installed keymap ({} bytes)", size);
            }
            Err(e) => warn!("Discarding keymap: {}", e),
        }
    }

    fn key(&mut self, keycode: u32, pressed: bool) {
        if let Some(event) = self.keyboard.key(keycode, pressed) {
            self.events.push_back(event);
        }
    }

    fn modifiers(&mut self, modifiers: ModifierState) {
        self.keyboard.update_modifiers(modifiers);
    }

    fn repeat_info(&mut self, rate: i32, delay: i32) {
        self.keyboard.set_repeat_info(rate, delay);
    }

    fn keyboard_leave(&mut self) {
        trace!("Keyboard focus left");
    }

    fn button(&mut self, button: u32, time: u32, pressed: bool) {
        if !pressed {
            return;
        }
        if self.pointer.button_press(button, time) {
            debug!("Double click, toggling fullscreen");
            self.fullscreen_toggle = !self.fullscreen_toggle;
        }
    }

    fn pointer_leave(&mut self) {
        self.pointer.reset();
    }
}
