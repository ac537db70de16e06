//! Wayland protocol dispatch implementations
//!
//! Decodes compositor events for each protocol object and forwards them to
//! the listener interfaces of [`DisplayState`].

use log::{debug, trace, warn};
use wayland_client::protocol::{
    wl_compositor, wl_keyboard, wl_output, wl_pointer, wl_registry, wl_seat, wl_surface,
};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle, WEnum};
use wayland_protocols::xdg::decoration::zv1::client::{
    zxdg_decoration_manager_v1, zxdg_toplevel_decoration_v1,
};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

use crate::display::{ConnectionListener, DecorationListener, DisplayState, InputListener};
use crate::input::{ModifierState, SeatCapabilities};

// ============================================================================
// wl_registry
// ============================================================================

impl Dispatch<wl_registry::WlRegistry, ()> for DisplayState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => {
                state.globals.bind(registry, name, &interface, version, qh);
            }
            wl_registry::Event::GlobalRemove { name } => {
                trace!("Global {} removed", name);
            }
            _ => {}
        }
    }
}

// ============================================================================
// Globals without events
// ============================================================================

wayland_client::delegate_noop!(DisplayState: wl_compositor::WlCompositor);
wayland_client::delegate_noop!(DisplayState: zwlr_layer_shell_v1::ZwlrLayerShellV1);
wayland_client::delegate_noop!(DisplayState: zxdg_decoration_manager_v1::ZxdgDecorationManagerV1);

// ============================================================================
// wl_surface
// ============================================================================

impl Dispatch<wl_surface::WlSurface, ()> for DisplayState {
    fn event(
        _state: &mut Self,
        _surface: &wl_surface::WlSurface,
        event: wl_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_surface::Event::Enter { output } => {
                trace!("Surface entered output {:?}", output.id());
            }
            wl_surface::Event::Leave { output } => {
                trace!("Surface left output {:?}", output.id());
            }
            _ => {}
        }
    }
}

// ============================================================================
// xdg_wm_base
// ============================================================================

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for DisplayState {
    fn event(
        state: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
            state.ping(serial);
        }
    }
}

// ============================================================================
// xdg_surface
// ============================================================================

impl Dispatch<xdg_surface::XdgSurface, ()> for DisplayState {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            trace!("Acked xdg_surface configure {}", serial);
            state.surface_configure();
        }
    }
}

// ============================================================================
// xdg_toplevel
// ============================================================================

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for DisplayState {
    fn event(
        state: &mut Self,
        _toplevel: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                trace!("Toplevel configure {}x{}", width, height);
                state.toplevel_configure(width, height);
            }
            xdg_toplevel::Event::Close => {
                state.close();
            }
            _ => {}
        }
    }
}

// ============================================================================
// zxdg_toplevel_decoration_v1
// ============================================================================

impl Dispatch<zxdg_toplevel_decoration_v1::ZxdgToplevelDecorationV1, ()> for DisplayState {
    fn event(
        state: &mut Self,
        _decoration: &zxdg_toplevel_decoration_v1::ZxdgToplevelDecorationV1,
        event: zxdg_toplevel_decoration_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let zxdg_toplevel_decoration_v1::Event::Configure { mode } = event {
            let server_side = matches!(
                mode,
                WEnum::Value(zxdg_toplevel_decoration_v1::Mode::ServerSide)
            );
            state.decoration_mode(server_side);
        }
    }
}

// ============================================================================
// zwlr_layer_surface_v1
// ============================================================================

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for DisplayState {
    fn event(
        state: &mut Self,
        layer_surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure {
                serial,
                width,
                height,
            } => {
                layer_surface.ack_configure(serial);
                trace!("Acked layer surface configure {} ({}x{})", serial, width, height);
                state.layer_configure(width, height);
            }
            zwlr_layer_surface_v1::Event::Closed => {
                state.close();
            }
            _ => {}
        }
    }
}

// ============================================================================
// wl_output
// ============================================================================

impl Dispatch<wl_output::WlOutput, ()> for DisplayState {
    fn event(
        state: &mut Self,
        output: &wl_output::WlOutput,
        event: wl_output::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_output::Event::Mode {
                flags,
                width,
                height,
                refresh,
            } => {
                let current = match flags {
                    WEnum::Value(flags) => flags.contains(wl_output::Mode::Current),
                    WEnum::Unknown(raw) => raw & 0x1 != 0,
                };
                state.output_mode(width, height, refresh, current);
                // Version 1 outputs never send done.
                if output.version() < 2 {
                    state.output_done();
                }
            }
            wl_output::Event::Scale { factor } => {
                state.output_scale(factor);
            }
            wl_output::Event::Name { name } => {
                state.output_name(name);
            }
            wl_output::Event::Done => {
                state.output_done();
            }
            _ => {}
        }
    }
}

// ============================================================================
// wl_seat
// ============================================================================

impl Dispatch<wl_seat::WlSeat, ()> for DisplayState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_seat::Event::Capabilities { capabilities } => {
                let capabilities = SeatCapabilities::from_wayland(capabilities);
                state.seat_capabilities(seat, capabilities, qh);
            }
            wl_seat::Event::Name { name } => {
                debug!("Seat name: {}", name);
            }
            _ => {}
        }
    }
}

// ============================================================================
// wl_keyboard
// ============================================================================

impl Dispatch<wl_keyboard::WlKeyboard, ()> for DisplayState {
    fn event(
        state: &mut Self,
        _keyboard: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_keyboard::Event::Keymap { format, fd, size } => match format {
                WEnum::Value(format) => state.keymap(format, fd, size),
                WEnum::Unknown(raw) => warn!("Discarding keymap in unknown format {}", raw),
            },
            wl_keyboard::Event::Enter { .. } => {
                trace!("Keyboard focus entered");
            }
            wl_keyboard::Event::Leave { .. } => {
                state.keyboard_leave();
            }
            wl_keyboard::Event::Key {
                key,
                state: key_state,
                ..
            } => {
                let pressed = matches!(key_state, WEnum::Value(wl_keyboard::KeyState::Pressed));
                state.key(key, pressed);
            }
            wl_keyboard::Event::Modifiers {
                mods_depressed,
                mods_latched,
                mods_locked,
                group,
                ..
            } => {
                state.modifiers(ModifierState {
                    depressed: mods_depressed,
                    latched: mods_latched,
                    locked: mods_locked,
                    group,
                });
            }
            wl_keyboard::Event::RepeatInfo { rate, delay } => {
                state.repeat_info(rate, delay);
            }
            _ => {}
        }
    }
}

// ============================================================================
// wl_pointer
// ============================================================================

impl Dispatch<wl_pointer::WlPointer, ()> for DisplayState {
    fn event(
        state: &mut Self,
        _pointer: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Button {
                time,
                button,
                state: button_state,
                ..
            } => {
                let pressed = matches!(
                    button_state,
                    WEnum::Value(wl_pointer::ButtonState::Pressed)
                );
                state.button(button, time, pressed);
            }
            wl_pointer::Event::Leave { .. } => {
                state.pointer_leave();
            }
            _ => {}
        }
    }
}
