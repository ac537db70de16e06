//! Bound compositor globals
//!
//! Recognizes advertised globals by interface name, binds each one at most
//! once and keeps the handles for the rest of the session.

use log::{debug, trace};
use wayland_client::protocol::{wl_compositor, wl_output, wl_registry, wl_seat};
use wayland_client::{Proxy, QueueHandle};
use wayland_protocols::xdg::decoration::zv1::client::zxdg_decoration_manager_v1;
use wayland_protocols::xdg::shell::client::xdg_wm_base;
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_shell_v1;

use crate::display::DisplayState;
use crate::error::DisplayError;

/// A global interface this backend knows how to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKind {
    Compositor,
    WmBase,
    Output,
    LayerShell,
    DecorationManager,
    Seat,
}

impl GlobalKind {
    /// Recognize an advertised interface name
    pub fn from_interface(interface: &str) -> Option<Self> {
        match interface {
            "wl_compositor" => Some(GlobalKind::Compositor),
            "xdg_wm_base" => Some(GlobalKind::WmBase),
            "wl_output" => Some(GlobalKind::Output),
            "zwlr_layer_shell_v1" => Some(GlobalKind::LayerShell),
            "zxdg_decoration_manager_v1" => Some(GlobalKind::DecorationManager),
            "wl_seat" => Some(GlobalKind::Seat),
            _ => None,
        }
    }

    /// Protocol interface name
    pub fn interface(self) -> &'static str {
        match self {
            GlobalKind::Compositor => "wl_compositor",
            GlobalKind::WmBase => "xdg_wm_base",
            GlobalKind::Output => "wl_output",
            GlobalKind::LayerShell => "zwlr_layer_shell_v1",
            GlobalKind::DecorationManager => "zxdg_decoration_manager_v1",
            GlobalKind::Seat => "wl_seat",
        }
    }

    /// Highest version this backend speaks
    pub fn max_version(self) -> u32 {
        match self {
            GlobalKind::Compositor => 4,
            GlobalKind::WmBase => 2,
            GlobalKind::Output => 4,
            GlobalKind::LayerShell => 4,
            GlobalKind::DecorationManager => 1,
            GlobalKind::Seat => 7,
        }
    }
}

/// Which optional protocols the compositor offered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub output: bool,
    pub layer_shell: bool,
    pub decoration_manager: bool,
    pub seat: bool,
}

/// Handles of the bound globals
#[derive(Debug, Default)]
pub struct Globals {
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub wm_base: Option<xdg_wm_base::XdgWmBase>,
    pub output: Option<wl_output::WlOutput>,
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub decoration_manager: Option<zxdg_decoration_manager_v1::ZxdgDecorationManagerV1>,
    pub seat: Option<wl_seat::WlSeat>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a global of this kind is already bound
    pub fn is_bound(&self, kind: GlobalKind) -> bool {
        match kind {
            GlobalKind::Compositor => self.compositor.is_some(),
            GlobalKind::WmBase => self.wm_base.is_some(),
            GlobalKind::Output => self.output.is_some(),
            GlobalKind::LayerShell => self.layer_shell.is_some(),
            GlobalKind::DecorationManager => self.decoration_manager.is_some(),
            GlobalKind::Seat => self.seat.is_some(),
        }
    }

    /// Bind an advertised global if it is recognized and not yet bound
    ///
    /// Returns the kind that was bound.
    pub fn bind(
        &mut self,
        registry: &wl_registry::WlRegistry,
        name: u32,
        interface: &str,
        version: u32,
        qh: &QueueHandle<DisplayState>,
    ) -> Option<GlobalKind> {
        let Some(kind) = GlobalKind::from_interface(interface) else {
            trace!("Ignoring global {} v{}", interface, version);
            return None;
        };
        if self.is_bound(kind) {
            trace!("Ignoring additional {} (name {})", interface, name);
            return None;
        }

        let version = version.min(kind.max_version());
        match kind {
            GlobalKind::Compositor => {
                self.compositor = Some(registry.bind(name, version, qh, ()));
            }
            GlobalKind::WmBase => {
                self.wm_base = Some(registry.bind(name, version, qh, ()));
            }
            GlobalKind::Output => {
                self.output = Some(registry.bind(name, version, qh, ()));
            }
            GlobalKind::LayerShell => {
                self.layer_shell = Some(registry.bind(name, version, qh, ()));
            }
            GlobalKind::DecorationManager => {
                self.decoration_manager = Some(registry.bind(name, version, qh, ()));
            }
            GlobalKind::Seat => {
                self.seat = Some(registry.bind(name, version, qh, ()));
            }
        }
        debug!("Bound {} v{}", interface, version);
        Some(kind)
    }

    /// Fail unless the globals every strategy needs are present
    pub fn require_core(&self) -> Result<(), DisplayError> {
        if self.compositor.is_none() {
            return Err(DisplayError::MissingGlobal(GlobalKind::Compositor.interface()));
        }
        if self.wm_base.is_none() {
            return Err(DisplayError::MissingGlobal(GlobalKind::WmBase.interface()));
        }
        Ok(())
    }

    /// Optional protocols available for strategy selection
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            output: self.output.is_some(),
            layer_shell: self.layer_shell.is_some(),
            decoration_manager: self.decoration_manager.is_some(),
            seat: self.seat.is_some(),
        }
    }

    /// Release every bound global that has a destructor request
    pub fn release(&mut self) {
        if let Some(seat) = self.seat.take() {
            if seat.version() >= 5 {
                seat.release();
            }
        }
        if let Some(manager) = self.decoration_manager.take() {
            manager.destroy();
        }
        if let Some(shell) = self.layer_shell.take() {
            if shell.version() >= 3 {
                shell.destroy();
            }
        }
        if let Some(output) = self.output.take() {
            if output.version() >= 3 {
                output.release();
            }
        }
        if let Some(wm_base) = self.wm_base.take() {
            wm_base.destroy();
        }
        self.compositor = None;
        debug!("Released globals");
    }
}
