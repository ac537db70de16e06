//! Shell negotiation module
//!
//! Chooses how the surface is presented (decorated window, undecorated
//! window or background layer) and owns the protocol objects of that
//! choice for the rest of the session.

pub mod configure;
pub mod decorations;
pub mod layer;

pub use configure::{ConfigureTracker, Size};
pub use decorations::{await_frame_configure, ClientDecorations};
pub use layer::LayerRequest;

use log::{debug, info, warn};
use wayland_client::protocol::{wl_output, wl_surface};
use wayland_client::QueueHandle;
use wayland_protocols::xdg::decoration::zv1::client::{
    zxdg_decoration_manager_v1, zxdg_toplevel_decoration_v1,
};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1;

use crate::connection::Capabilities;
use crate::display::DisplayState;
use crate::error::DisplayError;

/// How the surface is presented, chosen once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationStrategy {
    /// Top-level window, frame drawn by the compositor
    ServerSideDecorated,
    /// Top-level window, frame drawn by a decoration library
    ClientSideDecorated,
    /// Top-level window without a frame
    Undecorated,
    /// Full-output surface on the background layer
    BackgroundLayer,
}

impl PresentationStrategy {
    /// Pick the strategy for the offered capabilities
    ///
    /// A background request wins over everything else and needs the layer
    /// shell; without it the request fails instead of degrading.
    pub fn select(
        capabilities: &Capabilities,
        background: bool,
        client_decorations: bool,
    ) -> Result<Self, DisplayError> {
        if background {
            if !capabilities.layer_shell {
                return Err(DisplayError::CapabilityMissing("zwlr_layer_shell_v1"));
            }
            return Ok(PresentationStrategy::BackgroundLayer);
        }
        if capabilities.decoration_manager {
            return Ok(PresentationStrategy::ServerSideDecorated);
        }
        if client_decorations {
            return Ok(PresentationStrategy::ClientSideDecorated);
        }
        warn!("No decoration support available, falling back to an undecorated window");
        Ok(PresentationStrategy::Undecorated)
    }
}

/// xdg-shell window objects
pub(crate) struct XdgWindow {
    xdg_surface: xdg_surface::XdgSurface,
    toplevel: xdg_toplevel::XdgToplevel,
    decoration: Option<zxdg_toplevel_decoration_v1::ZxdgToplevelDecorationV1>,
}

impl XdgWindow {
    /// Give `surface` the top-level role, optionally with a server-side frame
    pub(crate) fn create(
        wm_base: &xdg_wm_base::XdgWmBase,
        surface: &wl_surface::WlSurface,
        decoration_manager: Option<&zxdg_decoration_manager_v1::ZxdgDecorationManagerV1>,
        qh: &QueueHandle<DisplayState>,
        app_id: &str,
        title: &str,
        size: Size,
    ) -> Self {
        let xdg_surface = wm_base.get_xdg_surface(surface, qh, ());
        let toplevel = xdg_surface.get_toplevel(qh, ());
        toplevel.set_app_id(app_id.to_string());
        toplevel.set_title(title.to_string());

        let decoration = decoration_manager.map(|manager| {
            let decoration = manager.get_toplevel_decoration(&toplevel, qh, ());
            decoration.set_mode(zxdg_toplevel_decoration_v1::Mode::ServerSide);
            debug!("Requested server-side decorations");
            decoration
        });

        let window = Self {
            xdg_surface,
            toplevel,
            decoration,
        };
        window.set_geometry(size);
        window
    }

    fn set_geometry(&self, size: Size) {
        match size.to_i32() {
            Some((width, height)) if size.is_valid() => {
                self.xdg_surface.set_window_geometry(0, 0, width, height);
            }
            _ => debug!("Skipping window geometry {}x{}", size.width, size.height),
        }
    }

    fn destroy(self) {
        if let Some(decoration) = self.decoration {
            decoration.destroy();
        }
        self.toplevel.destroy();
        self.xdg_surface.destroy();
    }
}

/// Protocol objects of the chosen strategy
pub(crate) enum Presentation {
    ServerSide(XdgWindow),
    ClientSide(Box<dyn ClientDecorations>),
    Undecorated(XdgWindow),
    Background(zwlr_layer_surface_v1::ZwlrLayerSurfaceV1),
}

impl Presentation {
    pub(crate) fn strategy(&self) -> PresentationStrategy {
        match self {
            Presentation::ServerSide(_) => PresentationStrategy::ServerSideDecorated,
            Presentation::ClientSide(_) => PresentationStrategy::ClientSideDecorated,
            Presentation::Undecorated(_) => PresentationStrategy::Undecorated,
            Presentation::Background(_) => PresentationStrategy::BackgroundLayer,
        }
    }

    pub(crate) fn set_title(&mut self, title: &str) {
        match self {
            Presentation::ServerSide(window) | Presentation::Undecorated(window) => {
                window.toplevel.set_title(title.to_string());
            }
            Presentation::ClientSide(frame) => frame.set_title(title),
            Presentation::Background(_) => {}
        }
    }

    /// Ask for (or leave) fullscreen on `output`; the compositor answers
    /// with a configure
    pub(crate) fn set_fullscreen(&mut self, fullscreen: bool, output: Option<&wl_output::WlOutput>) {
        match self {
            Presentation::ServerSide(window) | Presentation::Undecorated(window) => {
                if fullscreen {
                    window.toplevel.set_fullscreen(output);
                } else {
                    window.toplevel.unset_fullscreen();
                }
            }
            Presentation::ClientSide(frame) => {
                if fullscreen {
                    frame.set_fullscreen(output);
                } else {
                    frame.unset_fullscreen();
                }
            }
            Presentation::Background(_) => return,
        }
        info!("Fullscreen {}", if fullscreen { "requested" } else { "left" });
    }

    /// Re-send the window geometry after a resize
    pub(crate) fn set_geometry(&self, size: Size) {
        if let Presentation::ServerSide(window) | Presentation::Undecorated(window) = self {
            window.set_geometry(size);
        }
    }

    pub(crate) fn client_decorations(&mut self) -> Option<&mut Box<dyn ClientDecorations>> {
        match self {
            Presentation::ClientSide(frame) => Some(frame),
            _ => None,
        }
    }

    /// Destroy the role objects; a client-side provider is handed back
    pub(crate) fn destroy(self) -> Option<Box<dyn ClientDecorations>> {
        match self {
            Presentation::ServerSide(window) | Presentation::Undecorated(window) => {
                window.destroy();
                debug!("Destroyed xdg top-level");
                None
            }
            Presentation::ClientSide(mut frame) => {
                frame.destroy();
                debug!("Destroyed decoration frame");
                Some(frame)
            }
            Presentation::Background(layer_surface) => {
                layer_surface.destroy();
                debug!("Destroyed layer surface");
                None
            }
        }
    }
}
