//! Background layer request
//!
//! Parameters of the wlr-layer-shell surface used for wallpaper mode.

use wayland_client::protocol::{wl_output, wl_surface};
use wayland_client::QueueHandle;
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

use super::configure::Size;
use crate::display::DisplayState;

use zwlr_layer_surface_v1::Anchor;

/// Layer surface parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRequest {
    /// Layer
    pub layer: zwlr_layer_shell_v1::Layer,
    /// Namespace (application identifier)
    pub namespace: String,
    /// Size (0 = use anchor constraints)
    pub size: (u32, u32),
    /// Anchor edges
    pub anchor: Anchor,
    /// Exclusive zone (-1 = ignore other surfaces' zones)
    pub exclusive_zone: i32,
}

impl LayerRequest {
    /// Full-output background surface
    pub fn wallpaper() -> Self {
        Self {
            layer: zwlr_layer_shell_v1::Layer::Background,
            namespace: "wallpaper".to_string(),
            size: (0, 0),
            anchor: Anchor::Top | Anchor::Bottom | Anchor::Left | Anchor::Right,
            exclusive_zone: -1,
        }
    }

    /// Size the compositor is expected to give the surface on `output`
    ///
    /// A zero dimension anchored to both opposite edges stretches to the
    /// output; otherwise the requested dimension stands.
    pub fn expected_size(&self, output: Option<Size>) -> Option<Size> {
        let (mut width, mut height) = self.size;
        let output = output.unwrap_or(Size::new(0, 0));

        if width == 0 && self.anchor.contains(Anchor::Left | Anchor::Right) {
            width = output.width;
        }
        if height == 0 && self.anchor.contains(Anchor::Top | Anchor::Bottom) {
            height = output.height;
        }

        let size = Size::new(width, height);
        size.is_valid().then_some(size)
    }

    /// Create the layer surface for `surface`
    pub fn create(
        &self,
        shell: &zwlr_layer_shell_v1::ZwlrLayerShellV1,
        surface: &wl_surface::WlSurface,
        output: Option<&wl_output::WlOutput>,
        qh: &QueueHandle<DisplayState>,
    ) -> zwlr_layer_surface_v1::ZwlrLayerSurfaceV1 {
        let layer_surface =
            shell.get_layer_surface(surface, output, self.layer, self.namespace.clone(), qh, ());
        layer_surface.set_size(self.size.0, self.size.1);
        layer_surface.set_anchor(self.anchor);
        layer_surface.set_exclusive_zone(self.exclusive_zone);
        layer_surface
    }
}
