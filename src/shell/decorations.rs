//! Client-side decorations
//!
//! A decoration library draws the window frame itself and owns the top-level
//! role. The backend talks to it through [`ClientDecorations`]; hosts that
//! ship such a library register an implementation at runtime.

use log::{debug, trace};
use wayland_client::protocol::{wl_output, wl_surface};
use wayland_client::Connection;

use crate::display::DecorationListener;
use crate::error::DisplayError;

/// A client-side decoration frame around one surface
pub trait ClientDecorations {
    /// Create the frame for `surface` and give it its identity
    fn create_frame(
        &mut self,
        connection: &Connection,
        surface: &wl_surface::WlSurface,
        app_id: &str,
        title: &str,
    ) -> Result<(), DisplayError>;

    /// Map the frame so the compositor starts configuring it
    fn map(&mut self) -> Result<(), DisplayError>;

    /// Dispatch pending decoration events without blocking
    ///
    /// Frame configure and close callbacks are forwarded to `listener`.
    /// Returns the number of events dispatched.
    fn dispatch(&mut self, listener: &mut dyn DecorationListener) -> Result<usize, DisplayError>;

    fn set_title(&mut self, title: &str);

    /// Request fullscreen on `output`
    fn set_fullscreen(&mut self, output: Option<&wl_output::WlOutput>);

    fn unset_fullscreen(&mut self);

    /// Tear the frame down; the provider may create a new one afterwards
    fn destroy(&mut self);
}

/// Spin on the decoration event source until the frame is configured
///
/// No content may be produced before the frame has a content size, so
/// this blocks initialization. A dispatch error aborts the wait.
pub fn await_frame_configure<L>(
    decorations: &mut dyn ClientDecorations,
    listener: &mut L,
    configured: impl Fn(&L) -> bool,
) -> Result<(), DisplayError>
where
    L: DecorationListener,
{
    let mut rounds = 0u64;
    while !configured(&*listener) {
        decorations.dispatch(&mut *listener)?;
        rounds += 1;
    }
    trace!("Frame configured after {} dispatch rounds", rounds);
    debug!("Client-side decoration frame ready");
    Ok(())
}
