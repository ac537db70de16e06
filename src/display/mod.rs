//! Display surface lifecycle
//!
//! [`WaylandDisplay`] ties the connection, the rendering context and the
//! shell negotiation together. It is the only type a frame loop calls into.

pub mod listener;
pub mod output;
pub mod state;

pub use listener::{ConnectionListener, DecorationListener, InputListener};
pub use output::{OutputInfo, OutputMode};
pub use state::DisplayState;

use log::{debug, error, info, trace, warn};
use wayland_client::protocol::wl_surface;

use crate::config::DisplayConfig;
use crate::connection::Session;
use crate::error::DisplayError;
use crate::input::KeyEvent;
use crate::renderer::{EglContext, FramebufferRequest, RenderContext};
use crate::shell::{
    await_frame_configure, ClientDecorations, ConfigureTracker, LayerRequest, Presentation,
    PresentationStrategy, Size, XdgWindow,
};

/// A compositor surface with a GPU context bound to it
pub struct WaylandDisplay<R: RenderContext = EglContext> {
    config: DisplayConfig,
    renderer: R,
    /// Registered client-side decoration provider, while no frame uses it
    decorations: Option<Box<dyn ClientDecorations>>,
    session: Option<Session>,
    state: DisplayState,
    surface: Option<wl_surface::WlSurface>,
    presentation: Option<Presentation>,
    fullscreen: bool,
}

impl WaylandDisplay<EglContext> {
    /// Create a display rendering through EGL
    pub fn new(config: DisplayConfig) -> Self {
        Self::with_renderer(config, EglContext::new())
    }
}

impl<R: RenderContext> WaylandDisplay<R> {
    /// Create a display rendering through `renderer`
    pub fn with_renderer(config: DisplayConfig, renderer: R) -> Self {
        Self {
            config,
            renderer,
            decorations: None,
            session: None,
            state: DisplayState::new(0, 0),
            surface: None,
            presentation: None,
            fullscreen: false,
        }
    }

    /// Make client-side decorations available to strategy selection
    pub fn with_client_decorations(mut self, decorations: Box<dyn ClientDecorations>) -> Self {
        self.decorations = Some(decorations);
        self
    }

    /// Connect, negotiate the surface and bind the GPU context to it
    ///
    /// On error everything acquired so far is released again; the display
    /// is never left half initialized.
    pub fn initialize(&mut self, width: u32, height: u32, fullscreen: bool) -> Result<(), DisplayError> {
        self.shutdown();

        if let Err(e) = self.establish(width, height) {
            error!("Display initialization failed: {}", e);
            self.shutdown();
            return Err(e);
        }

        self.apply_resize();
        if fullscreen {
            self.set_fullscreen(true);
        }
        info!(
            "Display initialized ({:?}, {}x{})",
            self.strategy(),
            self.size().width,
            self.size().height
        );
        Ok(())
    }

    fn establish(&mut self, width: u32, height: u32) -> Result<(), DisplayError> {
        self.state = DisplayState::new(width, height);
        let session = self.session.insert(Session::connect(&self.config)?);
        session.enumerate_globals(&mut self.state)?;
        self.state.globals.require_core()?;

        let background = self.config.background.resolve();
        let strategy = PresentationStrategy::select(
            &self.state.globals.capabilities(),
            background,
            self.decorations.is_some(),
        )?;
        info!("Presentation strategy: {:?}", strategy);

        self.renderer.initialize(session.display_ptr())?;
        self.renderer.select_config(&FramebufferRequest::default())?;
        self.renderer.create_context()?;

        let compositor = self
            .state
            .globals
            .compositor
            .as_ref()
            .ok_or(DisplayError::MissingGlobal("wl_compositor"))?;
        let surface = compositor.create_surface(session.handle(), ());
        self.surface = Some(surface.clone());

        let requested = Size::new(width, height);
        let layer = LayerRequest::wallpaper();
        let drawable_size = match strategy {
            PresentationStrategy::BackgroundLayer => layer
                .expected_size(self.state.output().size())
                .unwrap_or(requested),
            _ => requested,
        };
        self.renderer.create_drawable(&surface, drawable_size)?;
        self.renderer.make_current()?;
        self.renderer.set_present_interval(0)?;

        let globals = &self.state.globals;
        let presentation = match strategy {
            PresentationStrategy::ServerSideDecorated | PresentationStrategy::Undecorated => {
                let wm_base = globals
                    .wm_base
                    .as_ref()
                    .ok_or(DisplayError::MissingGlobal("xdg_wm_base"))?;
                let decoration_manager = match strategy {
                    PresentationStrategy::ServerSideDecorated => globals.decoration_manager.as_ref(),
                    _ => None,
                };
                let window = XdgWindow::create(
                    wm_base,
                    &surface,
                    decoration_manager,
                    session.handle(),
                    &self.config.app_id,
                    &self.config.title,
                    requested,
                );
                if decoration_manager.is_some() {
                    Presentation::ServerSide(window)
                } else {
                    Presentation::Undecorated(window)
                }
            }
            PresentationStrategy::BackgroundLayer => {
                let shell = globals
                    .layer_shell
                    .as_ref()
                    .ok_or(DisplayError::CapabilityMissing("zwlr_layer_shell_v1"))?;
                let layer_surface =
                    layer.create(shell, &surface, globals.output.as_ref(), session.handle());
                self.state.configure =
                    ConfigureTracker::new(drawable_size.width, drawable_size.height);
                Presentation::Background(layer_surface)
            }
            PresentationStrategy::ClientSideDecorated => {
                let mut frame = self
                    .decorations
                    .take()
                    .ok_or(DisplayError::Decorations("no provider registered".to_string()))?;
                let ready = frame
                    .create_frame(
                        session.connection(),
                        &surface,
                        &self.config.app_id,
                        &self.config.title,
                    )
                    .and_then(|()| frame.map())
                    .and_then(|()| {
                        await_frame_configure(frame.as_mut(), &mut self.state, |state| {
                            state.is_configured()
                        })
                    });
                // Keep the provider reachable for teardown even on failure.
                self.presentation = Some(Presentation::ClientSide(frame));
                ready?;
                surface.commit();
                session.roundtrip(&mut self.state)?;
                return Ok(());
            }
        };
        self.presentation = Some(presentation);

        surface.commit();
        session.roundtrip(&mut self.state)?;
        Ok(())
    }

    /// Drain pending compositor and decoration events without blocking
    pub fn update(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(e) = session.dispatch(&mut self.state) {
            error!("Lost connection to compositor: {}", e);
            self.state.set_closed();
            return;
        }
        if let Some(frame) = self.presentation.as_mut().and_then(|p| p.client_decorations()) {
            if let Err(e) = frame.dispatch(&mut self.state) {
                error!("Decoration dispatch failed: {}", e);
                self.state.set_closed();
                return;
            }
        }

        self.apply_resize();
        if self.state.take_fullscreen_toggle() {
            self.set_fullscreen(!self.fullscreen);
        }
    }

    /// Present the current frame once the surface is configured
    ///
    /// Returns whether a present was issued. Presents before the first
    /// configure are dropped, and a failed present only logs.
    pub fn swap_buffers(&mut self) -> bool {
        if let Some(frame) = self.presentation.as_mut().and_then(|p| p.client_decorations()) {
            if let Err(e) = frame.dispatch(&mut self.state) {
                warn!("Decoration dispatch failed: {}", e);
            }
        }
        if !self.state.is_configured() {
            trace!("Suppressing present before configure");
            return false;
        }
        if let Err(e) = self.renderer.present() {
            warn!("Present failed: {}", e);
        }
        true
    }

    /// Set the window title; ignored for background surfaces
    pub fn set_title(&mut self, title: &str) {
        self.config.title = title.to_string();
        if let Some(presentation) = self.presentation.as_mut() {
            presentation.set_title(title);
        }
        self.flush();
    }

    /// Request or leave fullscreen on the bound output
    ///
    /// Advisory until the compositor answers with a configure.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        if let Some(presentation) = self.presentation.as_mut() {
            presentation.set_fullscreen(fullscreen, self.state.globals.output.as_ref());
        }
        self.flush();
    }

    /// Whether the compositor asked the surface to close or the connection died
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Whether the first configure has been acknowledged
    pub fn is_configured(&self) -> bool {
        self.state.is_configured()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current surface size
    pub fn size(&self) -> Size {
        self.state.configure.size()
    }

    /// Current mode of the bound output
    pub fn fullscreen_size(&self) -> Option<Size> {
        self.state.output().size()
    }

    /// Strategy chosen by the last successful initialization
    pub fn strategy(&self) -> Option<PresentationStrategy> {
        self.presentation.as_ref().map(Presentation::strategy)
    }

    pub fn caps_lock(&self) -> bool {
        self.state.keyboard().caps_lock()
    }

    pub fn control(&self) -> bool {
        self.state.keyboard().control()
    }

    /// Next key event in arrival order
    pub fn poll_event(&mut self) -> Option<KeyEvent> {
        self.state.pop_event()
    }

    /// All queued key events in arrival order
    pub fn drain_events(&mut self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.state.drain_events()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Release everything in reverse acquisition order
    ///
    /// Safe to call at any point, any number of times.
    pub fn shutdown(&mut self) {
        if let Some(presentation) = self.presentation.take() {
            if let Some(provider) = presentation.destroy() {
                self.decorations = Some(provider);
            }
        }
        self.renderer.release();
        if let Some(surface) = self.surface.take() {
            surface.destroy();
            debug!("Destroyed wl_surface");
        }
        self.state.release_devices();
        self.state.globals.release();
        if let Some(session) = self.session.take() {
            if let Err(e) = session.flush() {
                debug!("Final flush failed: {}", e);
            }
            info!("Disconnected from compositor");
        }
        self.fullscreen = false;
    }

    fn apply_resize(&mut self) {
        let Some(size) = self.state.configure.take_resize() else {
            return;
        };
        if let Err(e) = self.renderer.resize(size) {
            warn!("Failed to resize drawable: {}", e);
        }
        if let Some(presentation) = self.presentation.as_ref() {
            presentation.set_geometry(size);
        }
    }

    fn flush(&mut self) {
        if let Some(session) = self.session.as_ref() {
            if let Err(e) = session.flush() {
                warn!("Flush failed: {}", e);
            }
        }
    }
}

impl<R: RenderContext> Drop for WaylandDisplay<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
