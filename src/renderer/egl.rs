//! EGL rendering context
//!
//! libEGL is loaded at runtime, so a missing driver is an initialization
//! error rather than a link failure.

use std::ffi::c_void;

use khronos_egl as egl;
use log::{debug, info, trace, warn};
use wayland_client::protocol::wl_surface;
use wayland_client::Proxy;
use wayland_egl::WlEglSurface;

use super::RenderContext;
use crate::error::DisplayError;
use crate::shell::configure::Size;

type EglInstance = egl::DynamicInstance<egl::EGL1_4>;

/// OpenGL ES major version requested for the context
pub const CLIENT_VERSION: egl::Int = 2;

/// Minimum framebuffer capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferRequest {
    pub red: egl::Int,
    pub green: egl::Int,
    pub blue: egl::Int,
    pub alpha: egl::Int,
    pub depth: egl::Int,
}

impl Default for FramebufferRequest {
    fn default() -> Self {
        Self {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth: 24,
        }
    }
}

impl FramebufferRequest {
    /// `eglChooseConfig` attribute list: window-drawable, ES2-renderable
    pub fn to_attribs(&self) -> Vec<egl::Int> {
        vec![
            egl::SURFACE_TYPE,
            egl::WINDOW_BIT,
            egl::RED_SIZE,
            self.red,
            egl::GREEN_SIZE,
            self.green,
            egl::BLUE_SIZE,
            self.blue,
            egl::ALPHA_SIZE,
            self.alpha,
            egl::DEPTH_SIZE,
            self.depth,
            egl::RENDERABLE_TYPE,
            egl::OPENGL_ES2_BIT,
            egl::NONE,
        ]
    }
}

/// EGL display, config, context and window surface for one wl_surface
#[derive(Default)]
pub struct EglContext {
    instance: Option<EglInstance>,
    display: Option<egl::Display>,
    config: Option<egl::Config>,
    context: Option<egl::Context>,
    surface: Option<egl::Surface>,
    window: Option<WlEglSurface>,
}

impl EglContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn instance(&self) -> Result<&EglInstance, DisplayError> {
        self.instance.as_ref().ok_or(DisplayError::NotInitialized)
    }

    fn display(&self) -> Result<egl::Display, DisplayError> {
        self.display.ok_or(DisplayError::NotInitialized)
    }

    /// Whether display, context and surface are all valid
    pub fn is_ready(&self) -> bool {
        self.display.is_some() && self.context.is_some() && self.surface.is_some()
    }
}

impl RenderContext for EglContext {
    fn initialize(&mut self, display: *mut c_void) -> Result<(), DisplayError> {
        // SAFETY: loading libEGL runs its initializers; nothing else is loaded here.
        let instance = unsafe { EglInstance::load_required() }
            .map_err(|e| DisplayError::EglLoad(e.to_string()))?;

        // SAFETY: `display` is the live wl_display of the session, which
        // outlives this context.
        let egl_display = unsafe { instance.get_display(display as egl::NativeDisplayType) }
            .ok_or(DisplayError::egl("eglGetDisplay", egl::Error::BadDisplay))?;
        let (major, minor) = instance
            .initialize(egl_display)
            .map_err(|e| DisplayError::egl("eglInitialize", e))?;
        info!("EGL {}.{} initialized", major, minor);

        self.display = Some(egl_display);
        self.instance = Some(instance);

        self.instance()?
            .bind_api(egl::OPENGL_ES_API)
            .map_err(|e| DisplayError::egl("eglBindAPI", e))?;
        Ok(())
    }

    fn select_config(&mut self, request: &FramebufferRequest) -> Result<(), DisplayError> {
        let display = self.display()?;
        let config = self
            .instance()?
            .choose_first_config(display, &request.to_attribs())
            .map_err(|e| DisplayError::egl("eglChooseConfig", e))?
            .ok_or(DisplayError::NoMatchingConfig)?;
        debug!("Selected EGL config {:p}", config.as_ptr());
        self.config = Some(config);
        Ok(())
    }

    fn create_context(&mut self) -> Result<(), DisplayError> {
        let display = self.display()?;
        let config = self.config.ok_or(DisplayError::NoMatchingConfig)?;
        let attribs = [egl::CONTEXT_CLIENT_VERSION, CLIENT_VERSION, egl::NONE];
        let context = self
            .instance()?
            .create_context(display, config, None, &attribs)
            .map_err(|e| DisplayError::egl("eglCreateContext", e))?;
        debug!("Created OpenGL ES {} context", CLIENT_VERSION);
        self.context = Some(context);
        Ok(())
    }

    fn create_drawable(
        &mut self,
        surface: &wl_surface::WlSurface,
        size: Size,
    ) -> Result<(), DisplayError> {
        let display = self.display()?;
        let config = self.config.ok_or(DisplayError::NoMatchingConfig)?;

        let (width, height) = native_size(size)?;
        let window = WlEglSurface::new(surface.id(), width, height)
            .map_err(|e| DisplayError::NativeWindow(format!("{e:?}")))?;

        // SAFETY: the native window stays alive in `self.window` until after
        // the EGL surface is destroyed in `release`.
        let egl_surface = unsafe {
            self.instance()?.create_window_surface(
                display,
                config,
                window.ptr() as egl::NativeWindowType,
                None,
            )
        };
        // Store the window even on failure so release drops it.
        self.window = Some(window);
        let egl_surface = egl_surface.map_err(|e| DisplayError::egl("eglCreateWindowSurface", e))?;

        debug!("Created EGL window surface {}x{}", size.width, size.height);
        self.surface = Some(egl_surface);
        Ok(())
    }

    fn make_current(&mut self) -> Result<(), DisplayError> {
        let display = self.display()?;
        self.instance()?
            .make_current(display, self.surface, self.surface, self.context)
            .map_err(|e| DisplayError::egl("eglMakeCurrent", e))
    }

    fn set_present_interval(&mut self, interval: i32) -> Result<(), DisplayError> {
        let display = self.display()?;
        self.instance()?
            .swap_interval(display, interval)
            .map_err(|e| DisplayError::egl("eglSwapInterval", e))
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if !self.is_ready() {
            return Err(DisplayError::NotInitialized);
        }
        let display = self.display()?;
        let surface = self.surface.ok_or(DisplayError::NotInitialized)?;
        self.instance()?
            .swap_buffers(display, surface)
            .map_err(|e| DisplayError::egl("eglSwapBuffers", e))
    }

    fn resize(&mut self, size: Size) -> Result<(), DisplayError> {
        let window = self.window.as_ref().ok_or(DisplayError::NotInitialized)?;
        let (width, height) = native_size(size)?;
        window.resize(width, height, 0, 0);
        trace!("Resized native window to {}x{}", size.width, size.height);
        Ok(())
    }

    fn release(&mut self) {
        let (Some(instance), Some(display)) = (self.instance.as_ref(), self.display) else {
            self.window = None;
            return;
        };

        if let Err(e) = instance.make_current(display, None, None, None) {
            warn!("Failed to release current context: {}", e);
        }
        if let Some(surface) = self.surface.take() {
            if let Err(e) = instance.destroy_surface(display, surface) {
                warn!("Failed to destroy EGL surface: {}", e);
            }
            debug!("Destroyed EGL surface");
        }
        if let Some(context) = self.context.take() {
            if let Err(e) = instance.destroy_context(display, context) {
                warn!("Failed to destroy EGL context: {}", e);
            }
            debug!("Destroyed EGL context");
        }
        self.config = None;
        if let Err(e) = instance.terminate(display) {
            warn!("Failed to terminate EGL display: {}", e);
        }
        self.display = None;
        debug!("Terminated EGL display");

        if self.window.take().is_some() {
            debug!("Destroyed native window");
        }
        self.instance = None;
    }
}

fn native_size(size: Size) -> Result<(i32, i32), DisplayError> {
    size.to_i32().ok_or_else(|| {
        DisplayError::NativeWindow(format!("size {}x{} out of range", size.width, size.height))
    })
}

impl Drop for EglContext {
    fn drop(&mut self) {
        self.release();
    }
}
