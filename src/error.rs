//! Error types for display setup

use wayland_client::{ConnectError, DispatchError};

/// Coarse classification of a [`DisplayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Initialization cannot continue; nothing is exposed as ready
    FatalSetup,
    /// A requested mode needs a protocol the compositor does not offer
    FatalCapabilityMissing,
    /// A single operation failed; the next frame retries
    Transient,
}

/// Errors raised by the display backend
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Failed to open compositor socket: {0}")]
    Socket(#[from] std::io::Error),
    #[error("Failed to connect to the compositor: {0}")]
    Connect(#[from] ConnectError),
    #[error("Protocol dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("Compositor does not advertise required global {0}")]
    MissingGlobal(&'static str),
    #[error("Compositor does not support {0}")]
    CapabilityMissing(&'static str),
    #[error("Failed to load libEGL: {0}")]
    EglLoad(String),
    #[error("{call} failed: {source}")]
    Egl {
        call: &'static str,
        #[source]
        source: khronos_egl::Error,
    },
    #[error("No framebuffer configuration matches the request")]
    NoMatchingConfig,
    #[error("Failed to create native window: {0}")]
    NativeWindow(String),
    #[error("Client-side decorations failed: {0}")]
    Decorations(String),
    #[error("Failed to load keymap: {0}")]
    Keymap(String),
    #[error("Display is not initialized")]
    NotInitialized,
}

impl DisplayError {
    /// Wrap an EGL error together with the call that produced it
    pub fn egl(call: &'static str, source: khronos_egl::Error) -> Self {
        DisplayError::Egl { call, source }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DisplayError::CapabilityMissing(_) => ErrorKind::FatalCapabilityMissing,
            DisplayError::Keymap(_) => ErrorKind::Transient,
            DisplayError::Egl { call, .. } if *call == "eglSwapBuffers" => ErrorKind::Transient,
            _ => ErrorKind::FatalSetup,
        }
    }
}
