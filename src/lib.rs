//! Wayglass - a Wayland display-surface backend
//!
//! Wayglass connects to a Wayland compositor, negotiates a surface with an
//! EGL context bound to it and translates keyboard and pointer input into
//! an ordered stream of key events. The surface is presented either as a
//! decorated top-level window or as a full-output wallpaper on the
//! background layer.
//!
//! # Architecture
//!
//! - **Connection**: compositor socket, global binding, non-blocking dispatch
//! - **Renderer**: EGL display, config, context and window surface
//! - **Shell**: presentation strategy, configure tracking, layer and decorations
//! - **Input**: XKB keymaps, modifier flags, key events, double click
//! - **Display**: the lifecycle object a frame loop drives
//!
//! # Example
//!
//! ```no_run
//! use wayglass::{DisplayConfig, WaylandDisplay};
//!
//! let mut display = WaylandDisplay::new(DisplayConfig::default());
//! display.initialize(1280, 720, false)?;
//! while !display.is_closed() {
//!     display.update();
//!     // draw with the current GL context
//!     display.swap_buffers();
//! }
//! # Ok::<(), wayglass::DisplayError>(())
//! ```

pub mod config;
pub mod connection;
pub mod display;
pub mod error;
pub mod input;
pub mod renderer;
pub mod shell;

pub use config::{BackgroundMode, DisplayConfig};
pub use display::WaylandDisplay;
pub use error::{DisplayError, ErrorKind};
pub use input::{Key, KeyEvent};
pub use shell::{ClientDecorations, PresentationStrategy, Size};
