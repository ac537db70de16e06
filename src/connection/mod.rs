//! Compositor connection module
//!
//! Opens the Wayland connection, binds the globals the backend recognizes
//! and pumps the event queue without blocking.

pub mod dispatch;
pub mod globals;

pub use globals::{Capabilities, GlobalKind, Globals};

use std::ffi::c_void;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream;

use log::{debug, info};
use rustix::event::{poll, PollFd, PollFlags, Timespec};
use wayland_client::backend::WaylandError;
use wayland_client::protocol::wl_registry;
use wayland_client::{Connection, DispatchError, EventQueue, QueueHandle};

use crate::config::DisplayConfig;
use crate::display::DisplayState;
use crate::error::DisplayError;

/// An open compositor connection and its event queue
pub struct Session {
    connection: Connection,
    queue: EventQueue<DisplayState>,
    qh: QueueHandle<DisplayState>,
    _registry: wl_registry::WlRegistry,
}

impl Session {
    /// Connect to the compositor named by `config` (or the environment)
    pub fn connect(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let connection = match &config.socket {
            Some(path) => {
                let stream = UnixStream::connect(path)?;
                Connection::from_socket(stream)?
            }
            None => Connection::connect_to_env()?,
        };
        info!("Connected to Wayland compositor");

        let queue = connection.new_event_queue();
        let qh = queue.handle();
        let registry = connection.display().get_registry(&qh, ());

        Ok(Self {
            connection,
            queue,
            qh,
            _registry: registry,
        })
    }

    /// Bind the advertised globals and let them send their initial state
    ///
    /// The first round-trip delivers the registry; the second one delivers
    /// events of the objects bound during the first (output modes, seat
    /// capabilities).
    pub fn enumerate_globals(&mut self, state: &mut DisplayState) -> Result<(), DisplayError> {
        self.queue.roundtrip(state)?;
        self.queue.roundtrip(state)?;
        debug!("Global enumeration complete: {:?}", state.globals.capabilities());
        Ok(())
    }

    /// Block until the compositor has processed every request sent so far
    pub fn roundtrip(&mut self, state: &mut DisplayState) -> Result<usize, DisplayError> {
        Ok(self.queue.roundtrip(state)?)
    }

    /// Read whatever the compositor has sent and dispatch it, never blocking
    pub fn dispatch(&mut self, state: &mut DisplayState) -> Result<usize, DisplayError> {
        self.flush()?;

        if let Some(guard) = self.queue.prepare_read() {
            let ready = {
                let fd = guard.connection_fd();
                let mut fds = [PollFd::new(&fd, PollFlags::IN)];
                let timeout = Timespec {
                    tv_sec: 0,
                    tv_nsec: 0,
                };
                poll(&mut fds, Some(&timeout)).map_err(std::io::Error::from)?
            };
            if ready > 0 {
                match guard.read() {
                    Ok(_) => {}
                    Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(e) => return Err(DispatchError::Backend(e).into()),
                }
            }
        }

        Ok(self.queue.dispatch_pending(state)?)
    }

    /// Send buffered requests
    pub fn flush(&self) -> Result<(), DisplayError> {
        match self.connection.flush() {
            Ok(()) => Ok(()),
            Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(DispatchError::Backend(e).into()),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn handle(&self) -> &QueueHandle<DisplayState> {
        &self.qh
    }

    /// Native `wl_display` pointer for the GPU driver
    pub fn display_ptr(&self) -> *mut c_void {
        self.connection.backend().display_ptr() as *mut c_void
    }
}
