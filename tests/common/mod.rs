//! In-process compositor for integration tests
//!
//! Runs a small wayland-server display on a thread, listening on a socket
//! in a temporary directory. It advertises a configurable set of globals,
//! answers the initial commit of a role surface with a configure and records
//! the requests it receives.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::os::fd::AsFd;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use wayland_protocols::xdg::decoration::zv1::server::{
    zxdg_decoration_manager_v1, zxdg_toplevel_decoration_v1,
};
use wayland_protocols::xdg::shell::server::{xdg_surface, xdg_toplevel, xdg_wm_base};
use wayland_protocols_wlr::layer_shell::v1::server::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};
use wayland_server::protocol::{wl_compositor, wl_keyboard, wl_output, wl_seat, wl_surface};
use wayland_server::{
    Client, DataInit, Dispatch, Display, DisplayHandle, GlobalDispatch, ListeningSocket, New,
    Resource, WEnum,
};

/// Name of the advertised output
pub const OUTPUT_NAME: &str = "FAKE-1";

// evdev keycodes
pub const KEY_ESC: u32 = 1;
pub const KEY_F1: u32 = 59;
pub const KEY_F2: u32 = 60;

/// Keymap handed to clients that bind a keyboard
const KEYMAP: &str = r#"xkb_keymap {
    xkb_keycodes "test" {
        minimum = 8;
        maximum = 255;
        <ESC> = 9;
        <FK01> = 67;
        <FK02> = 68;
    };
    xkb_types "test" {
        type "ONE_LEVEL" {
            modifiers = none;
            level_name[Level1] = "Any";
        };
    };
    xkb_compat "test" {
    };
    xkb_symbols "test" {
        key <ESC> { [ Escape ] };
        key <FK01> { [ F1 ] };
        key <FK02> { [ F2 ] };
    };
};
"#;

/// Globals and answers of the fake compositor
#[derive(Debug, Clone)]
pub struct CompositorOptions {
    pub wm_base: bool,
    pub decoration_manager: bool,
    pub layer_shell: bool,
    pub seat: bool,
    /// Size sent in the initial top-level configure
    pub toplevel_size: (i32, i32),
    /// Hold back the initial configure until the test sends one
    pub defer_configure: bool,
    /// Current mode of the advertised output
    pub output_mode: (i32, i32),
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            wm_base: true,
            decoration_manager: false,
            layer_shell: false,
            seat: false,
            toplevel_size: (0, 0),
            defer_configure: false,
            output_mode: (1920, 1080),
        }
    }
}

/// Events the test asks the compositor to send
#[derive(Debug, Clone)]
pub enum Command {
    /// Key presses/releases on every bound keyboard
    Keys(Vec<(u32, bool)>),
    /// Ask every role surface to close
    Close,
    /// Send a new top-level configure
    Configure(i32, i32),
}

/// Handle to a running fake compositor
pub struct FakeCompositor {
    pub socket: PathBuf,
    log: Arc<Mutex<Vec<String>>>,
    commands: Arc<Mutex<Vec<Command>>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    _dir: tempfile::TempDir,
}

impl FakeCompositor {
    pub fn start(options: CompositorOptions) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("wayland-test");
        let log = Arc::new(Mutex::new(Vec::new()));
        let commands = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let (ready_tx, ready_rx) = mpsc::channel();
        let thread = {
            let socket = socket.clone();
            let log = log.clone();
            let commands = commands.clone();
            let stop = stop.clone();
            thread::spawn(move || run(options, socket, log, commands, stop, ready_tx))
        };
        ready_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("fake compositor did not start");

        Self {
            socket,
            log,
            commands,
            stop,
            thread: Some(thread),
            _dir: dir,
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Whether a request starting with `prefix` was received
    pub fn received(&self, prefix: &str) -> bool {
        self.requests().iter().any(|r| r.starts_with(prefix))
    }

    /// Wait until a request starting with `prefix` arrives
    pub fn wait_for(&self, prefix: &str) -> bool {
        wait_until(|| self.received(prefix))
    }

    pub fn send(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }

    /// Stop serving; connected clients see the connection drop
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for FakeCompositor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll `condition` for up to two seconds
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn run(
    options: CompositorOptions,
    socket_path: PathBuf,
    log: Arc<Mutex<Vec<String>>>,
    commands: Arc<Mutex<Vec<Command>>>,
    stop: Arc<AtomicBool>,
    ready: mpsc::Sender<()>,
) {
    let mut display: Display<Server> = Display::new().unwrap();
    let dh = display.handle();

    dh.create_global::<Server, wl_compositor::WlCompositor, _>(4, ());
    dh.create_global::<Server, wl_output::WlOutput, _>(4, ());
    if options.wm_base {
        dh.create_global::<Server, xdg_wm_base::XdgWmBase, _>(2, ());
    }
    if options.decoration_manager {
        dh.create_global::<Server, zxdg_decoration_manager_v1::ZxdgDecorationManagerV1, _>(1, ());
    }
    if options.layer_shell {
        dh.create_global::<Server, zwlr_layer_shell_v1::ZwlrLayerShellV1, _>(4, ());
    }
    if options.seat {
        dh.create_global::<Server, wl_seat::WlSeat, _>(7, ());
    }

    let socket = ListeningSocket::bind_absolute(socket_path).unwrap();
    let mut server = Server::new(options, log);
    let _ = ready.send(());

    while !stop.load(Ordering::Relaxed) {
        while let Ok(Some(stream)) = socket.accept() {
            let _ = display.handle().insert_client(stream, Arc::new(()));
        }

        let pending: Vec<Command> = std::mem::take(&mut *commands.lock().unwrap());
        for command in pending {
            server.handle_command(command);
        }

        let _ = display.dispatch_clients(&mut server);
        let _ = display.flush_clients();
        thread::sleep(Duration::from_millis(1));
    }
}

enum RoleKind {
    Toplevel {
        xdg_surface: xdg_surface::XdgSurface,
        toplevel: xdg_toplevel::XdgToplevel,
    },
    Layer(zwlr_layer_surface_v1::ZwlrLayerSurfaceV1),
}

struct Role {
    surface: wl_surface::WlSurface,
    kind: RoleKind,
    configured: bool,
}

struct Server {
    options: CompositorOptions,
    log: Arc<Mutex<Vec<String>>>,
    serial: u32,
    roles: Vec<Role>,
    keyboards: Vec<wl_keyboard::WlKeyboard>,
    keymap: File,
}

impl Server {
    fn new(options: CompositorOptions, log: Arc<Mutex<Vec<String>>>) -> Self {
        let mut keymap = tempfile::tempfile().unwrap();
        keymap.write_all(KEYMAP.as_bytes()).unwrap();
        keymap.write_all(&[0]).unwrap();
        Self {
            options,
            log,
            serial: 0,
            roles: Vec::new(),
            keyboards: Vec::new(),
            keymap,
        }
    }

    fn record(&self, request: String) {
        self.log.lock().unwrap().push(request);
    }

    fn next_serial(&mut self) -> u32 {
        self.serial += 1;
        self.serial
    }

    fn configure_toplevel(
        &mut self,
        xdg_surface: &xdg_surface::XdgSurface,
        toplevel: &xdg_toplevel::XdgToplevel,
        width: i32,
        height: i32,
    ) {
        toplevel.configure(width, height, Vec::new());
        let serial = self.next_serial();
        xdg_surface.configure(serial);
    }

    fn commit(&mut self, surface: &wl_surface::WlSurface) {
        let Some(index) = self
            .roles
            .iter()
            .position(|role| &role.surface == surface && !role.configured)
        else {
            return;
        };
        self.roles[index].configured = true;
        if self.options.defer_configure {
            return;
        }

        let serial = self.next_serial();
        match &self.roles[index].kind {
            RoleKind::Toplevel {
                xdg_surface,
                toplevel,
            } => {
                let (width, height) = self.options.toplevel_size;
                toplevel.configure(width, height, Vec::new());
                xdg_surface.configure(serial);
            }
            RoleKind::Layer(layer_surface) => {
                let (width, height) = self.options.output_mode;
                layer_surface.configure(serial, width as u32, height as u32);
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Keys(keys) => {
                for (key, pressed) in keys {
                    let serial = self.next_serial();
                    let state = if pressed {
                        wl_keyboard::KeyState::Pressed
                    } else {
                        wl_keyboard::KeyState::Released
                    };
                    for keyboard in &self.keyboards {
                        keyboard.key(serial, serial * 10, key, state);
                    }
                }
            }
            Command::Close => {
                for role in &self.roles {
                    match &role.kind {
                        RoleKind::Toplevel { toplevel, .. } => toplevel.close(),
                        RoleKind::Layer(layer_surface) => layer_surface.closed(),
                    }
                }
            }
            Command::Configure(width, height) => {
                let toplevels: Vec<_> = self
                    .roles
                    .iter()
                    .filter_map(|role| match &role.kind {
                        RoleKind::Toplevel {
                            xdg_surface,
                            toplevel,
                        } => Some((xdg_surface.clone(), toplevel.clone())),
                        RoleKind::Layer(_) => None,
                    })
                    .collect();
                for (xdg_surface, toplevel) in toplevels {
                    self.configure_toplevel(&xdg_surface, &toplevel, width, height);
                }
            }
        }
    }
}

// ============================================================================
// wl_compositor / wl_surface
// ============================================================================

impl GlobalDispatch<wl_compositor::WlCompositor, ()> for Server {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<wl_compositor::WlCompositor>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &wl_compositor::WlCompositor,
        request: wl_compositor::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let wl_compositor::Request::CreateSurface { id } = request {
            data_init.init(id, ());
            state.record("compositor.create_surface".to_string());
        }
    }
}

impl Dispatch<wl_surface::WlSurface, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &wl_surface::WlSurface,
        request: wl_surface::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            wl_surface::Request::Commit => {
                state.record("surface.commit".to_string());
                state.commit(resource);
            }
            wl_surface::Request::Destroy => {
                state.record("surface.destroy".to_string());
                state.roles.retain(|role| &role.surface != resource);
            }
            _ => {}
        }
    }
}

// ============================================================================
// wl_output
// ============================================================================

impl GlobalDispatch<wl_output::WlOutput, ()> for Server {
    fn bind(
        state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<wl_output::WlOutput>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        let output = data_init.init(resource, ());
        let (width, height) = state.options.output_mode;
        output.mode(
            wl_output::Mode::Current | wl_output::Mode::Preferred,
            width,
            height,
            60000,
        );
        if output.version() >= 2 {
            output.scale(1);
        }
        if output.version() >= 4 {
            output.name(OUTPUT_NAME.to_string());
        }
        if output.version() >= 2 {
            output.done();
        }
    }
}

impl Dispatch<wl_output::WlOutput, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &wl_output::WlOutput,
        request: wl_output::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        if let wl_output::Request::Release = request {
            state.record("output.release".to_string());
        }
    }
}

// ============================================================================
// xdg_wm_base / xdg_surface / xdg_toplevel
// ============================================================================

impl GlobalDispatch<xdg_wm_base::XdgWmBase, ()> for Server {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<xdg_wm_base::XdgWmBase>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &xdg_wm_base::XdgWmBase,
        request: xdg_wm_base::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let xdg_wm_base::Request::GetXdgSurface { id, surface } = request {
            data_init.init(id, surface);
            state.record("wm_base.get_xdg_surface".to_string());
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, wl_surface::WlSurface> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &xdg_surface::XdgSurface,
        request: xdg_surface::Request,
        surface: &wl_surface::WlSurface,
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            xdg_surface::Request::GetToplevel { id } => {
                let toplevel = data_init.init(id, ());
                state.roles.push(Role {
                    surface: surface.clone(),
                    kind: RoleKind::Toplevel {
                        xdg_surface: resource.clone(),
                        toplevel,
                    },
                    configured: false,
                });
                state.record("xdg_surface.get_toplevel".to_string());
            }
            xdg_surface::Request::SetWindowGeometry {
                x,
                y,
                width,
                height,
            } => {
                state.record(format!(
                    "xdg_surface.set_window_geometry {} {} {} {}",
                    x, y, width, height
                ));
            }
            xdg_surface::Request::AckConfigure { serial } => {
                state.record(format!("xdg_surface.ack_configure {}", serial));
            }
            xdg_surface::Request::Destroy => {
                state.record("xdg_surface.destroy".to_string());
            }
            _ => {}
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &xdg_toplevel::XdgToplevel,
        request: xdg_toplevel::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            xdg_toplevel::Request::SetTitle { title } => {
                state.record(format!("toplevel.set_title {}", title));
            }
            xdg_toplevel::Request::SetAppId { app_id } => {
                state.record(format!("toplevel.set_app_id {}", app_id));
            }
            xdg_toplevel::Request::SetFullscreen { output } => {
                state.record(format!("toplevel.set_fullscreen output={}", output.is_some()));
            }
            xdg_toplevel::Request::UnsetFullscreen => {
                state.record("toplevel.unset_fullscreen".to_string());
            }
            xdg_toplevel::Request::Destroy => {
                state.record("toplevel.destroy".to_string());
                state.roles.retain(|role| match &role.kind {
                    RoleKind::Toplevel { toplevel, .. } => toplevel != resource,
                    RoleKind::Layer(_) => true,
                });
            }
            _ => {}
        }
    }
}

// ============================================================================
// zxdg_decoration_manager_v1 / zxdg_toplevel_decoration_v1
// ============================================================================

impl GlobalDispatch<zxdg_decoration_manager_v1::ZxdgDecorationManagerV1, ()> for Server {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<zxdg_decoration_manager_v1::ZxdgDecorationManagerV1>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<zxdg_decoration_manager_v1::ZxdgDecorationManagerV1, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &zxdg_decoration_manager_v1::ZxdgDecorationManagerV1,
        request: zxdg_decoration_manager_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let zxdg_decoration_manager_v1::Request::GetToplevelDecoration { id, .. } = request {
            data_init.init(id, ());
            state.record("decoration_manager.get_toplevel_decoration".to_string());
        }
    }
}

impl Dispatch<zxdg_toplevel_decoration_v1::ZxdgToplevelDecorationV1, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &zxdg_toplevel_decoration_v1::ZxdgToplevelDecorationV1,
        request: zxdg_toplevel_decoration_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            zxdg_toplevel_decoration_v1::Request::SetMode { mode } => {
                state.record(format!("decoration.set_mode {:?}", mode));
                resource.configure(zxdg_toplevel_decoration_v1::Mode::ServerSide);
            }
            zxdg_toplevel_decoration_v1::Request::Destroy => {
                state.record("decoration.destroy".to_string());
            }
            _ => {}
        }
    }
}

// ============================================================================
// zwlr_layer_shell_v1 / zwlr_layer_surface_v1
// ============================================================================

impl GlobalDispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for Server {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &zwlr_layer_shell_v1::ZwlrLayerShellV1,
        request: zwlr_layer_shell_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let zwlr_layer_shell_v1::Request::GetLayerSurface {
            id,
            surface,
            output,
            layer,
            namespace,
        } = request
        {
            let layer_surface = data_init.init(id, ());
            state.record(format!(
                "layer_shell.get_layer_surface layer={:?} output={} namespace={}",
                layer,
                output.is_some(),
                namespace
            ));
            state.roles.push(Role {
                surface,
                kind: RoleKind::Layer(layer_surface),
                configured: false,
            });
        }
    }
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        request: zwlr_layer_surface_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            zwlr_layer_surface_v1::Request::SetSize { width, height } => {
                state.record(format!("layer.set_size {}x{}", width, height));
            }
            zwlr_layer_surface_v1::Request::SetAnchor { anchor } => {
                let bits = match anchor {
                    WEnum::Value(anchor) => anchor.bits(),
                    WEnum::Unknown(raw) => raw,
                };
                state.record(format!("layer.set_anchor {}", bits));
            }
            zwlr_layer_surface_v1::Request::SetExclusiveZone { zone } => {
                state.record(format!("layer.set_exclusive_zone {}", zone));
            }
            zwlr_layer_surface_v1::Request::AckConfigure { serial } => {
                state.record(format!("layer.ack_configure {}", serial));
            }
            zwlr_layer_surface_v1::Request::Destroy => {
                state.record("layer.destroy".to_string());
            }
            _ => {}
        }
    }
}

// ============================================================================
// wl_seat / wl_keyboard
// ============================================================================

impl GlobalDispatch<wl_seat::WlSeat, ()> for Server {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<wl_seat::WlSeat>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        let seat = data_init.init(resource, ());
        seat.capabilities(wl_seat::Capability::Keyboard);
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &wl_seat::WlSeat,
        request: wl_seat::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            wl_seat::Request::GetKeyboard { id } => {
                let keyboard = data_init.init(id, ());
                let size = KEYMAP.len() as u32 + 1;
                keyboard.keymap(wl_keyboard::KeymapFormat::XkbV1, state.keymap.as_fd(), size);
                if keyboard.version() >= 4 {
                    keyboard.repeat_info(30, 200);
                }
                state.keyboards.push(keyboard);
                state.record("seat.get_keyboard".to_string());
            }
            wl_seat::Request::Release => {
                state.record("seat.release".to_string());
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for Server {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &wl_keyboard::WlKeyboard,
        request: wl_keyboard::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        if let wl_keyboard::Request::Release = request {
            state.record("keyboard.release".to_string());
            state.keyboards.retain(|keyboard| keyboard != resource);
        }
    }
}
