//! TCP tunnel server.
//!
//! `TunnelServer` listens for remote GUI connections and relays each one to
//! a locally spawned engine process through a relay-mode `Session`. Exactly
//! one remote client is served at a time: the accept loop blocks on the
//! active session until it ends, so a second connection is simply not
//! accepted until the first finishes.

use std::fmt;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::connection::ConnectionParams;
use crate::session::{Session, SessionHandle, SessionListener};
use crate::sync::StopFlag;
use crate::transport::TcpTransport;

/// How long the accept loop sleeps between polls. Bounds how late a
/// shutdown request can be noticed while no client is connected.
const ACCEPT_POLL_MS: u64 = 50;

/// Lifecycle states of the server. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Running,
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Created => "created",
            ServerState::Running => "running",
            ServerState::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Error type for server lifecycle violations.
#[derive(Debug)]
pub enum ServerError {
    /// `start` called while not in the `Created` state.
    InvalidState(ServerState),
    /// `start` called before both listeners were attached.
    MissingListeners,
    /// Binding the listening socket failed.
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::InvalidState(state) => {
                write!(f, "server cannot start from the {state} state")
            }
            ServerError::MissingListeners => {
                write!(f, "server requires both a session listener and a server listener")
            }
            ServerError::Io(err) => write!(f, "server socket failed: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        ServerError::Io(err)
    }
}

/// Server lifecycle callbacks. All methods default to no-ops.
pub trait ServerListener: Send + Sync {
    /// The listening socket is bound; `port` is the actual local port.
    fn on_started(&self, _port: u16) {}
    /// A remote client connected and a relay session is being set up.
    fn on_client_connected(&self, _addr: SocketAddr) {}
    /// The active relay session ended; the server accepts again.
    fn on_session_ended(&self) {}
    /// The accept loop exited. Fires exactly once.
    fn on_stopped(&self) {}
}

struct ServerShared {
    engine: ConnectionParams,
    state: Mutex<ServerState>,
    stop: StopFlag,
    local_port: Mutex<Option<u16>>,
    session_listener: Mutex<Option<Arc<dyn SessionListener>>>,
    server_listener: Mutex<Option<Arc<dyn ServerListener>>>,
    active: Mutex<Option<SessionHandle>>,
}

impl ServerShared {
    fn server_listener(&self) -> Option<Arc<dyn ServerListener>> {
        self.server_listener.lock().clone()
    }
}

/// A single-client UCI tunnel over TCP.
pub struct TunnelServer {
    shared: Arc<ServerShared>,
    port: u16,
    accept_thread: Mutex<Option<JoinHandle<()>>>,
}

impl TunnelServer {
    /// Build a server that will expose the engine described by `engine` on
    /// the given TCP port. Port 0 requests an ephemeral port.
    #[must_use]
    pub fn new(engine: ConnectionParams, port: u16) -> Self {
        TunnelServer {
            shared: Arc::new(ServerShared {
                engine,
                state: Mutex::new(ServerState::Created),
                stop: StopFlag::new(),
                local_port: Mutex::new(None),
                session_listener: Mutex::new(None),
                server_listener: Mutex::new(None),
                active: Mutex::new(None),
            }),
            port,
            accept_thread: Mutex::new(None),
        }
    }

    /// Attach the listener every relay session will notify.
    pub fn set_session_listener(&self, listener: Arc<dyn SessionListener>) {
        *self.shared.session_listener.lock() = Some(listener);
    }

    /// Attach the server lifecycle listener.
    pub fn set_server_listener(&self, listener: Arc<dyn ServerListener>) {
        *self.shared.server_listener.lock() = Some(listener);
    }

    #[must_use]
    pub fn state(&self) -> ServerState {
        *self.shared.state.lock()
    }

    /// The port actually bound, once running. Useful with port 0.
    #[must_use]
    pub fn local_port(&self) -> Option<u16> {
        *self.shared.local_port.lock()
    }

    /// Whether an arriving client would be served immediately.
    #[must_use]
    pub fn can_accept_new_connection(&self) -> bool {
        self.state() == ServerState::Running && self.shared.active.lock().is_none()
    }

    /// Bind the socket and launch the accept loop.
    ///
    /// Fails deterministically unless the server is freshly created and
    /// both listeners are attached.
    pub fn start(&self) -> Result<(), ServerError> {
        let mut state = self.shared.state.lock();
        if *state != ServerState::Created {
            return Err(ServerError::InvalidState(*state));
        }
        if self.shared.session_listener.lock().is_none()
            || self.shared.server_listener.lock().is_none()
        {
            return Err(ServerError::MissingListeners);
        }

        let listener = TcpListener::bind(("0.0.0.0", self.port))?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();
        *self.shared.local_port.lock() = Some(port);

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("tunnel-accept".to_string())
            .spawn(move || accept_loop(&shared, &listener))?;
        *self.accept_thread.lock() = Some(handle);

        *state = ServerState::Running;
        drop(state);
        info!("tunnel server listening on port {port}");
        if let Some(listener) = self.shared.server_listener() {
            listener.on_started(port);
        }
        Ok(())
    }

    /// Stop the server: end the active session if any, wind down the
    /// accept loop and join it. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            if *state == ServerState::Stopped && self.accept_thread.lock().is_none() {
                return;
            }
            *state = ServerState::Stopped;
        }
        self.shared.stop.set();
        if let Some(session) = self.shared.active.lock().clone() {
            session.stop();
        }
        if let Some(handle) = self.accept_thread.lock().take() {
            if handle.join().is_err() {
                warn!("accept thread panicked during shutdown");
            }
        }
    }
}

impl Drop for TunnelServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Poll for connections until stopped. Each accepted client is served to
/// completion before the next accept; that is what limits the server to
/// one bound client at a time.
fn accept_loop(shared: &Arc<ServerShared>, listener: &TcpListener) {
    let mut serial = 0u64;
    while !shared.stop.is_set() {
        match listener.accept() {
            Ok((stream, addr)) => {
                serial += 1;
                serve_client(shared, stream, addr, serial);
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(ACCEPT_POLL_MS));
            }
            Err(err) => {
                warn!("accept failed: {err}");
                thread::sleep(Duration::from_millis(ACCEPT_POLL_MS));
            }
        }
    }
    *shared.state.lock() = ServerState::Stopped;
    if let Some(server_listener) = shared.server_listener() {
        server_listener.on_stopped();
    }
}

fn serve_client(shared: &Arc<ServerShared>, stream: std::net::TcpStream, addr: SocketAddr, serial: u64) {
    info!("client connected from {addr}");
    if let Some(server_listener) = shared.server_listener() {
        server_listener.on_client_connected(addr);
    }

    // The listening socket is non-blocking; the accepted stream must not
    // inherit that.
    if let Err(err) = stream.set_nonblocking(false) {
        warn!("failed to configure client socket: {err}");
        return;
    }

    let session = Session::relay(
        format!("{}-{serial}", shared.engine.label()),
        shared.engine.open(),
        Box::new(TcpTransport::from_stream(stream)),
    );
    let session_listener = shared.session_listener.lock().clone();
    if let Some(listener) = session_listener {
        session.set_listener(listener);
    }

    match session.start() {
        Ok(()) => {
            *shared.active.lock() = Some(session.handle());
            // A shutdown racing the accept may have missed this session.
            if shared.stop.is_set() {
                session.stop();
            }
            session.wait();
            *shared.active.lock() = None;
            debug!("session for {addr} ended");
            if let Some(server_listener) = shared.server_listener() {
                server_listener.on_session_ended();
            }
        }
        Err(err) => {
            warn!("failed to start relay session for {addr}: {err}");
        }
    }
}
