//! Session lifecycle management.
//!
//! A `Session` owns one engine transport and the background thread(s)
//! pumping its messages. Sessions are single-use: `Created → Running →
//! Stopped`, and a stopped session never restarts. All notifications go to
//! exactly one `SessionListener`; one upstream consumer per session is a
//! deliberate simplification, not a gap.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::sync::{Latch, StopFlag};
use crate::transport::{not_connected, LineWrite, Transport};

mod task;

/// Callback surface a session notifies. All methods default to no-ops so
/// consumers override only what they need.
pub trait SessionListener: Send + Sync {
    /// A line arrived from the engine.
    fn on_engine_message(&self, _line: &str) {}
    /// A line was delivered to the engine on the consumer's behalf.
    fn on_client_message(&self, _line: &str) {}
    /// A mid-session I/O failure. The session stops itself afterwards.
    fn on_error(&self, _err: &io::Error) {}
    /// The session ended. `requested` distinguishes a caller-initiated
    /// stop from an unexpected EOF or failure.
    fn on_disconnect(&self, _requested: bool) {}
}

/// Lifecycle states of a session. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Running,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Created => "created",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Error type for session lifecycle violations.
#[derive(Debug)]
pub enum SessionError {
    /// `start` called while not in the `Created` state.
    InvalidState(SessionState),
    /// `start` called before a listener was attached.
    NoListener,
    /// Transport establishment failed.
    Io(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidState(state) => {
                write!(f, "session cannot start from the {state} state")
            }
            SessionError::NoListener => write!(f, "session has no listener attached"),
            SessionError::Io(err) => write!(f, "session transport failed: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::Io(err)
    }
}

/// State shared between the session, its handle and its pump threads.
pub(crate) struct SessionShared {
    name: String,
    state: Mutex<SessionState>,
    stop: StopFlag,
    engine_transport: Mutex<Option<Box<dyn Transport>>>,
    remote_transport: Mutex<Option<Box<dyn Transport>>>,
    engine_writer: Mutex<Option<Box<dyn LineWrite>>>,
    listener: Mutex<Option<Arc<dyn SessionListener>>>,
    done: Latch,
}

impl SessionShared {
    fn new(name: String, engine: Box<dyn Transport>, remote: Option<Box<dyn Transport>>) -> Self {
        SessionShared {
            name,
            state: Mutex::new(SessionState::Created),
            stop: StopFlag::new(),
            engine_transport: Mutex::new(Some(engine)),
            remote_transport: Mutex::new(remote),
            engine_writer: Mutex::new(None),
            listener: Mutex::new(None),
            done: Latch::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    pub(crate) fn listener(&self) -> Option<Arc<dyn SessionListener>> {
        self.listener.lock().clone()
    }

    /// Move to `Stopped`, returning whether this call made the transition.
    /// Exactly one caller wins; only the winner fires lifecycle callbacks.
    fn transition_to_stopped(&self) -> bool {
        let mut state = self.state.lock();
        if *state == SessionState::Stopped {
            return false;
        }
        *state = SessionState::Stopped;
        true
    }

    /// Close both transports and drop the writer. Best-effort.
    fn teardown(&self) {
        self.stop.set();
        self.engine_writer.lock().take();
        if let Some(mut transport) = self.engine_transport.lock().take() {
            transport.close();
        }
        if let Some(mut transport) = self.remote_transport.lock().take() {
            transport.close();
        }
    }

    /// Caller-initiated or EOF-driven stop.
    pub(crate) fn stop_session(&self, requested: bool) {
        if !self.transition_to_stopped() {
            return;
        }
        debug!("session '{}' stopping (requested: {requested})", self.name);
        self.teardown();
        if let Some(listener) = self.listener() {
            listener.on_disconnect(requested);
        }
    }

    /// Stop after a mid-session I/O failure; fires the error callback
    /// before the disconnect callback, each at most once per session.
    pub(crate) fn fail_session(&self, err: &io::Error) {
        if !self.transition_to_stopped() {
            return;
        }
        warn!("session '{}' failed: {err}", self.name);
        self.teardown();
        if let Some(listener) = self.listener() {
            listener.on_error(err);
            listener.on_disconnect(false);
        }
    }

    /// Write one line to the engine. Used by pumps and by `send_message`.
    pub(crate) fn write_to_engine(&self, line: &str) -> io::Result<bool> {
        let mut writer = self.engine_writer.lock();
        match writer.as_mut() {
            Some(writer) => {
                writer.write_line(line)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn send_message(&self, line: &str) {
        if self.state() != SessionState::Running {
            debug!("session '{}' dropping message while not running", self.name);
            return;
        }
        match self.write_to_engine(line) {
            Ok(true) => {
                if let Some(listener) = self.listener() {
                    listener.on_client_message(line);
                }
            }
            Ok(false) => {}
            Err(err) => self.fail_session(&err),
        }
    }
}

/// A cheap cloneable handle for sending to and stopping a running session.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
}

impl SessionHandle {
    /// Diagnostic name the session was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        self.shared.name()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Write a line to the engine. Silently dropped unless running.
    pub fn send_message(&self, line: &str) {
        self.shared.send_message(line);
    }

    /// Stop the session. Idempotent; safe from any thread, including from
    /// within a listener callback.
    pub fn stop(&self) {
        self.shared.stop_session(true);
    }

    /// Block until every pump thread has exited.
    pub fn wait(&self) {
        self.shared.done.wait();
    }

    /// Like `wait`, with a deadline. Returns `true` on completion.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.shared.done.wait_timeout(timeout)
    }
}

/// A named, single-use connection to an engine.
pub struct Session {
    shared: Arc<SessionShared>,
}

impl Session {
    /// Client-mode session: the caller exchanges messages with the engine
    /// directly through the listener and `send_message`.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, engine: Box<dyn Transport>) -> Self {
        Session {
            shared: Arc::new(SessionShared::new(name.into(), engine, None)),
        }
    }

    /// Relay-mode session: lines are tunneled verbatim between the engine
    /// and a separately supplied remote transport, one pump per direction.
    #[must_use]
    pub fn relay<S: Into<String>>(
        name: S,
        engine: Box<dyn Transport>,
        remote: Box<dyn Transport>,
    ) -> Self {
        Session {
            shared: Arc::new(SessionShared::new(name.into(), engine, Some(remote))),
        }
    }

    /// Attach the single listener. Must happen before `start`.
    pub fn set_listener(&self, listener: Arc<dyn SessionListener>) {
        *self.shared.listener.lock() = Some(listener);
    }

    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.shared.name()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Open the transport(s) and launch the pump thread(s).
    ///
    /// Fails deterministically if the session already started or already
    /// stopped, if no listener is attached, or if a transport cannot be
    /// established.
    pub fn start(&self) -> Result<(), SessionError> {
        let mut state = self.shared.state.lock();
        if *state != SessionState::Created {
            return Err(SessionError::InvalidState(*state));
        }
        if self.shared.listener.lock().is_none() {
            return Err(SessionError::NoListener);
        }

        let (engine_reader, engine_writer) = {
            let mut guard = self.shared.engine_transport.lock();
            let transport = guard.as_mut().ok_or_else(not_connected)?;
            transport.connect()?;
            transport.split()?
        };

        let remote_halves = {
            let mut guard = self.shared.remote_transport.lock();
            match guard.as_mut() {
                Some(transport) => {
                    let halves = transport.connect().and_then(|()| transport.split());
                    match halves {
                        Ok(halves) => Some(halves),
                        Err(err) => {
                            drop(guard);
                            self.shared.teardown();
                            *state = SessionState::Stopped;
                            return Err(SessionError::Io(err));
                        }
                    }
                }
                None => None,
            }
        };

        *self.shared.engine_writer.lock() = Some(engine_writer);

        let spawned = match remote_halves {
            None => task::spawn_client(&self.shared, engine_reader),
            Some((remote_reader, remote_writer)) => {
                task::spawn_relay(&self.shared, engine_reader, remote_reader, remote_writer)
            }
        };
        if let Err(err) = spawned {
            self.shared.teardown();
            *state = SessionState::Stopped;
            return Err(SessionError::Io(err));
        }

        *state = SessionState::Running;
        debug!("session '{}' started", self.shared.name);
        Ok(())
    }

    /// Write a line to the engine. Silently dropped unless running.
    pub fn send_message(&self, line: &str) {
        self.shared.send_message(line);
    }

    /// Stop the session. Idempotent; never fires lifecycle callbacks more
    /// than once.
    pub fn stop(&self) {
        self.shared.stop_session(true);
    }

    /// Block until every pump thread has exited.
    pub fn wait(&self) {
        self.shared.done.wait();
    }

    /// Like `wait`, with a deadline. Returns `true` on completion.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.shared.done.wait_timeout(timeout)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared.stop_session(true);
    }
}
