//! UCI protocol client.
//!
//! `UciClient` layers the UCI handshake state machine on top of a
//! client-mode `Session`. It drives `uci` / `uciok` / `isready` / `readyok`,
//! collects the engine's identity and option declarations into a frozen
//! `EngineConfig`, and dispatches typed messages to an `EngineEventHandler`.
//! Messages that arrive in a state where they make no sense are dropped
//! silently; engine output is untrusted and never a hard error.

use std::fmt;
use std::io;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::session::{Session, SessionError, SessionHandle, SessionListener};
use crate::transport::Transport;
use crate::uci::{
    EngineMessage, EngineOption, GoParams, IdInfo, ProtectionStatus, SearchInfo, UciCommand,
};

/// Handshake and search lifecycle states of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Created, `start` not called yet.
    NotStarted,
    /// `uci` sent, waiting for `uciok`.
    WaitingUciOk,
    /// `isready` sent, waiting for the first `readyok`.
    WaitingReadyOk,
    /// Handshake complete, engine usable.
    Active,
    /// Best-move delivery suspended; at most one result is held back.
    Paused,
    /// Terminal. The client never restarts.
    Stopped,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeState::NotStarted => "not started",
            HandshakeState::WaitingUciOk => "waiting for uciok",
            HandshakeState::WaitingReadyOk => "waiting for readyok",
            HandshakeState::Active => "active",
            HandshakeState::Paused => "paused",
            HandshakeState::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Which protection line a status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionKind {
    CopyProtection,
    Registration,
}

/// Engine identity and option declarations collected during the handshake.
///
/// Frozen once the handshake completes; declarations arriving later are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub name: Option<String>,
    pub author: Option<String>,
    pub options: Vec<EngineOption>,
}

impl EngineConfig {
    /// Look up a declared option by its exact name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&EngineOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// Error type for client operations.
#[derive(Debug)]
pub enum ClientError {
    /// An operation was attempted in a state that does not allow it.
    InvalidState {
        operation: &'static str,
        state: HandshakeState,
    },
    /// A second best move arrived while one was already buffered during a
    /// pause. The older result was kept, the newer one discarded.
    UnexpectedBestMove,
    /// The underlying session failed.
    Session(SessionError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidState { operation, state } => {
                write!(f, "cannot {operation} while {state}")
            }
            ClientError::UnexpectedBestMove => {
                write!(f, "received a best move while another was already buffered")
            }
            ClientError::Session(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionError> for ClientError {
    fn from(err: SessionError) -> Self {
        ClientError::Session(err)
    }
}

/// Callbacks delivering typed engine events. All methods default to no-ops.
pub trait EngineEventHandler: Send + Sync {
    /// The handshake finished; the configuration is complete and frozen.
    fn on_initialized(&self, _config: &EngineConfig) {}
    /// A `readyok` arrived for an `isready` sent after the handshake.
    fn on_ready(&self) {}
    /// The engine reported a search result.
    fn on_best_move(&self, _best: &str, _ponder: Option<&str>) {}
    /// Incremental search information.
    fn on_info(&self, _info: &SearchInfo) {}
    /// Copy-protection or registration status.
    fn on_protection(&self, _kind: ProtectionKind, _status: ProtectionStatus) {}
    /// A protocol or transport error. The client may stop afterwards.
    fn on_error(&self, _err: &ClientError) {}
    /// The engine connection ended.
    fn on_disconnect(&self, _requested: bool) {}
}

struct ClientInner {
    state: Mutex<HandshakeState>,
    config: Mutex<EngineConfig>,
    pending_best: Mutex<Option<(String, Option<String>)>>,
    handler: Arc<dyn EngineEventHandler>,
    // Cleared on disconnect to break the listener reference cycle.
    session: Mutex<Option<SessionHandle>>,
}

impl ClientInner {
    fn state(&self) -> HandshakeState {
        *self.state.lock()
    }

    fn send_line(&self, line: &str) {
        if let Some(handle) = self.session.lock().clone() {
            handle.send_message(line);
        }
    }

    fn handle_message(&self, msg: EngineMessage) {
        match msg {
            EngineMessage::Id(id) => {
                if self.state() != HandshakeState::WaitingUciOk {
                    return;
                }
                let mut config = self.config.lock();
                match id {
                    IdInfo::Name(name) => config.name = Some(name),
                    IdInfo::Author(author) => config.author = Some(author),
                }
            }
            EngineMessage::Option(option) => {
                if self.state() != HandshakeState::WaitingUciOk {
                    return;
                }
                self.config.lock().options.push(option);
            }
            EngineMessage::UciOk => {
                let mut state = self.state.lock();
                if *state != HandshakeState::WaitingUciOk {
                    return;
                }
                *state = HandshakeState::WaitingReadyOk;
                drop(state);
                self.send_line("isready");
            }
            EngineMessage::ReadyOk => {
                let mut state = self.state.lock();
                match *state {
                    HandshakeState::WaitingReadyOk => {
                        *state = HandshakeState::Active;
                        drop(state);
                        let config = self.config.lock().clone();
                        self.handler.on_initialized(&config);
                    }
                    HandshakeState::Active | HandshakeState::Paused => {
                        drop(state);
                        self.handler.on_ready();
                    }
                    _ => {}
                }
            }
            EngineMessage::BestMove { best, ponder } => {
                let state = self.state();
                match state {
                    HandshakeState::Active => {
                        self.handler.on_best_move(&best, ponder.as_deref());
                    }
                    HandshakeState::Paused => {
                        let mut pending = self.pending_best.lock();
                        if pending.is_some() {
                            drop(pending);
                            self.handler.on_error(&ClientError::UnexpectedBestMove);
                        } else {
                            *pending = Some((best, ponder));
                        }
                    }
                    _ => {}
                }
            }
            EngineMessage::Info(info) => {
                if matches!(
                    self.state(),
                    HandshakeState::Active | HandshakeState::Paused
                ) {
                    self.handler.on_info(&info);
                }
            }
            EngineMessage::CopyProtection(status) => {
                if matches!(
                    self.state(),
                    HandshakeState::Active | HandshakeState::Paused
                ) {
                    self.handler
                        .on_protection(ProtectionKind::CopyProtection, status);
                }
            }
            EngineMessage::Registration(status) => {
                if matches!(
                    self.state(),
                    HandshakeState::Active | HandshakeState::Paused
                ) {
                    self.handler
                        .on_protection(ProtectionKind::Registration, status);
                }
            }
            EngineMessage::Unknown(raw) => {
                debug!("ignoring unrecognized engine output: {raw}");
            }
        }
    }
}

impl SessionListener for ClientInner {
    fn on_engine_message(&self, line: &str) {
        self.handle_message(EngineMessage::parse(line));
    }

    fn on_error(&self, err: &io::Error) {
        let err = ClientError::Session(SessionError::Io(io::Error::new(
            err.kind(),
            err.to_string(),
        )));
        self.handler.on_error(&err);
    }

    fn on_disconnect(&self, requested: bool) {
        *self.state.lock() = HandshakeState::Stopped;
        self.session.lock().take();
        self.handler.on_disconnect(requested);
    }
}

/// A handshaking UCI client over a single engine session.
pub struct UciClient {
    session: Session,
    inner: Arc<ClientInner>,
}

impl UciClient {
    /// Build a client around a not-yet-connected transport. Nothing happens
    /// until `start`.
    #[must_use]
    pub fn new<S: Into<String>>(
        name: S,
        transport: Box<dyn Transport>,
        handler: Arc<dyn EngineEventHandler>,
    ) -> Self {
        let session = Session::new(name, transport);
        let inner = Arc::new(ClientInner {
            state: Mutex::new(HandshakeState::NotStarted),
            config: Mutex::new(EngineConfig::default()),
            pending_best: Mutex::new(None),
            handler,
            session: Mutex::new(Some(session.handle())),
        });
        session.set_listener(Arc::clone(&inner) as Arc<dyn SessionListener>);
        UciClient { session, inner }
    }

    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.inner.state()
    }

    /// Snapshot of the collected engine configuration. Complete only after
    /// `on_initialized` fired.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.inner.config.lock().clone()
    }

    /// Connect the transport and open the handshake by sending `uci`.
    pub fn start(&self) -> Result<(), ClientError> {
        {
            let state = self.inner.state.lock();
            if *state != HandshakeState::NotStarted {
                return Err(ClientError::InvalidState {
                    operation: "start",
                    state: *state,
                });
            }
        }
        self.session.start()?;
        *self.inner.state.lock() = HandshakeState::WaitingUciOk;
        self.session.send_message("uci");
        Ok(())
    }

    /// Send a command to the engine. Allowed once the handshake completed.
    pub fn send(&self, command: &UciCommand) -> Result<(), ClientError> {
        let state = self.state();
        if !matches!(state, HandshakeState::Active | HandshakeState::Paused) {
            return Err(ClientError::InvalidState {
                operation: "send",
                state,
            });
        }
        self.session.send_message(&command.to_string());
        Ok(())
    }

    /// Tell the engine a new game is starting.
    pub fn new_game(&self) -> Result<(), ClientError> {
        self.send(&UciCommand::NewGame)
    }

    /// Assign one engine option.
    pub fn set_option(&self, name: &str, value: Option<&str>) -> Result<(), ClientError> {
        self.send(&UciCommand::SetOption {
            name: name.to_string(),
            value: value.map(str::to_string),
        })
    }

    /// Set the position to search from; arguments are raw UCI tokens.
    pub fn position<I, T>(&self, args: I) -> Result<(), ClientError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.send(&UciCommand::Position(
            args.into_iter().map(Into::into).collect(),
        ))
    }

    /// Start a search.
    pub fn go(&self, params: GoParams) -> Result<(), ClientError> {
        self.send(&UciCommand::Go(params))
    }

    /// Stop the current search. The engine still reports its best move.
    pub fn stop_search(&self) -> Result<(), ClientError> {
        self.send(&UciCommand::Stop)
    }

    /// The pondered move was played.
    pub fn ponder_hit(&self) -> Result<(), ClientError> {
        self.send(&UciCommand::PonderHit)
    }

    /// Suspend best-move delivery. A result arriving while paused is held
    /// in a single slot until `resume`.
    pub fn pause(&self) -> Result<(), ClientError> {
        let mut state = self.inner.state.lock();
        if *state != HandshakeState::Active {
            return Err(ClientError::InvalidState {
                operation: "pause",
                state: *state,
            });
        }
        *state = HandshakeState::Paused;
        Ok(())
    }

    /// Resume best-move delivery, flushing the buffered result if any.
    pub fn resume(&self) -> Result<(), ClientError> {
        let buffered = {
            let mut state = self.inner.state.lock();
            if *state != HandshakeState::Paused {
                return Err(ClientError::InvalidState {
                    operation: "resume",
                    state: *state,
                });
            }
            *state = HandshakeState::Active;
            self.inner.pending_best.lock().take()
        };
        if let Some((best, ponder)) = buffered {
            self.inner.handler.on_best_move(&best, ponder.as_deref());
        }
        Ok(())
    }

    /// Shut the client down. A best-effort `quit` goes out first; then the
    /// session stops and the disconnect callback fires. Idempotent.
    pub fn stop(&self) {
        if self.session.handle().is_running() {
            self.session.send_message(&UciCommand::Quit.to_string());
        }
        self.session.stop();
    }

    /// Block until the session's pump thread has exited.
    pub fn wait(&self) {
        self.session.wait();
    }

    /// Like `wait`, with a deadline. Returns `true` on completion.
    pub fn wait_timeout(&self, timeout: std::time::Duration) -> bool {
        self.session.wait_timeout(timeout)
    }
}

impl Drop for UciClient {
    fn drop(&mut self) {
        self.stop();
    }
}
