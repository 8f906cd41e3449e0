//! Engine communication library for the UCI protocol.
//!
//! Talks to chess engines over stdio or TCP, drives the UCI handshake, and
//! can expose a local engine to remote GUIs through a TCP tunnel.
//!
//! The layers, bottom up:
//!
//! - [`transport`]: line-oriented channels over a spawned process or a socket
//! - [`uci`]: the message model, parsing and serialization
//! - [`session`]: single-use connection lifecycle with background pumps
//! - [`client`]: the handshake state machine and typed event dispatch
//! - [`server`]: the single-client TCP tunnel

pub mod client;
pub mod connection;
pub mod server;
pub mod session;
pub mod sync;
pub mod transport;
pub mod uci;

pub use client::{
    ClientError, EngineConfig, EngineEventHandler, HandshakeState, ProtectionKind, UciClient,
};
pub use connection::{ConnectionError, ConnectionParams};
pub use server::{ServerError, ServerListener, ServerState, TunnelServer};
pub use session::{Session, SessionError, SessionHandle, SessionListener, SessionState};
pub use transport::{LineRead, LineWrite, ProcessTransport, TcpTransport, Transport};
pub use uci::{
    EngineMessage, EngineOption, GoParams, IdInfo, OptionValue, ProtectionStatus, Score,
    ScoreBound, SearchInfo, UciCommand,
};
