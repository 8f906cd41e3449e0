//! Engine connection parameters.
//!
//! A `ConnectionParams` value describes where an engine lives — a local
//! executable to spawn or a remote host speaking UCI over TCP — and acts as
//! the factory key for building a transport.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::transport::{ProcessTransport, TcpTransport, Transport};

/// Error type for connection parameter validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The executable path does not exist.
    NotFound(PathBuf),
    /// The executable path points at a directory.
    IsDirectory(PathBuf),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::NotFound(path) => {
                write!(f, "engine executable not found: {}", path.display())
            }
            ConnectionError::IsDirectory(path) => {
                write!(f, "engine path is a directory: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Where an engine lives: a spawned local process or a remote TCP endpoint.
///
/// Immutable once built; validation happens at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionParams {
    /// Local engine executable, spawned as a child process.
    Process { path: PathBuf },
    /// Remote engine reachable over TCP.
    Remote { host: String, port: u16 },
}

impl ConnectionParams {
    /// Parameters for a local engine executable.
    ///
    /// Fails if the path does not exist or is a directory. No attempt is
    /// made to run the file here; spawn errors surface on `connect`.
    pub fn process<P: AsRef<Path>>(path: P) -> Result<Self, ConnectionError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConnectionError::NotFound(path));
        }
        if path.is_dir() {
            return Err(ConnectionError::IsDirectory(path));
        }
        Ok(ConnectionParams::Process { path })
    }

    /// Parameters for a remote engine at `host:port`.
    #[must_use]
    pub fn remote<S: Into<String>>(host: S, port: u16) -> Self {
        ConnectionParams::Remote {
            host: host.into(),
            port,
        }
    }

    /// Build a not-yet-connected transport for these parameters.
    #[must_use]
    pub fn open(&self) -> Box<dyn Transport> {
        match self {
            ConnectionParams::Process { path } => Box::new(ProcessTransport::new(path.clone())),
            ConnectionParams::Remote { host, port } => {
                Box::new(TcpTransport::dial(host.clone(), *port))
            }
        }
    }

    /// Human-readable label, used for diagnostics and thread naming.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ConnectionParams::Process { path } => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            ConnectionParams::Remote { host, port } => format!("{host}:{port}"),
        }
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionParams::Process { path } => write!(f, "process {}", path.display()),
            ConnectionParams::Remote { host, port } => write!(f, "tcp {host}:{port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_params_reject_missing_executable() {
        let err = ConnectionParams::process("/no/such/engine/binary").unwrap_err();
        assert!(matches!(err, ConnectionError::NotFound(_)));
    }

    #[test]
    fn process_params_reject_directory() {
        let dir = std::env::temp_dir();
        let err = ConnectionParams::process(&dir).unwrap_err();
        assert!(matches!(err, ConnectionError::IsDirectory(_)));
    }

    #[test]
    fn remote_params_label() {
        let params = ConnectionParams::remote("localhost", 9999);
        assert_eq!(params.label(), "localhost:9999");
        assert_eq!(params.to_string(), "tcp localhost:9999");
    }
}
