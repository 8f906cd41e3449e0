//! Transport abstraction over engine I/O channels.
//!
//! A transport is an open bidirectional byte channel to either a spawned
//! engine process or a TCP socket. Both variants hand out line-oriented
//! reader/writer halves once connected; UCI is a newline-delimited protocol
//! and nothing above this layer touches raw bytes.

use std::io::{self, BufRead, BufReader, Read, Write};

mod process;
mod tcp;

pub use process::ProcessTransport;
pub use tcp::TcpTransport;

/// Blocking line source. `Ok(None)` signals end of stream.
pub trait LineRead: Send {
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Line sink. Appends the line terminator and flushes.
pub trait LineWrite: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// An open channel to an engine (or a remote client, on the server side).
///
/// Lifecycle: `connect` → `split` → `close`. `split` may be called once and
/// only after `connect` succeeded. `close` is idempotent, tolerates a
/// never-connected instance, and must unblock a reader currently parked in
/// `read_line` within bounded time.
pub trait Transport: Send {
    /// Establish the underlying channel.
    fn connect(&mut self) -> io::Result<()>;

    /// Take the line-oriented halves of the channel.
    fn split(&mut self) -> io::Result<(Box<dyn LineRead>, Box<dyn LineWrite>)>;

    /// Release the channel. Best-effort; errors are swallowed.
    fn close(&mut self);
}

pub(crate) fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport is not connected")
}

/// `LineRead` over any blocking byte reader.
pub(crate) struct IoLineReader<R: Read> {
    inner: BufReader<R>,
}

impl<R: Read> IoLineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        IoLineReader {
            inner: BufReader::new(inner),
        }
    }
}

impl<R: Read + Send> LineRead for IoLineReader<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes = self.inner.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// `LineWrite` over any blocking byte writer.
pub(crate) struct IoLineWriter<W: Write> {
    inner: W,
}

impl<W: Write> IoLineWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        IoLineWriter { inner }
    }
}

impl<W: Write + Send> LineWrite for IoLineWriter<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()
    }
}
