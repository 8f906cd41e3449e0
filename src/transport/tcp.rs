//! Transport over a TCP socket.

use std::io;
use std::net::{Shutdown, TcpStream};

use log::debug;

use super::{not_connected, IoLineReader, IoLineWriter, LineRead, LineWrite, Transport};

enum Endpoint {
    /// Outbound dial to a remote engine.
    Dial { host: String, port: u16 },
    /// Inbound connection already accepted by a listener.
    Accepted(Option<TcpStream>),
}

/// A UCI channel over TCP, from either an outbound dial or an inbound accept.
pub struct TcpTransport {
    endpoint: Endpoint,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Transport that will dial `host:port` on `connect`.
    #[must_use]
    pub fn dial(host: String, port: u16) -> Self {
        TcpTransport {
            endpoint: Endpoint::Dial { host, port },
            stream: None,
        }
    }

    /// Transport wrapping a stream accepted by a listening socket.
    #[must_use]
    pub fn from_stream(stream: TcpStream) -> Self {
        TcpTransport {
            endpoint: Endpoint::Accepted(Some(stream)),
            stream: None,
        }
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> io::Result<()> {
        match &mut self.endpoint {
            Endpoint::Dial { host, port } => {
                self.stream = Some(TcpStream::connect((host.as_str(), *port))?);
            }
            Endpoint::Accepted(stream) => {
                // Already connected by the accept; just adopt the handle.
                self.stream = Some(stream.take().ok_or_else(not_connected)?);
            }
        }
        Ok(())
    }

    fn split(&mut self) -> io::Result<(Box<dyn LineRead>, Box<dyn LineWrite>)> {
        let stream = self.stream.as_ref().ok_or_else(not_connected)?;
        let reader = stream.try_clone()?;
        let writer = stream.try_clone()?;
        Ok((
            Box::new(IoLineReader::new(reader)),
            Box::new(IoLineWriter::new(writer)),
        ))
    }

    fn close(&mut self) {
        // Shutdown reaches the reader/writer clones too, unblocking any
        // thread parked in read_line.
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.shutdown(Shutdown::Both) {
                debug!("socket shutdown failed: {err}");
            }
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
