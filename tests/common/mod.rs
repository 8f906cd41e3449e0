//! Shared fixtures for integration tests: an in-memory transport driven
//! through channels, plus recording listeners and handlers.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use uci_bridge::client::{ClientError, EngineConfig, EngineEventHandler, ProtectionKind};
use uci_bridge::server::ServerListener;
use uci_bridge::session::SessionListener;
use uci_bridge::transport::{LineRead, LineWrite, Transport};
use uci_bridge::uci::{ProtectionStatus, SearchInfo};

pub const SHORT_WAIT: Duration = Duration::from_millis(200);
pub const LONG_WAIT: Duration = Duration::from_secs(5);

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_for<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// The test's end of a [`ChannelTransport`]: inject engine output, observe
/// what the code under test wrote.
pub struct TestPeer {
    from_engine: Sender<String>,
    to_engine: Receiver<String>,
    fail_reads: Arc<AtomicBool>,
}

impl TestPeer {
    /// Inject one line of engine output.
    pub fn send(&self, line: &str) {
        self.from_engine
            .send(line.to_string())
            .expect("transport reader gone");
    }

    /// Wait for the next line written to the engine.
    pub fn expect_line(&self) -> String {
        self.to_engine
            .recv_timeout(LONG_WAIT)
            .expect("no line written to engine in time")
    }

    /// Assert that nothing is written to the engine for a short while.
    pub fn expect_silence(&self) {
        match self.to_engine.recv_timeout(SHORT_WAIT) {
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
            Ok(line) => panic!("unexpected line written to engine: {line}"),
        }
    }

    /// Make the next read on the engine side fail with an I/O error.
    pub fn inject_read_error(&self) {
        self.fail_reads.store(true, Ordering::Relaxed);
    }
}

/// An in-memory transport backed by channels, standing in for an engine.
pub struct ChannelTransport {
    incoming: Option<Receiver<String>>,
    outgoing: Option<Sender<String>>,
    closed: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

/// Build a transport plus the peer that scripts its engine side.
pub fn channel_transport() -> (ChannelTransport, TestPeer) {
    let (from_engine, incoming) = mpsc::channel();
    let (outgoing, to_engine) = mpsc::channel();
    let fail_reads = Arc::new(AtomicBool::new(false));
    (
        ChannelTransport {
            incoming: Some(incoming),
            outgoing: Some(outgoing),
            closed: Arc::new(AtomicBool::new(false)),
            fail_reads: Arc::clone(&fail_reads),
        },
        TestPeer {
            from_engine,
            to_engine,
            fail_reads,
        },
    )
}

struct ChannelReader {
    incoming: Receiver<String>,
    closed: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl LineRead for ChannelReader {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if self.fail_reads.load(Ordering::Relaxed) {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "injected read failure",
                ));
            }
            if self.closed.load(Ordering::Relaxed) {
                return Ok(None);
            }
            match self.incoming.recv_timeout(Duration::from_millis(20)) {
                Ok(line) => return Ok(Some(line)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}

struct ChannelWriter {
    outgoing: Sender<String>,
    closed: Arc<AtomicBool>,
}

impl LineWrite for ChannelWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "transport closed"));
        }
        self.outgoing
            .send(line.to_string())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
    }
}

impl Transport for ChannelTransport {
    fn connect(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn split(&mut self) -> io::Result<(Box<dyn LineRead>, Box<dyn LineWrite>)> {
        let incoming = self
            .incoming
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "already split"))?;
        let outgoing = self
            .outgoing
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "already split"))?;
        Ok((
            Box::new(ChannelReader {
                incoming,
                closed: Arc::clone(&self.closed),
                fail_reads: Arc::clone(&self.fail_reads),
            }),
            Box::new(ChannelWriter {
                outgoing,
                closed: Arc::clone(&self.closed),
            }),
        ))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

/// A session listener that records every notification as a tagged string.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingListener::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl SessionListener for RecordingListener {
    fn on_engine_message(&self, line: &str) {
        self.record(format!("engine:{line}"));
    }

    fn on_client_message(&self, line: &str) {
        self.record(format!("client:{line}"));
    }

    fn on_error(&self, err: &io::Error) {
        self.record(format!("error:{}", err.kind()));
    }

    fn on_disconnect(&self, requested: bool) {
        self.record(format!("disconnect:{requested}"));
    }
}

/// An event handler that records every client callback as a tagged string.
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<String>>,
    config: Mutex<Option<EngineConfig>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingHandler::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn initialized_config(&self) -> Option<EngineConfig> {
        self.config.lock().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl EngineEventHandler for RecordingHandler {
    fn on_initialized(&self, config: &EngineConfig) {
        *self.config.lock() = Some(config.clone());
        self.record("initialized".to_string());
    }

    fn on_ready(&self) {
        self.record("ready".to_string());
    }

    fn on_best_move(&self, best: &str, ponder: Option<&str>) {
        match ponder {
            Some(ponder) => self.record(format!("bestmove:{best}:{ponder}")),
            None => self.record(format!("bestmove:{best}")),
        }
    }

    fn on_info(&self, info: &SearchInfo) {
        self.record(format!("info:depth={:?}", info.depth));
    }

    fn on_protection(&self, kind: ProtectionKind, status: ProtectionStatus) {
        self.record(format!("protection:{kind:?}:{status:?}"));
    }

    fn on_error(&self, err: &ClientError) {
        self.record(format!("error:{err}"));
    }

    fn on_disconnect(&self, requested: bool) {
        self.record(format!("disconnect:{requested}"));
    }
}

/// A server listener that records lifecycle notifications.
#[derive(Default)]
pub struct RecordingServerListener {
    events: Mutex<Vec<String>>,
}

impl RecordingServerListener {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingServerListener::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl ServerListener for RecordingServerListener {
    fn on_started(&self, port: u16) {
        self.record(format!("started:{port}"));
    }

    fn on_client_connected(&self, _addr: std::net::SocketAddr) {
        self.record("connected".to_string());
    }

    fn on_session_ended(&self) {
        self.record("session-ended".to_string());
    }

    fn on_stopped(&self) {
        self.record("stopped".to_string());
    }
}
