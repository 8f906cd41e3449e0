//! Transport over a spawned engine process.

use std::io::{self, PipeReader};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use super::{not_connected, IoLineReader, IoLineWriter, LineRead, LineWrite, Transport};

/// Grace period for voluntary exit before the child is killed.
///
/// Long enough for a well-behaved engine to flush its quit sequence, short
/// enough that closing a wedged engine stays responsive.
const EXIT_GRACE_MS: u64 = 500;

/// Poll interval while waiting for the child to exit.
const EXIT_POLL_MS: u64 = 20;

/// A UCI engine spawned as a child process.
///
/// The child's stderr is merged into its stdout pipe, so engine debug
/// chatter arrives interleaved on the same line stream a GUI would see.
pub struct ProcessTransport {
    path: PathBuf,
    child: Option<Child>,
    reader: Option<PipeReader>,
    writer: Option<ChildStdin>,
}

impl ProcessTransport {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        ProcessTransport {
            path,
            child: None,
            reader: None,
            writer: None,
        }
    }
}

impl Transport for ProcessTransport {
    fn connect(&mut self) -> io::Result<()> {
        let (pipe_reader, pipe_writer) = io::pipe()?;
        let stderr_writer = pipe_writer.try_clone()?;

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(pipe_writer))
            .stderr(Stdio::from(stderr_writer))
            .spawn()?;

        // Command and its Stdio handles drop here; the only write ends of
        // the pipe left open belong to the child, so EOF tracks its exit.
        self.writer = child.stdin.take();
        self.reader = Some(pipe_reader);
        self.child = Some(child);
        Ok(())
    }

    fn split(&mut self) -> io::Result<(Box<dyn LineRead>, Box<dyn LineWrite>)> {
        let reader = self.reader.take().ok_or_else(not_connected)?;
        let writer = self.writer.take().ok_or_else(not_connected)?;
        Ok((
            Box::new(IoLineReader::new(reader)),
            Box::new(IoLineWriter::new(writer)),
        ))
    }

    fn close(&mut self) {
        // Drop unsplit halves so the child sees EOF on stdin.
        self.reader = None;
        self.writer = None;

        let Some(mut child) = self.child.take() else {
            return;
        };

        let deadline = Instant::now() + Duration::from_millis(EXIT_GRACE_MS);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("engine process exited voluntarily: {status}");
                    return;
                }
                Ok(None) => {}
                Err(err) => {
                    debug!("try_wait on engine process failed: {err}");
                    break;
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(Duration::from_millis(EXIT_POLL_MS));
        }

        if let Err(err) = child.kill() {
            debug!("kill on engine process failed: {err}");
        }
        let _ = child.wait();
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        self.close();
    }
}
