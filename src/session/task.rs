//! Background pump threads owned by a session.
//!
//! Client mode runs a single engine-reader pump. Relay mode runs one pump
//! per direction, forwarding lines verbatim. Every pump counts down the
//! session latch on exit so `Session::wait` observes completion.

use std::io;
use std::sync::Arc;
use std::thread;

use log::trace;

use crate::transport::{LineRead, LineWrite};

use super::SessionShared;

/// Launch the single pump of a client-mode session.
pub(super) fn spawn_client(
    shared: &Arc<SessionShared>,
    engine_reader: Box<dyn LineRead>,
) -> io::Result<()> {
    shared.done.arm(1);
    let name = format!("{}-engine-rx", shared.name());
    let pump_shared = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name(name)
        .spawn(move || client_pump(&pump_shared, engine_reader));
    if let Err(err) = spawned {
        shared.done.count_down();
        return Err(err);
    }
    Ok(())
}

/// Launch both pumps of a relay-mode session.
pub(super) fn spawn_relay(
    shared: &Arc<SessionShared>,
    engine_reader: Box<dyn LineRead>,
    remote_reader: Box<dyn LineRead>,
    remote_writer: Box<dyn LineWrite>,
) -> io::Result<()> {
    shared.done.arm(2);
    let forward = {
        let shared = Arc::clone(shared);
        thread::Builder::new()
            .name(format!("{}-engine-rx", shared.name()))
            .spawn(move || engine_to_remote_pump(&shared, engine_reader, remote_writer))
    };
    if let Err(err) = forward {
        // The latch is armed for two tasks; account for the one that
        // never launched before reporting the failure.
        shared.done.count_down();
        shared.done.count_down();
        return Err(err);
    }

    let backward = {
        let shared = Arc::clone(shared);
        thread::Builder::new()
            .name(format!("{}-remote-rx", shared.name()))
            .spawn(move || remote_to_engine_pump(&shared, remote_reader))
    };
    if let Err(err) = backward {
        // Unblock the already-running forward pump and account for the
        // pump that never launched.
        shared.done.count_down();
        shared.teardown();
        return Err(err);
    }
    Ok(())
}

/// Read engine lines and hand them to the listener until EOF or stop.
fn client_pump(shared: &Arc<SessionShared>, mut engine_reader: Box<dyn LineRead>) {
    loop {
        match engine_reader.read_line() {
            Ok(Some(line)) => {
                if shared.stop_flag().is_set() {
                    break;
                }
                trace!("session '{}' engine: {line}", shared.name());
                if let Some(listener) = shared.listener() {
                    listener.on_engine_message(&line);
                }
            }
            Ok(None) => {
                shared.stop_session(false);
                break;
            }
            Err(err) => {
                if shared.stop_flag().is_set() {
                    break;
                }
                shared.fail_session(&err);
                break;
            }
        }
    }
    shared.done.count_down();
}

/// Forward engine lines to the remote peer, mirroring them to the listener.
fn engine_to_remote_pump(
    shared: &Arc<SessionShared>,
    mut engine_reader: Box<dyn LineRead>,
    mut remote_writer: Box<dyn LineWrite>,
) {
    loop {
        match engine_reader.read_line() {
            Ok(Some(line)) => {
                if shared.stop_flag().is_set() {
                    break;
                }
                trace!("session '{}' engine -> remote: {line}", shared.name());
                if let Err(err) = remote_writer.write_line(&line) {
                    shared.fail_session(&err);
                    break;
                }
                if let Some(listener) = shared.listener() {
                    listener.on_engine_message(&line);
                }
            }
            Ok(None) => {
                shared.stop_session(false);
                break;
            }
            Err(err) => {
                if shared.stop_flag().is_set() {
                    break;
                }
                shared.fail_session(&err);
                break;
            }
        }
    }
    shared.done.count_down();
}

/// Forward remote lines to the engine, mirroring them to the listener.
fn remote_to_engine_pump(shared: &Arc<SessionShared>, mut remote_reader: Box<dyn LineRead>) {
    loop {
        match remote_reader.read_line() {
            Ok(Some(line)) => {
                if shared.stop_flag().is_set() {
                    break;
                }
                trace!("session '{}' remote -> engine: {line}", shared.name());
                match shared.write_to_engine(&line) {
                    Ok(true) => {
                        if let Some(listener) = shared.listener() {
                            listener.on_client_message(&line);
                        }
                    }
                    Ok(false) => break,
                    Err(err) => {
                        shared.fail_session(&err);
                        break;
                    }
                }
            }
            Ok(None) => {
                shared.stop_session(false);
                break;
            }
            Err(err) => {
                if shared.stop_flag().is_set() {
                    break;
                }
                shared.fail_session(&err);
                break;
            }
        }
    }
    shared.done.count_down();
}
