//! Expose a local UCI engine to remote GUIs over a TCP tunnel.
//!
//! Usage: `uci_bridge <engine-path> [port]`. Lines crossing the tunnel are
//! echoed to stdout; typing `quit` shuts the server down.

use std::env;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;

use uci_bridge::{ConnectionParams, ServerListener, SessionListener, TunnelServer};

const DEFAULT_PORT: u16 = 3000;

struct EchoSession;

impl SessionListener for EchoSession {
    fn on_engine_message(&self, line: &str) {
        println!("< {line}");
    }

    fn on_client_message(&self, line: &str) {
        println!("> {line}");
    }

    fn on_error(&self, err: &io::Error) {
        eprintln!("session error: {err}");
    }

    fn on_disconnect(&self, requested: bool) {
        if requested {
            println!("session closed");
        } else {
            println!("client disconnected");
        }
    }
}

struct EchoServer;

impl ServerListener for EchoServer {
    fn on_started(&self, port: u16) {
        println!("listening on port {port}, type 'quit' to stop");
    }

    fn on_client_connected(&self, addr: std::net::SocketAddr) {
        println!("client connected: {addr}");
    }

    fn on_session_ended(&self) {
        println!("ready for the next client");
    }

    fn on_stopped(&self) {
        println!("server stopped");
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let engine_path = args.next().ok_or("usage: uci_bridge <engine-path> [port]")?;
    let port = match args.next() {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| format!("invalid port: {raw}"))?,
        None => DEFAULT_PORT,
    };

    let engine = ConnectionParams::process(&engine_path).map_err(|err| err.to_string())?;
    let server = TunnelServer::new(engine, port);
    server.set_session_listener(Arc::new(EchoSession));
    server.set_server_listener(Arc::new(EchoServer));
    server.start().map_err(|err| err.to_string())?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| err.to_string())?;
        if line.trim() == "quit" {
            break;
        }
    }

    server.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
