//! Handshake probe: connect to an engine, print its identity and declared
//! options, then quit.
//!
//! Usage: `probe <engine-path>` or `probe <host>:<port>`.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use uci_bridge::sync::Latch;
use uci_bridge::{ClientError, ConnectionParams, EngineConfig, EngineEventHandler, UciClient};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

struct PrintConfig {
    done: Arc<Latch>,
}

impl EngineEventHandler for PrintConfig {
    fn on_initialized(&self, config: &EngineConfig) {
        if let Some(name) = &config.name {
            println!("name:    {name}");
        }
        if let Some(author) = &config.author {
            println!("author:  {author}");
        }
        for option in &config.options {
            println!("option:  {option}");
        }
        self.done.count_down();
    }

    fn on_error(&self, err: &ClientError) {
        eprintln!("error: {err}");
    }

    fn on_disconnect(&self, _requested: bool) {
        self.done.count_down();
    }
}

fn parse_target(raw: &str) -> Result<ConnectionParams, String> {
    if let Some((host, port)) = raw.rsplit_once(':') {
        if let Ok(port) = port.parse::<u16>() {
            return Ok(ConnectionParams::remote(host, port));
        }
    }
    ConnectionParams::process(raw).map_err(|err| err.to_string())
}

fn run() -> Result<(), String> {
    let target = env::args()
        .nth(1)
        .ok_or("usage: probe <engine-path | host:port>")?;
    let params = parse_target(&target)?;

    let done = Arc::new(Latch::new());
    done.arm(1);
    let handler = Arc::new(PrintConfig {
        done: Arc::clone(&done),
    });

    let client = UciClient::new(params.label(), params.open(), handler);
    client.start().map_err(|err| err.to_string())?;

    if !done.wait_timeout(HANDSHAKE_TIMEOUT) {
        client.stop();
        return Err("engine did not complete the handshake in time".to_string());
    }
    client.stop();
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
