//! A protocol-only fake engine for integration tests.
//!
//! Speaks just enough UCI over stdio to exercise the handshake, option
//! parsing and search flow. `go` always answers with the same move after a
//! token info line; there is no board and no search.

use std::io::{self, BufRead, Write};

use uci_bridge::uci::{
    EngineMessage, EngineOption, GoParams, IdInfo, OptionValue, Score, SearchInfo, UciCommand,
};

fn emit(out: &mut impl Write, msg: &EngineMessage) -> io::Result<()> {
    writeln!(out, "{msg}")?;
    out.flush()
}

fn identity() -> Vec<EngineMessage> {
    vec![
        EngineMessage::Id(IdInfo::Name("Stub Engine 1.0".to_string())),
        EngineMessage::Id(IdInfo::Author("uci_bridge tests".to_string())),
        EngineMessage::Option(EngineOption {
            name: "Hash".to_string(),
            value: OptionValue::Spin {
                default: 16,
                min: 1,
                max: 1024,
            },
        }),
        EngineMessage::Option(EngineOption {
            name: "Ponder".to_string(),
            value: OptionValue::Check { default: false },
        }),
        EngineMessage::Option(EngineOption {
            name: "Book File".to_string(),
            value: OptionValue::String {
                default: String::new(),
            },
        }),
        EngineMessage::UciOk,
    ]
}

fn search_reply(params: &GoParams) -> Vec<EngineMessage> {
    let info = SearchInfo {
        depth: params.depth.or(Some(1)),
        nodes: Some(100),
        score: Some(Score::Cp(13)),
        pv: vec!["e2e4".to_string(), "e7e5".to_string()],
        ..SearchInfo::default()
    };
    vec![
        EngineMessage::Info(info),
        EngineMessage::BestMove {
            best: "e2e4".to_string(),
            ponder: Some("e7e5".to_string()),
        },
    ]
}

fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        match UciCommand::parse(&line) {
            UciCommand::Uci => {
                for msg in identity() {
                    emit(&mut stdout, &msg)?;
                }
            }
            UciCommand::IsReady => emit(&mut stdout, &EngineMessage::ReadyOk)?,
            UciCommand::Go(params) => {
                for msg in search_reply(&params) {
                    emit(&mut stdout, &msg)?;
                }
            }
            UciCommand::Stop => {
                // A real engine replies with the best move found so far; we
                // already sent ours when the search started.
            }
            UciCommand::Quit => break,
            UciCommand::NewGame
            | UciCommand::SetOption { .. }
            | UciCommand::Position(_)
            | UciCommand::PonderHit
            | UciCommand::Unknown(_) => {}
        }
    }
    Ok(())
}
