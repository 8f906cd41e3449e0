//! GUI → engine commands.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a `go` command. Unset fields are omitted on the wire.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime_ms: Option<u64>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movestogo: Option<u32>,
    pub nodes: Option<u64>,
    pub ponder: bool,
    pub infinite: bool,
}

impl GoParams {
    /// Fixed-depth search.
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        GoParams {
            depth: Some(depth),
            ..GoParams::default()
        }
    }

    /// Fixed time per move, in milliseconds.
    #[must_use]
    pub fn movetime(ms: u64) -> Self {
        GoParams {
            movetime_ms: Some(ms),
            ..GoParams::default()
        }
    }

    /// Search until stopped.
    #[must_use]
    pub fn infinite() -> Self {
        GoParams {
            infinite: true,
            ..GoParams::default()
        }
    }
}

/// One command a GUI sends to an engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Protocol start (`uci`).
    Uci,
    /// Readiness check (`isready`).
    IsReady,
    /// New game (`ucinewgame`).
    NewGame,
    /// Option assignment.
    SetOption { name: String, value: Option<String> },
    /// Position setup; arguments kept raw (board semantics live elsewhere).
    Position(Vec<String>),
    /// Start searching.
    Go(GoParams),
    /// The pondered move was played.
    PonderHit,
    /// Stop the current search.
    Stop,
    /// Shut the engine down.
    Quit,
    /// Anything unrecognized, kept verbatim.
    Unknown(String),
}

impl UciCommand {
    /// Parse one line of GUI input. Never fails; unrecognized lines come
    /// back as `Unknown`.
    #[must_use]
    pub fn parse(line: &str) -> UciCommand {
        let trimmed = line.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let Some(&first) = tokens.first() else {
            return UciCommand::Unknown(trimmed.to_string());
        };

        match first {
            "uci" => UciCommand::Uci,
            "isready" => UciCommand::IsReady,
            "ucinewgame" => UciCommand::NewGame,
            "setoption" => match parse_setoption(&tokens[1..]) {
                Some((name, value)) => UciCommand::SetOption { name, value },
                None => UciCommand::Unknown(trimmed.to_string()),
            },
            "position" => {
                UciCommand::Position(tokens[1..].iter().map(|t| (*t).to_string()).collect())
            }
            "go" => UciCommand::Go(parse_go(&tokens[1..])),
            "ponderhit" => UciCommand::PonderHit,
            "stop" => UciCommand::Stop,
            "quit" => UciCommand::Quit,
            _ => UciCommand::Unknown(trimmed.to_string()),
        }
    }
}

fn parse_setoption(tokens: &[&str]) -> Option<(String, Option<String>)> {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for token in tokens {
        match *token {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(token),
                "value" => value_parts.push(token),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };
    Some((name_parts.join(" "), value))
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 0;

    while i < tokens.len() {
        let keyword = tokens[i];
        i += 1;
        let number = |i: &mut usize| -> Option<u64> {
            let value = tokens.get(*i).and_then(|t| t.parse().ok());
            if value.is_some() {
                *i += 1;
            }
            value
        };
        match keyword {
            "depth" => params.depth = number(&mut i).map(|v| v as u32),
            "movetime" => params.movetime_ms = number(&mut i),
            "wtime" => params.wtime_ms = number(&mut i),
            "btime" => params.btime_ms = number(&mut i),
            "winc" => params.winc_ms = number(&mut i),
            "binc" => params.binc_ms = number(&mut i),
            "movestogo" => params.movestogo = number(&mut i).map(|v| v as u32),
            "nodes" => params.nodes = number(&mut i),
            "ponder" => params.ponder = true,
            "infinite" => params.infinite = true,
            _ => {}
        }
    }

    params
}

impl fmt::Display for UciCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciCommand::Uci => write!(f, "uci"),
            UciCommand::IsReady => write!(f, "isready"),
            UciCommand::NewGame => write!(f, "ucinewgame"),
            UciCommand::SetOption { name, value } => {
                write!(f, "setoption name {name}")?;
                if let Some(value) = value {
                    write!(f, " value {value}")?;
                }
                Ok(())
            }
            UciCommand::Position(args) => {
                write!(f, "position")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            UciCommand::Go(params) => {
                write!(f, "go")?;
                if let Some(depth) = params.depth {
                    write!(f, " depth {depth}")?;
                }
                if let Some(ms) = params.movetime_ms {
                    write!(f, " movetime {ms}")?;
                }
                if let Some(ms) = params.wtime_ms {
                    write!(f, " wtime {ms}")?;
                }
                if let Some(ms) = params.btime_ms {
                    write!(f, " btime {ms}")?;
                }
                if let Some(ms) = params.winc_ms {
                    write!(f, " winc {ms}")?;
                }
                if let Some(ms) = params.binc_ms {
                    write!(f, " binc {ms}")?;
                }
                if let Some(moves) = params.movestogo {
                    write!(f, " movestogo {moves}")?;
                }
                if let Some(nodes) = params.nodes {
                    write!(f, " nodes {nodes}")?;
                }
                if params.ponder {
                    write!(f, " ponder")?;
                }
                if params.infinite {
                    write!(f, " infinite")?;
                }
                Ok(())
            }
            UciCommand::PonderHit => write!(f, "ponderhit"),
            UciCommand::Stop => write!(f, "stop"),
            UciCommand::Quit => write!(f, "quit"),
            UciCommand::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}
