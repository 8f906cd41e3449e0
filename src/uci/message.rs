//! Engine → GUI messages.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::info::{parse_info_body, SearchInfo};
use super::options::{parse_option_body, EngineOption};

/// Payload of an `id` line.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdInfo {
    Name(String),
    Author(String),
}

/// Status reported by `copyprotection` and `registration` lines.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionStatus {
    Checking,
    Ok,
    Error,
}

impl ProtectionStatus {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "checking" => Some(ProtectionStatus::Checking),
            "ok" => Some(ProtectionStatus::Ok),
            "error" => Some(ProtectionStatus::Error),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ProtectionStatus::Checking => "checking",
            ProtectionStatus::Ok => "ok",
            ProtectionStatus::Error => "error",
        }
    }
}

/// One parsed line of engine output, tagged by message kind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// Engine identification (`id name …` / `id author …`).
    Id(IdInfo),
    /// Option declaration.
    Option(EngineOption),
    /// Protocol acknowledgment (`uciok`).
    UciOk,
    /// Readiness acknowledgment (`readyok`).
    ReadyOk,
    /// Search result, with an optional ponder move.
    BestMove { best: String, ponder: Option<String> },
    /// Informational search data.
    Info(SearchInfo),
    /// Copy-protection status.
    CopyProtection(ProtectionStatus),
    /// Registration status.
    Registration(ProtectionStatus),
    /// Anything unrecognized or malformed, kept verbatim.
    Unknown(String),
}

impl EngineMessage {
    /// Parse one line of engine output. Never fails: lines that do not
    /// match the UCI grammar come back as `Unknown`.
    #[must_use]
    pub fn parse(line: &str) -> EngineMessage {
        let trimmed = line.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let unknown = || EngineMessage::Unknown(trimmed.to_string());

        let Some(&first) = tokens.first() else {
            return unknown();
        };

        match first {
            "id" => match tokens.get(1).copied() {
                Some("name") if tokens.len() > 2 => {
                    EngineMessage::Id(IdInfo::Name(tokens[2..].join(" ")))
                }
                Some("author") if tokens.len() > 2 => {
                    EngineMessage::Id(IdInfo::Author(tokens[2..].join(" ")))
                }
                _ => unknown(),
            },
            "option" => match parse_option_body(&tokens[1..]) {
                Some(option) => EngineMessage::Option(option),
                None => unknown(),
            },
            "uciok" => EngineMessage::UciOk,
            "readyok" => EngineMessage::ReadyOk,
            "bestmove" => match tokens.get(1) {
                Some(best) => {
                    let ponder = match (tokens.get(2).copied(), tokens.get(3)) {
                        (Some("ponder"), Some(mv)) => Some((*mv).to_string()),
                        _ => None,
                    };
                    EngineMessage::BestMove {
                        best: (*best).to_string(),
                        ponder,
                    }
                }
                None => unknown(),
            },
            "info" => EngineMessage::Info(parse_info_body(&tokens[1..])),
            "copyprotection" => match tokens.get(1).and_then(|t| ProtectionStatus::parse(t)) {
                Some(status) => EngineMessage::CopyProtection(status),
                None => unknown(),
            },
            "registration" => match tokens.get(1).and_then(|t| ProtectionStatus::parse(t)) {
                Some(status) => EngineMessage::Registration(status),
                None => unknown(),
            },
            _ => unknown(),
        }
    }
}

impl fmt::Display for EngineMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMessage::Id(IdInfo::Name(name)) => write!(f, "id name {name}"),
            EngineMessage::Id(IdInfo::Author(author)) => write!(f, "id author {author}"),
            EngineMessage::Option(option) => write!(f, "{option}"),
            EngineMessage::UciOk => write!(f, "uciok"),
            EngineMessage::ReadyOk => write!(f, "readyok"),
            EngineMessage::BestMove { best, ponder } => {
                write!(f, "bestmove {best}")?;
                if let Some(ponder) = ponder {
                    write!(f, " ponder {ponder}")?;
                }
                Ok(())
            }
            EngineMessage::Info(info) => write!(f, "{info}"),
            EngineMessage::CopyProtection(status) => {
                write!(f, "copyprotection {}", status.as_str())
            }
            EngineMessage::Registration(status) => {
                write!(f, "registration {}", status.as_str())
            }
            EngineMessage::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}
