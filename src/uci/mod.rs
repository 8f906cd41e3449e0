//! Universal Chess Interface (UCI) message model.
//!
//! One parsed value per protocol line, in both directions: `EngineMessage`
//! for engine → GUI traffic and `UciCommand` for GUI → engine traffic.
//! Parsing never fails — anything unrecognized or malformed becomes an
//! `Unknown` value carrying the raw text. Move tokens are kept as raw
//! strings; this layer recognizes UCI token grammar, not chess semantics.

pub mod command;
pub mod info;
pub mod message;
pub mod options;

pub use command::{GoParams, UciCommand};
pub use info::{Score, ScoreBound, SearchInfo};
pub use message::{EngineMessage, IdInfo, ProtectionStatus};
pub use options::{EngineOption, OptionValue};

#[cfg(test)]
mod tests;
