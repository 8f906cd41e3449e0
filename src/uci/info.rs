//! Search information (`info …` lines).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Evaluation reported by the engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns from the engine's point of view.
    Cp(i32),
    /// Moves until mate (negative: engine is getting mated).
    Mate(i32),
}

/// Bound qualifier on a reported score.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// Parsed fields of one `info` line. Every field is optional; engines send
/// whatever subset they like, in whatever order they like.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    pub score_bound: Option<ScoreBound>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub hashfull: Option<u32>,
    pub time_ms: Option<u64>,
    pub currmove: Option<String>,
    /// Principal variation, raw move tokens.
    pub pv: Vec<String>,
    /// Line currently being calculated, raw move tokens.
    pub currline: Vec<String>,
    /// Free-text payload; consumes the rest of the line.
    pub string: Option<String>,
}

const KEYWORDS: &[&str] = &[
    "depth", "seldepth", "multipv", "score", "nodes", "nps", "hashfull", "time", "currmove",
    "currline", "pv", "string",
];

fn is_keyword(token: &str) -> bool {
    KEYWORDS.contains(&token)
}

/// Collect tokens until the next `info` keyword.
fn take_until_keyword<'a>(tokens: &[&'a str], i: &mut usize) -> Vec<&'a str> {
    let mut taken = Vec::new();
    while *i < tokens.len() && !is_keyword(tokens[*i]) {
        taken.push(tokens[*i]);
        *i += 1;
    }
    taken
}

fn parse_number<T: std::str::FromStr>(tokens: &[&str], i: &mut usize) -> Option<T> {
    let value = tokens.get(*i).and_then(|t| t.parse().ok());
    if value.is_some() {
        *i += 1;
    }
    value
}

/// Parse the tokens following the `info` keyword. Unknown tokens are
/// skipped; a malformed field leaves its slot empty rather than failing.
#[must_use]
pub(crate) fn parse_info_body(tokens: &[&str]) -> SearchInfo {
    let mut info = SearchInfo::default();
    let mut i = 0;

    while i < tokens.len() {
        let keyword = tokens[i];
        i += 1;
        match keyword {
            "depth" => info.depth = parse_number(tokens, &mut i),
            "seldepth" => info.seldepth = parse_number(tokens, &mut i),
            "multipv" => info.multipv = parse_number(tokens, &mut i),
            "nodes" => info.nodes = parse_number(tokens, &mut i),
            "nps" => info.nps = parse_number(tokens, &mut i),
            "hashfull" => info.hashfull = parse_number(tokens, &mut i),
            "time" => info.time_ms = parse_number(tokens, &mut i),
            "currmove" => {
                if let Some(mv) = tokens.get(i) {
                    info.currmove = Some((*mv).to_string());
                    i += 1;
                }
            }
            "score" => {
                match tokens.get(i).copied() {
                    Some("cp") => {
                        i += 1;
                        info.score = parse_number(tokens, &mut i).map(Score::Cp);
                    }
                    Some("mate") => {
                        i += 1;
                        info.score = parse_number(tokens, &mut i).map(Score::Mate);
                    }
                    _ => {}
                }
                match tokens.get(i).copied() {
                    Some("lowerbound") => {
                        info.score_bound = Some(ScoreBound::Lower);
                        i += 1;
                    }
                    Some("upperbound") => {
                        info.score_bound = Some(ScoreBound::Upper);
                        i += 1;
                    }
                    _ => {}
                }
            }
            "pv" => {
                info.pv = take_until_keyword(tokens, &mut i)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
            }
            "currline" => {
                info.currline = take_until_keyword(tokens, &mut i)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
            }
            "string" => {
                info.string = Some(tokens[i..].join(" "));
                i = tokens.len();
            }
            _ => {}
        }
    }

    info
}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "info")?;
        if let Some(depth) = self.depth {
            write!(f, " depth {depth}")?;
        }
        if let Some(seldepth) = self.seldepth {
            write!(f, " seldepth {seldepth}")?;
        }
        if let Some(multipv) = self.multipv {
            write!(f, " multipv {multipv}")?;
        }
        match self.score {
            Some(Score::Cp(cp)) => write!(f, " score cp {cp}")?,
            Some(Score::Mate(mate)) => write!(f, " score mate {mate}")?,
            None => {}
        }
        match self.score_bound {
            Some(ScoreBound::Lower) => write!(f, " lowerbound")?,
            Some(ScoreBound::Upper) => write!(f, " upperbound")?,
            None => {}
        }
        if let Some(nodes) = self.nodes {
            write!(f, " nodes {nodes}")?;
        }
        if let Some(nps) = self.nps {
            write!(f, " nps {nps}")?;
        }
        if let Some(hashfull) = self.hashfull {
            write!(f, " hashfull {hashfull}")?;
        }
        if let Some(time_ms) = self.time_ms {
            write!(f, " time {time_ms}")?;
        }
        if let Some(currmove) = &self.currmove {
            write!(f, " currmove {currmove}")?;
        }
        if !self.currline.is_empty() {
            write!(f, " currline {}", self.currline.join(" "))?;
        }
        if !self.pv.is_empty() {
            write!(f, " pv {}", self.pv.join(" "))?;
        }
        if let Some(string) = &self.string {
            write!(f, " string {string}")?;
        }
        Ok(())
    }
}
