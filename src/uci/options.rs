//! Engine option declarations (`option name … type …` lines).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Typed payload of an option declaration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Boolean toggle.
    Check { default: bool },
    /// Integer with inclusive bounds.
    Spin { default: i64, min: i64, max: i64 },
    /// One value out of an enumerated set.
    Combo { default: String, choices: Vec<String> },
    /// Stateless action.
    Button,
    /// Free-form text.
    String { default: String },
}

/// A single option an engine declared during the handshake.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOption {
    pub name: String,
    pub value: OptionValue,
}

/// Parse the tokens following the `option` keyword.
///
/// The `name`/`type`/`default`/`min`/`max`/`var` keywords may appear in any
/// order after the name; multi-word names and defaults are supported.
/// Returns `None` when the declaration has no name, an unknown type, or a
/// numeric field that does not parse.
#[must_use]
pub(crate) fn parse_option_body(tokens: &[&str]) -> Option<EngineOption> {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut kind: Option<&str> = None;
    let mut default_parts: Vec<&str> = Vec::new();
    let mut min: Option<&str> = None;
    let mut max: Option<&str> = None;
    let mut vars: Vec<Vec<&str>> = Vec::new();
    let mut mode = "";

    for token in tokens {
        match *token {
            "name" => mode = "name",
            "type" => mode = "type",
            "default" => mode = "default",
            "min" => mode = "min",
            "max" => mode = "max",
            "var" => {
                mode = "var";
                vars.push(Vec::new());
            }
            value => match mode {
                "name" => name_parts.push(value),
                "type" => kind = Some(value),
                "default" => default_parts.push(value),
                "min" => min = Some(value),
                "max" => max = Some(value),
                "var" => {
                    if let Some(last) = vars.last_mut() {
                        last.push(value);
                    }
                }
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }
    let name = name_parts.join(" ");
    let default = default_parts.join(" ");

    let value = match kind? {
        "check" => OptionValue::Check {
            default: default == "true",
        },
        "spin" => OptionValue::Spin {
            default: default.parse().ok()?,
            min: min?.parse().ok()?,
            max: max?.parse().ok()?,
        },
        "combo" => OptionValue::Combo {
            default,
            choices: vars.iter().map(|parts| parts.join(" ")).collect(),
        },
        "button" => OptionValue::Button,
        // "default" with no following token declares an empty string.
        "string" => OptionValue::String { default },
        _ => return None,
    };

    Some(EngineOption { name, value })
}

impl fmt::Display for EngineOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option name {} type ", self.name)?;
        match &self.value {
            OptionValue::Check { default } => {
                write!(f, "check default {default}")
            }
            OptionValue::Spin { default, min, max } => {
                write!(f, "spin default {default} min {min} max {max}")
            }
            OptionValue::Combo { default, choices } => {
                write!(f, "combo default {default}")?;
                for choice in choices {
                    write!(f, " var {choice}")?;
                }
                Ok(())
            }
            OptionValue::Button => write!(f, "button"),
            OptionValue::String { default } => {
                if default.is_empty() {
                    write!(f, "string default")
                } else {
                    write!(f, "string default {default}")
                }
            }
        }
    }
}
