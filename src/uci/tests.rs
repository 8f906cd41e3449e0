//! Message model tests.

use super::*;
use proptest::prelude::*;

#[test]
fn parse_id_lines() {
    assert_eq!(
        EngineMessage::parse("id name Stockfish 16"),
        EngineMessage::Id(IdInfo::Name("Stockfish 16".to_string()))
    );
    assert_eq!(
        EngineMessage::parse("id author The Stockfish developers"),
        EngineMessage::Id(IdInfo::Author("The Stockfish developers".to_string()))
    );
    // An id line without a payload is not identification.
    assert!(matches!(
        EngineMessage::parse("id name"),
        EngineMessage::Unknown(_)
    ));
}

#[test]
fn parse_acks() {
    assert_eq!(EngineMessage::parse("uciok"), EngineMessage::UciOk);
    assert_eq!(EngineMessage::parse("  readyok  "), EngineMessage::ReadyOk);
}

#[test]
fn parse_bestmove_with_and_without_ponder() {
    assert_eq!(
        EngineMessage::parse("bestmove e2e4"),
        EngineMessage::BestMove {
            best: "e2e4".to_string(),
            ponder: None
        }
    );
    assert_eq!(
        EngineMessage::parse("bestmove e2e4 ponder e7e5"),
        EngineMessage::BestMove {
            best: "e2e4".to_string(),
            ponder: Some("e7e5".to_string())
        }
    );
}

#[test]
fn parse_spin_option_any_field_order() {
    let expected = EngineMessage::Option(EngineOption {
        name: "Depth".to_string(),
        value: OptionValue::Spin {
            default: 2,
            min: 1,
            max: 3,
        },
    });
    assert_eq!(
        EngineMessage::parse("option name Depth type spin default 2 min 1 max 3"),
        expected
    );
    assert_eq!(
        EngineMessage::parse("option name Depth type spin max 3 default 2 min 1"),
        expected
    );
    assert_eq!(
        EngineMessage::parse("option name Depth type spin min 1 max 3 default 2"),
        expected
    );
}

#[test]
fn parse_multiword_option_name() {
    let msg = EngineMessage::parse("option name Move Overhead type spin default 50 min 0 max 1000");
    let EngineMessage::Option(option) = msg else {
        panic!("expected option, got {msg:?}");
    };
    assert_eq!(option.name, "Move Overhead");
}

#[test]
fn parse_combo_option_with_vars() {
    let msg = EngineMessage::parse(
        "option name Style type combo default Normal var Solid var Normal var Risky",
    );
    assert_eq!(
        msg,
        EngineMessage::Option(EngineOption {
            name: "Style".to_string(),
            value: OptionValue::Combo {
                default: "Normal".to_string(),
                choices: vec![
                    "Solid".to_string(),
                    "Normal".to_string(),
                    "Risky".to_string()
                ],
            },
        })
    );
}

#[test]
fn parse_string_option_with_empty_default() {
    let msg = EngineMessage::parse("option name BookPath type string default");
    assert_eq!(
        msg,
        EngineMessage::Option(EngineOption {
            name: "BookPath".to_string(),
            value: OptionValue::String {
                default: String::new()
            },
        })
    );
    assert_eq!(msg.to_string(), "option name BookPath type string default");
}

#[test]
fn malformed_option_is_unknown_not_error() {
    // spin without bounds
    assert!(matches!(
        EngineMessage::parse("option name Hash type spin default 64"),
        EngineMessage::Unknown(_)
    ));
    // unknown type
    assert!(matches!(
        EngineMessage::parse("option name X type float default 1.0"),
        EngineMessage::Unknown(_)
    ));
}

#[test]
fn parse_info_line_out_of_order() {
    let msg = EngineMessage::parse("info nodes 4242 score cp 25 depth 8 time 137 pv e2e4 e7e5");
    let EngineMessage::Info(info) = msg else {
        panic!("expected info");
    };
    assert_eq!(info.depth, Some(8));
    assert_eq!(info.nodes, Some(4242));
    assert_eq!(info.time_ms, Some(137));
    assert_eq!(info.score, Some(Score::Cp(25)));
    assert_eq!(info.pv, vec!["e2e4".to_string(), "e7e5".to_string()]);
}

#[test]
fn parse_info_string_consumes_rest_of_line() {
    let msg = EngineMessage::parse("info string NNUE evaluation using nn.bin enabled");
    let EngineMessage::Info(info) = msg else {
        panic!("expected info");
    };
    assert_eq!(
        info.string.as_deref(),
        Some("NNUE evaluation using nn.bin enabled")
    );
}

#[test]
fn parse_info_score_bounds() {
    let msg = EngineMessage::parse("info depth 5 score cp 90 lowerbound nodes 100");
    let EngineMessage::Info(info) = msg else {
        panic!("expected info");
    };
    assert_eq!(info.score, Some(Score::Cp(90)));
    assert_eq!(info.score_bound, Some(ScoreBound::Lower));
    assert_eq!(info.nodes, Some(100));
}

#[test]
fn parse_protection_lines() {
    assert_eq!(
        EngineMessage::parse("copyprotection checking"),
        EngineMessage::CopyProtection(ProtectionStatus::Checking)
    );
    assert_eq!(
        EngineMessage::parse("registration error"),
        EngineMessage::Registration(ProtectionStatus::Error)
    );
    assert!(matches!(
        EngineMessage::parse("copyprotection maybe"),
        EngineMessage::Unknown(_)
    ));
}

#[test]
fn garbage_lines_are_unknown_and_kept_verbatim() {
    let raw = "Fatal error: book file missing";
    assert_eq!(
        EngineMessage::parse(raw),
        EngineMessage::Unknown(raw.to_string())
    );
    assert_eq!(EngineMessage::parse(raw).to_string(), raw);
}

#[test]
fn command_serialization() {
    assert_eq!(UciCommand::Uci.to_string(), "uci");
    assert_eq!(UciCommand::IsReady.to_string(), "isready");
    assert_eq!(UciCommand::NewGame.to_string(), "ucinewgame");
    assert_eq!(UciCommand::Stop.to_string(), "stop");
    assert_eq!(UciCommand::PonderHit.to_string(), "ponderhit");
    assert_eq!(UciCommand::Quit.to_string(), "quit");
    assert_eq!(
        UciCommand::Go(GoParams::depth(6)).to_string(),
        "go depth 6"
    );
    assert_eq!(
        UciCommand::Go(GoParams::movetime(5000)).to_string(),
        "go movetime 5000"
    );
    assert_eq!(UciCommand::Go(GoParams::infinite()).to_string(), "go infinite");
    assert_eq!(
        UciCommand::SetOption {
            name: "MultiPV".to_string(),
            value: Some("3".to_string())
        }
        .to_string(),
        "setoption name MultiPV value 3"
    );
}

#[test]
fn command_round_trip() {
    let lines = [
        "uci",
        "isready",
        "ucinewgame",
        "setoption name Move Overhead value 30",
        "position startpos moves e2e4 e7e5",
        "go wtime 300000 btime 300000 winc 5000 binc 5000",
        "go depth 4 ponder",
        "ponderhit",
        "stop",
        "quit",
    ];
    for line in lines {
        let cmd = UciCommand::parse(line);
        assert_eq!(cmd.to_string(), line, "round trip failed for {line}");
    }
}

#[cfg(feature = "serde")]
#[test]
fn messages_serialize_to_json() {
    let msg = EngineMessage::parse("info depth 3 score cp 12 pv e2e4");
    let json = serde_json::to_string(&msg).unwrap();
    let back: EngineMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);

    let cmd = UciCommand::parse("go movetime 1000");
    let json = serde_json::to_string(&cmd).unwrap();
    let back: UciCommand = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cmd);
}

// Words that would be taken for field keywords by the option parser; a
// generated name or value colliding with one is not expected to round-trip.
const OPTION_KEYWORDS: &[&str] = &["name", "type", "default", "min", "max", "var"];

fn ident() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,11}".prop_filter("option keyword", |s| {
        !OPTION_KEYWORDS.contains(&s.as_str())
    })
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_filter("option keyword", |s| !OPTION_KEYWORDS.contains(&s.as_str()))
}

fn option_strategy() -> impl Strategy<Value = EngineOption> {
    prop_oneof![
        (ident(), any::<bool>()).prop_map(|(name, default)| EngineOption {
            name,
            value: OptionValue::Check { default },
        }),
        (ident(), -1000i64..1000, 0i64..100).prop_map(|(name, default, span)| EngineOption {
            name,
            value: OptionValue::Spin {
                default,
                min: default - span,
                max: default + span,
            },
        }),
        (ident(), word(), prop::collection::vec(word(), 1..4)).prop_map(
            |(name, default, choices)| EngineOption {
                name,
                value: OptionValue::Combo { default, choices },
            }
        ),
        ident().prop_map(|name| EngineOption {
            name,
            value: OptionValue::Button,
        }),
        (ident(), word()).prop_map(|(name, default)| EngineOption {
            name,
            value: OptionValue::String { default },
        }),
    ]
}

proptest! {
    /// Declared options survive a serialize/parse cycle with every field intact.
    #[test]
    fn prop_option_round_trip(option in option_strategy()) {
        let line = EngineMessage::Option(option.clone()).to_string();
        prop_assert_eq!(EngineMessage::parse(&line), EngineMessage::Option(option));
    }

    /// Parsing arbitrary input never panics.
    #[test]
    fn prop_parse_never_panics(line in "\\PC{0,60}") {
        let _ = EngineMessage::parse(&line);
        let _ = UciCommand::parse(&line);
    }

    /// Info lines round-trip through their canonical form.
    #[test]
    fn prop_info_round_trip(
        depth in proptest::option::of(0u32..64),
        nodes in proptest::option::of(0u64..1_000_000),
        cp in proptest::option::of(-3000i32..3000),
        pv in prop::collection::vec("[a-h][1-8][a-h][1-8]", 0..5),
    ) {
        let info = SearchInfo {
            depth,
            nodes,
            score: cp.map(Score::Cp),
            pv,
            ..SearchInfo::default()
        };
        let line = EngineMessage::Info(info.clone()).to_string();
        prop_assert_eq!(EngineMessage::parse(&line), EngineMessage::Info(info));
    }
}
