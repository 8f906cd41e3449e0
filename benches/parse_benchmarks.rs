//! Line parsing throughput. The client parses every engine line on the pump
//! thread, so parse cost bounds message latency during deep searches.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use uci_bridge::uci::{EngineMessage, UciCommand};

fn bench_parse(c: &mut Criterion) {
    let info_line = "info depth 24 seldepth 31 multipv 1 score cp 43 nodes 18345210 \
                     nps 1204931 hashfull 412 time 15224 pv e2e4 e7e5 g1f3 b8c6 f1b5 a7a6";
    let option_line = "option name SyzygyPath type string default <empty>";
    let bestmove_line = "bestmove e2e4 ponder e7e5";
    let go_line = "go wtime 300000 btime 300000 winc 5000 binc 5000 movestogo 40";

    c.bench_function("parse_info_line", |b| {
        b.iter(|| EngineMessage::parse(black_box(info_line)));
    });
    c.bench_function("parse_option_line", |b| {
        b.iter(|| EngineMessage::parse(black_box(option_line)));
    });
    c.bench_function("parse_bestmove_line", |b| {
        b.iter(|| EngineMessage::parse(black_box(bestmove_line)));
    });
    c.bench_function("parse_go_command", |b| {
        b.iter(|| UciCommand::parse(black_box(go_line)));
    });
    c.bench_function("serialize_info_line", |b| {
        let msg = EngineMessage::parse(info_line);
        b.iter(|| black_box(&msg).to_string());
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
