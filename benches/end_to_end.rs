//! Generation-throughput benchmark.
//!
//! Builds pairwise-alignment machines of increasing size and measures one
//! full generation pass (analysis + sweeps + reduction) per target. Nothing
//! is cached between iterations; every call walks the whole machine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use weftc::codegen::SeqKind;
use weftc::{compile_forward, presets, Machine};

fn generate(machine: &Machine, target: &str) -> String {
    compile_forward(
        machine,
        SeqKind::TokenList,
        SeqKind::TokenList,
        target,
        "score",
    )
    .expect("generation")
}

/// Benchmark: machine size scaling on the js target.
fn bench_machine_size(c: &mut Criterion) {
    let two = presets::pair_hmm("psw", "ac", 0, false);
    let dna = presets::pair_hmm("psw", "acgt", 0, false);
    let mixture = presets::pair_hmm("psw", "acgt", 3, true);

    let mut group = c.benchmark_group("generate_js");
    group.bench_function("2_letter", |b| b.iter(|| generate(black_box(&two), "js")));
    group.bench_function("dna", |b| b.iter(|| generate(black_box(&dna), "js")));
    group.bench_function("dna_mix3", |b| {
        b.iter(|| generate(black_box(&mixture), "js"))
    });
    group.finish();
}

/// Benchmark: backend comparison on the DNA machine.
fn bench_targets(c: &mut Criterion) {
    let dna = presets::pair_hmm("psw", "acgt", 0, false);

    let mut group = c.benchmark_group("targets");
    group.bench_function("js", |b| b.iter(|| generate(black_box(&dna), "js")));
    group.bench_function("cpp", |b| b.iter(|| generate(black_box(&dna), "cpp")));
    group.finish();
}

/// Benchmark: model-file parse + validation.
fn bench_model_load(c: &mut Criterion) {
    let machine = presets::pair_hmm("psw", "acgt", 0, false);
    let text = serde_json::to_string(&machine.to_json_value()).expect("serialize");

    c.bench_function("load_dna_model", |b| {
        b.iter(|| {
            let m = Machine::from_json_str(black_box(&text)).expect("parse");
            m.validate().expect("validate");
            m
        })
    });
}

criterion_group!(benches, bench_machine_size, bench_targets, bench_model_load);
criterion_main!(benches);
