//! Benchmarks for the interrogation text pipeline.
//!
//! Run with: cargo bench -p tagbatch-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagbatch_core::config::InterrogationConfig;
use tagbatch_core::orchestrator::post_process;
use tagbatch_core::prompt::{compose, insertion_preview};
use tagbatch_core::text::{
    dedup_comma_list, filter_overlap, strip_punctuation_preserving_emoticons, ReplacePairSet,
};
use tagbatch_core::PlacementPolicy;

/// A tagger-sized interrogation: a few dozen tags with repeats.
fn interrogation() -> String {
    let tags = [
        "1girl", "solo", "long_hair", "smile", "looking_at_viewer", "outdoors", "sky", "cloud",
        "tree", "dress", "white_dress", "hat", "flower", "holding", "day", ":d", "blue_eyes",
    ];
    tags.iter()
        .chain(tags.iter().take(8))
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn prompt() -> &'static str {
    "masterpiece, best quality, (solo:1.2), <lora:style:0.8>, \\(artist\\), detailed background"
}

fn benchmark_dedup(c: &mut Criterion) {
    let text = interrogation();
    c.bench_function("dedup_comma_list", |b| {
        b.iter(|| dedup_comma_list(black_box(&text)))
    });
}

fn benchmark_filter(c: &mut Criterion) {
    let text = interrogation();
    c.bench_function("filter_overlap", |b| {
        b.iter(|| filter_overlap(black_box(&text), black_box(prompt())))
    });
}

fn benchmark_punctuation(c: &mut Criterion) {
    let text = format!("{}, happy :), wink ;), >_<!", interrogation());
    c.bench_function("strip_punctuation_preserving_emoticons", |b| {
        b.iter(|| strip_punctuation_preserving_emoticons(black_box(&text)))
    });
}

fn benchmark_replace(c: &mut Criterion) {
    let text = interrogation();
    let pairs = ReplacePairSet::parse("1girl, dress, sky", "1woman, gown, heavens");
    c.bench_function("replace_pairs", |b| b.iter(|| pairs.apply(black_box(&text))));
}

fn benchmark_full_chain(c: &mut Criterion) {
    let text = interrogation();
    let options = InterrogationConfig {
        use_positive_filter: true,
        use_custom_filter: true,
        custom_filter: "hat, flower".to_string(),
        use_custom_replace: true,
        custom_find: "1girl".to_string(),
        custom_replace: "1woman".to_string(),
        no_punctuation_mode: true,
        ..Default::default()
    };
    let placement = PlacementPolicy::Prepend;

    c.bench_function("post_process_and_compose", |b| {
        b.iter(|| {
            let cleaned = post_process(black_box(&text), prompt(), "lowres", &options);
            compose(prompt(), "lowres", &cleaned, &placement, false)
        })
    });
}

fn benchmark_preview(c: &mut Criterion) {
    c.bench_function("insertion_preview", |b| {
        b.iter(|| insertion_preview(black_box(prompt()), black_box(3)))
    });
}

criterion_group!(
    benches,
    benchmark_dedup,
    benchmark_filter,
    benchmark_punctuation,
    benchmark_replace,
    benchmark_full_chain,
    benchmark_preview
);
criterion_main!(benches);
