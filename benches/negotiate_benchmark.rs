use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use webtree::ContentTypeNegotiator;

const CANDIDATES: &[&str] = &[
    "text/html",
    "html",
    "text/plain",
    "text",
    "application/json",
    "json",
    "image/svg+xml",
    "svg",
];

fn accept_parse_benchmark(c: &mut Criterion) {
    let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

    c.bench_function("accept_parse", |b| {
        b.iter(|| ContentTypeNegotiator::parse(black_box(accept)));
    });
}

fn best_match_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_match");

    let accepts = [
        ("browser", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        ("api", "application/json"),
        ("low_priority_svg", "text/csv;q=0.2, image/svg+xml;q=0.1"),
        ("empty", ""),
    ];

    for (name, accept) in accepts.iter() {
        let negotiator = ContentTypeNegotiator::new(accept);
        group.bench_with_input(BenchmarkId::from_parameter(name), &negotiator, |b, n| {
            b.iter(|| n.best_match(black_box(CANDIDATES), None));
        });
    }

    group.finish();
}

fn user_override_benchmark(c: &mut Criterion) {
    let negotiator = ContentTypeNegotiator::new("text/html");

    c.bench_function("best_match_override", |b| {
        b.iter(|| negotiator.best_match(black_box(CANDIDATES), Some(black_box("json"))));
    });
}

criterion_group!(
    benches,
    accept_parse_benchmark,
    best_match_benchmark,
    user_override_benchmark
);
criterion_main!(benches);
