//! # Arc Length Search Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gnc_lib::path_ctrl::{ArcLengthSearch, Primitive, PrimitiveKind};
use nalgebra::Vector2;

fn arc_search_benchmark(c: &mut Criterion) {
    // ---- Build the curves ----

    let decorative = Primitive::new(
        PrimitiveKind::Decorative,
        Vector2::zeros(),
        Vector2::new(70.0, 70.0),
        30.0,
    );

    let figure_eight = Primitive::new(
        PrimitiveKind::FigureEight,
        Vector2::zeros(),
        Vector2::new(100.0, 100.0),
        30.0,
    );

    // One cycle's worth of progress at 10 m/s and 10 Hz
    c.bench_function("ArcLengthSearch::advance::decorative_cycle", |b| {
        let mut search = ArcLengthSearch::new(1e-3, 5000);
        let mut s = 0.0;
        b.iter(|| {
            s += 1.0;
            search.advance(black_box(s), |z| decorative.speed(z))
        })
    });

    // Full search of half a figure-eight from rest
    c.bench_function("ArcLengthSearch::advance::figure_eight_cold", |b| {
        b.iter(|| {
            let mut search = ArcLengthSearch::new(1e-3, u32::MAX);
            search.advance(black_box(250.0), |z| figure_eight.speed(z))
        })
    });
}

criterion_group!(benches, arc_search_benchmark);
criterion_main!(benches);
