//! # Regulator Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ctrl_lib::standoff_ctrl::Regulator;

fn regulator_benchmark(c: &mut Criterion) {
    // ---- Shipped second-order design ----

    let mut regulator = Regulator::new(vec![1.6334, -1.3013], vec![1.2, -0.36]);

    c.bench_function("Regulator::calculate_output", |b| {
        b.iter(|| regulator.calculate_output(black_box(3.5)))
    });

    // ---- Longer tap counts exercise the ring buffer rotation ----

    let mut long_regulator = Regulator::new(vec![0.02; 32], vec![0.01; 32]);

    c.bench_function("Regulator::calculate_output/32taps", |b| {
        b.iter(|| long_regulator.calculate_output(black_box(3.5)))
    });
}

criterion_group!(benches, regulator_benchmark);
criterion_main!(benches);
