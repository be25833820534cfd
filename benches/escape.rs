#[macro_use]
extern crate criterion;
extern crate mandel;
extern crate num;

use criterion::Criterion;
use num::Complex;

fn escape_benchmark(c: &mut Criterion) {
    c.bench_function("interior point runs to the cap", |b| {
        b.iter(|| mandel::escape_time(Complex::new(-0.1, 0.1), 1000))
    });
    c.bench_function("exterior point escapes early", |b| {
        b.iter(|| mandel::escape_time(Complex::new(0.5, 0.5), 1000))
    });
}

criterion_group!(benches, escape_benchmark);
criterion_main!(benches);
