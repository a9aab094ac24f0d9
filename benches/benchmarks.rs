use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loadings::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn year_benchmark(c: &mut Criterion) {
    let gen = Synthetic::new().subbasins(5).units(8).days(365);
    let mut rng = StdRng::seed_from_u64(73);
    let sim = gen.simulation(&mut rng).unwrap();
    c.bench_function("year_5x8", |b| {
        b.iter(|| {
            let mut sim = sim.clone();
            let mut report = MemoryReport::new();
            sim.run(black_box(&mut report), |_| {}).unwrap();
            report
        })
    });
}

pub fn buildup_benchmark(c: &mut Criterion) {
    let gen = Synthetic::new()
        .subbasins(2)
        .units(4)
        .days(365)
        .methods(BuildUp::HalfSaturation, WashOff::RatingCurve);
    let mut rng = StdRng::seed_from_u64(11);
    let sim = gen.simulation(&mut rng).unwrap();
    c.bench_function("half_saturation_rating_curve", |b| {
        b.iter(|| {
            let mut sim = sim.clone();
            let mut report = MemoryReport::new();
            sim.run(black_box(&mut report), |_| {}).unwrap();
            report
        })
    });
}

criterion_group!(benches, year_benchmark, buildup_benchmark);
criterion_main!(benches);
