use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use squarewave_fit::trial::trial_observation;
use squarewave_fit::{best_match, encode, NoiseModel, TemplateLibrary, WaveParams};

fn bench_best_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_match");

    for nbits in [36usize, 128] {
        let library = TemplateLibrary::build(nbits);
        let truth = encode(&WaveParams::from_steps(6, 1, 2, nbits), nbits);
        let observation = trial_observation(&truth, &NoiseModel::new(0.9, 0.95), 42, 0);

        group.bench_with_input(BenchmarkId::from_parameter(nbits), &observation, |b, obs| {
            b.iter(|| best_match(black_box(obs), &library))
        });
    }

    group.finish();
}

fn bench_library_build(c: &mut Criterion) {
    c.bench_function("library_build_36", |b| {
        b.iter(|| TemplateLibrary::build(black_box(36)))
    });
}

criterion_group!(benches, bench_best_match, bench_library_build);
criterion_main!(benches);
