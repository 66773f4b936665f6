//! Benchmarks for cohort simulation and encoding.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group};
use eventgen_stream::{Cohort, Encoding, Generator, cohort::Config};
use rand::{SeedableRng, rngs::SmallRng};
use std::time::Duration;

fn cohort_setup(c: &mut Criterion) {
    c.bench_function("cohort_setup", |b| {
        b.iter(|| {
            let _cohort = Cohort::new(Config::default()).expect("valid config");
        })
    });
}

fn cohort_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("cohort_generate");
    for users in &[100_u32, 1_000, 5_000] {
        group.throughput(Throughput::Elements(u64::from(*users)));
        group.bench_with_input(BenchmarkId::from_parameter(users), users, |b, &users| {
            let cohort = Cohort::new(Config {
                users,
                ..Config::default()
            })
            .expect("valid config");
            b.iter(|| {
                let mut rng = SmallRng::seed_from_u64(19690716);
                cohort.generate(&mut rng).expect("failed to generate")
            });
        });
    }
    group.finish();
}

fn cohort_encode(c: &mut Criterion) {
    let cohort = Cohort::new(Config::default()).expect("valid config");
    let mut rng = SmallRng::seed_from_u64(19690716);
    let log = cohort.generate(&mut rng).expect("failed to generate");

    let mut group = c.benchmark_group("cohort_encode");
    group.throughput(Throughput::Elements(log.records().len() as u64));
    for encoding in [Encoding::Csv, Encoding::Json] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{encoding:?}")),
            &encoding,
            |b, &encoding| {
                b.iter(|| {
                    let mut writer = Vec::with_capacity(16 * 1_048_576);
                    encoding
                        .to_bytes(&log, &mut writer)
                        .expect("failed to encode");
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(30));
    targets = cohort_setup, cohort_generate, cohort_encode
);
