use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nicebin_core::Value;
use nicebin_histogram::{bin, histogram, BinOptions, HistogramOptions};
use rand::prelude::*;
use rand_distr::Normal;

/// Generate normal data
fn generate_normal_data(size: usize, mean: f64, std: f64, seed: u64) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(mean, std).unwrap();
    (0..size)
        .map(|_| Value::from(normal.sample(&mut rng)))
        .collect()
}

/// Generate dates spread over roughly thirty years
fn generate_dates(size: usize, seed: u64) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(seed);
    let origin: NaiveDateTime = NaiveDate::from_ymd_opt(1990, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..size)
        .map(|_| {
            let minutes = rng.gen_range(0..30 * 365 * 24 * 60);
            Value::from(origin + TimeDelta::try_minutes(minutes).unwrap())
        })
        .collect()
}

/// Generate words from a small vocabulary
fn generate_words(size: usize, seed: u64) -> Vec<Value> {
    const WORDS: [&str; 8] = ["alpha", "beta", "gamma", "delta", "eps", "zeta", "eta", "theta"];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|_| Value::from(WORDS[rng.gen_range(0..WORDS.len())]))
        .collect()
}

fn bench_bin(c: &mut Criterion) {
    let mut group = c.benchmark_group("bin");
    let ranges = [(0.0, 1.0), (1.354, 98.432), (-1e6, 3.5e7)];

    for (min, max) in ranges {
        for maxbins in [10, 100] {
            let opts = BinOptions::default().with_maxbins(maxbins);
            group.bench_with_input(
                BenchmarkId::new(format!("[{min}, {max}]"), maxbins),
                &opts,
                |b, opts| b.iter(|| bin(black_box(min), black_box(max), opts)),
            );
        }
    }

    group.finish();
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");
    let sizes = [100, 1_000, 10_000, 100_000];
    let opts = HistogramOptions::new().with_maxbins(20);

    for &size in &sizes {
        let numbers = generate_normal_data(size, 100.0, 15.0, 42);
        group.bench_with_input(BenchmarkId::new("numeric", size), &numbers, |b, data| {
            b.iter(|| histogram(black_box(data), &opts))
        });

        let dates = generate_dates(size, 42);
        group.bench_with_input(BenchmarkId::new("date", size), &dates, |b, data| {
            b.iter(|| histogram(black_box(data), &opts))
        });

        let words = generate_words(size, 42);
        group.bench_with_input(BenchmarkId::new("categorical", size), &words, |b, data| {
            b.iter(|| histogram(black_box(data), &opts))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bin, bench_histogram);
criterion_main!(benches);
