use criterion::{black_box, criterion_group, criterion_main, Criterion};
use haplomap_stats::{estimate, HeatmapEstimator, LocationObservation};

fn random_counts(n: usize, seed: u64) -> Vec<(u64, u64)> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        state >> 33
    };
    (0..n)
        .map(|_| {
            let total = next() % 2_000 + 1;
            (next() % (total + 1), total)
        })
        .collect()
}

fn observations(counts: &[(u64, u64)]) -> (Vec<LocationObservation>, Vec<LocationObservation>) {
    let marker = counts
        .iter()
        .enumerate()
        .map(|(i, &(s, _))| LocationObservation::new(format!("C{}", i / 40), format!("P{i}"), s))
        .collect();
    let baseline = counts
        .iter()
        .enumerate()
        .map(|(i, &(_, n))| LocationObservation::new(format!("C{}", i / 40), format!("P{i}"), n))
        .collect();
    (marker, baseline)
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");

    for n in [100, 3_000] {
        let (marker, baseline) = observations(&random_counts(n, 42));
        group.bench_function(format!("{n}_locations"), |b| {
            b.iter(|| estimate(black_box(&marker), black_box(&baseline)))
        });
    }

    group.finish();
}

fn bench_top(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_locations");

    let (marker, baseline) = observations(&random_counts(3_000, 7));
    let heatmap = HeatmapEstimator::default().estimate(&marker, &baseline);
    group.bench_function("3k_top5", |b| b.iter(|| black_box(&heatmap).top(5).len()));

    group.finish();
}

criterion_group!(benches, bench_estimate, bench_top);
criterion_main!(benches);
