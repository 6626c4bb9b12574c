use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mrp::dynamic::bellman_equation::{backup, value_iteration, ValueIterationConfig};
use mrp::dynamic::reward_process::MarkovRewardProcess;

fn bench_backup(c: &mut Criterion) {
    let mrp = MarkovRewardProcess::two_level_tree();
    let values = [0.0; 7];

    c.bench_function("backup/two_level_tree", |b| {
        b.iter(|| backup(black_box(&mrp), black_box(&values[..]), 1.0))
    });
}

fn bench_value_iteration(c: &mut Criterion) {
    let mrp = MarkovRewardProcess::two_level_tree();
    let mut group = c.benchmark_group("value_iteration");

    for &iterations in &[1_000usize, 10_000, 100_000] {
        let config = ValueIterationConfig::default().with_max_iterations(iterations);
        group.bench_with_input(
            BenchmarkId::new("fixed_budget", iterations),
            &config,
            |b, config| b.iter(|| value_iteration(black_box(&mrp), config)),
        );
    }

    let config = ValueIterationConfig::default().with_tolerance(1e-6);
    group.bench_function("tolerance", |b| {
        b.iter(|| value_iteration(black_box(&mrp), &config))
    });

    group.finish();
}

criterion_group!(benches, bench_backup, bench_value_iteration);
criterion_main!(benches);
