//! Aggregation throughput benchmark

use metrictree::{DatasetBuilder, ExperimentGroup, Metric};

use arrow_array::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const USERS: i64 = 2_000;
const PERIODS: usize = 52;

fn create_dataset() -> RecordBatch {
    let mut builder = DatasetBuilder::new();
    for period in 0..PERIODS {
        for user in 1..=USERS {
            let value = ((user * 37 + period as i64 * 11) % 100) as f64;
            builder = builder.row(user, format!("2022-W{:02}", period + 1), value);
        }
    }
    builder.build().unwrap()
}

fn bench_development(c: &mut Criterion) {
    let metric = Metric::new("revenue", create_dataset(), "mean").unwrap();
    let rows = metric.data().num_rows() as u64;

    let mut group = c.benchmark_group("development");
    group.throughput(Throughput::Elements(rows));
    group.bench_function("mean_per_period", |b| {
        b.iter(|| black_box(metric.development().unwrap()))
    });
    group.finish();
}

fn bench_development_by_experiment(c: &mut Criterion) {
    let metric = Metric::new("revenue", create_dataset(), "median").unwrap();
    let experiment = ExperimentGroup::new("pricing_test")
        .with_arm("control", (1..=USERS / 2).collect())
        .with_arm("variant", (USERS / 2 + 1..=USERS).collect());
    let labeled = experiment.label(metric.data(), "experiment").unwrap();
    let rows = labeled.num_rows() as u64;

    let mut group = c.benchmark_group("development_by_experiment");
    group.throughput(Throughput::Elements(rows));
    group.bench_function("median_per_period_per_arm", |b| {
        b.iter(|| {
            black_box(
                metric
                    .development_by_experiment(&labeled, "experiment")
                    .unwrap(),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_development, bench_development_by_experiment);
criterion_main!(benches);
