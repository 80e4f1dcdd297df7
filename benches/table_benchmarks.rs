use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rowtable::*;

fn sample_grid(rows: i64) -> Vec<Vec<Value>> {
    let mut grid = Vec::with_capacity(rows as usize + 1);
    grid.push(row!["id", "bucket", "score", "label"]);
    for i in 0..rows {
        grid.push(row![i, i % 7, (i * 31 % 1000) as f64 / 10.0, "entry"]);
    }
    grid
}

fn bench_bulk_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_construction");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let grid = sample_grid(size);
            b.iter(|| Table::from_grid(black_box(grid.clone())).unwrap());
        });
    }
    group.finish();
}

fn bench_sort_two_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_two_keys");

    for size in [100, 1000, 10000].iter() {
        let table = Table::from_grid(sample_grid(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                table
                    .sorted_by(&[
                        SortKey::ascending("bucket"),
                        SortKey::descending("score"),
                    ])
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_group_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_rows");

    for size in [100, 1000, 10000].iter() {
        let table = Table::from_grid(sample_grid(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| table.map_rows_append(black_box("bucket")).unwrap());
        });
    }
    group.finish();
}

fn bench_dedupe(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedupe");

    for size in [100, 1000, 10000].iter() {
        let table = Table::from_grid(sample_grid(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| table.deduped_by(black_box("bucket")).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_construction,
    bench_sort_two_keys,
    bench_group_rows,
    bench_dedupe
);
criterion_main!(benches);
