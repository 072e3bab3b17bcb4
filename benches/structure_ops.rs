//! Benchmarks for graph, fill and container operations
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use datagraph_rs::{
    actions::{CreateArrayAction, DataAction, Mode},
    data_path,
    filter::{CancelToken, ExecutionContext},
    filters::fill_parallel,
    io,
    structure::{DataArray, DataStructure, StoreMode},
    types::DataType,
};

fn wide_structure(groups: usize, arrays_per_group: usize) -> DataStructure {
    let mut ds = DataStructure::new();
    for g in 0..groups {
        let group = ds.create_group(&format!("Group {}", g), None).unwrap();
        for a in 0..arrays_per_group {
            ds.create_array::<f32>(&format!("Array {}", a), &[64], &[1], StoreMode::Materialized, Some(group))
                .unwrap();
        }
    }
    ds
}

fn bench_create_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_array");
    let action = CreateArrayAction::new(DataType::Float64, vec![1_000_000], vec![3], data_path!["Values"]);

    group.bench_function("preflight_mode", |b| {
        b.iter(|| {
            let mut ds = DataStructure::new();
            action.apply(&mut ds, Mode::Preflight).unwrap();
            black_box(ds)
        })
    });
    group.bench_function("execute_mode", |b| {
        b.iter(|| {
            let mut ds = DataStructure::new();
            action.apply(&mut ds, Mode::Execute).unwrap();
            black_box(ds)
        })
    });

    group.finish();
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");

    for groups in [10, 100, 1000].iter() {
        let ds = wide_structure(*groups, 8);
        group.throughput(Throughput::Elements(ds.len() as u64));
        group.bench_with_input(BenchmarkId::new("walk", groups), &ds, |b, ds| {
            b.iter(|| black_box(ds.hierarchy()))
        });
        group.bench_with_input(BenchmarkId::new("metadata_clone", groups), &ds, |b, ds| {
            b.iter(|| black_box(ds.metadata_clone()))
        });
    }

    group.finish();
}

fn bench_fill_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_parallel");
    let cancel = CancelToken::new();
    let size = 4_000_000;
    group.throughput(Throughput::Elements(size as u64));

    for workers in [1, 2, 4, 8].iter() {
        let ctx = ExecutionContext {
            worker_threads: *workers,
            chunk_size: 64 * 1024,
        };
        let mut values = vec![0f32; size];
        group.bench_with_input(BenchmarkId::new("workers", workers), &ctx, |b, ctx| {
            b.iter(|| black_box(fill_parallel(&mut values, 1, ctx, &cancel, |i| i as f32 * 0.5)))
        });
    }

    group.finish();
}

fn bench_container_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");

    for tuples in [1_000, 100_000].iter() {
        let mut ds = DataStructure::new();
        let values: Vec<f64> = (0..*tuples).map(|i| i as f64).collect();
        let array = DataArray::from_vec(values, &[*tuples], &[1]).unwrap();
        ds.insert_object("Values", array, None).unwrap();
        let container = io::write_container(&ds).unwrap();

        group.throughput(Throughput::Bytes((*tuples * std::mem::size_of::<f64>()) as u64));
        group.bench_with_input(BenchmarkId::new("write", tuples), &ds, |b, ds| {
            b.iter(|| black_box(io::write_container(ds).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("read", tuples), &container, |b, container| {
            b.iter(|| black_box(io::read_container(container, false).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("read_placeholder", tuples), &container, |b, container| {
            b.iter(|| black_box(io::read_container(container, true).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create_array,
    bench_hierarchy,
    bench_fill_parallel,
    bench_container_round_trip,
);
criterion_main!(benches);
