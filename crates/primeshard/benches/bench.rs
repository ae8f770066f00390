use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use primeshard::{
    CancellationFlag, PrimalityRule, RemainderPolicy, SubRange, Worker, WorkerHandle, is_prime,
    partition,
};
use std::io;
use std::path::Path;

// Values tested per iteration.
const SPAN: usize = 4096;

/// Trial division over a fixed window at increasing offsets.
fn bench_oracle(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle");
    group.throughput(Throughput::Elements(SPAN as u64));

    for offset in [0, 1 << 16, 1 << 20] {
        group.bench_function(format!("is_prime/{offset}"), |b| {
            b.iter(|| {
                for n in offset..offset + SPAN {
                    black_box(is_prime(black_box(n)));
                }
            });
        });
    }

    group.finish();
}

/// A full worker sweep into a discarding sink, including the per-value
/// cancellation check.
fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    group.throughput(Throughput::Elements(SPAN as u64));

    let handle = WorkerHandle::new(0, SubRange::new(0, SPAN), Path::new("."));
    let worker = Worker::new(&handle, PrimalityRule::Strict, CancellationFlag::new());

    group.bench_function(format!("elems/{SPAN}"), |b| {
        b.iter(|| black_box(worker.sweep(&mut io::sink()).unwrap()));
    });

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    c.bench_function("partition/1024", |b| {
        b.iter(|| partition(black_box(usize::MAX), black_box(1024), RemainderPolicy::ExtendLast))
    });
}

criterion_group!(benches, bench_oracle, bench_sweep, bench_partition);
criterion_main!(benches);
