//! Criterion benchmarks for ring buffer hot paths.
//!
//! The acquisition task pushes one row per fast tick and the drain task pops a small batch
//! per slow tick, both inside a short critical section. These benchmarks track the cost of
//! those critical sections.
//!
//! Key metrics:
//! - Push throughput for several row widths
//! - Overwrite-oldest push on a full buffer
//! - Batch pop, including empty slots
//! - Uncontended bounded lock acquisition on the shared buffer
//!
//! Run with: cargo bench --bench ring_buffer

use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion,
    Throughput,
};
use daq_sampler::data::{RingBuffer, Row, SharedRing};
use std::time::Duration;

/// Push into a buffer that always has room.
fn push_width<const N: usize>(group: &mut BenchmarkGroup<'_, WallTime>) {
    let mut rb: RingBuffer<Row<N>> = RingBuffer::with_capacity(500).unwrap();
    let row = Row::new([2048; N]);
    group.bench_with_input(BenchmarkId::new("push_pop", N), &N, |b, _| {
        b.iter(|| {
            rb.push(black_box(row));
            black_box(rb.pop());
        });
    });
}

fn ring_buffer_push_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer_push");
    group.throughput(Throughput::Elements(1));
    push_width::<1>(&mut group);
    push_width::<8>(&mut group);
    push_width::<17>(&mut group);
    group.finish();
}

/// Push when every push evicts the oldest row.
fn ring_buffer_overwrite(c: &mut Criterion) {
    let mut rb: RingBuffer<Row<8>> = RingBuffer::with_capacity(500).unwrap();
    for seq in 0..500 {
        rb.push(Row::new([seq; 8]));
    }

    c.bench_function("ring_buffer_overwrite_push", |b| {
        b.iter(|| {
            black_box(rb.push(black_box(Row::new([7; 8]))));
        });
    });
}

/// Pop a drain batch from a buffer holding `fill` rows, refilling between iterations.
fn ring_buffer_batch_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer_batch_pop");

    for fill in [0usize, 1, 2, 4] {
        let mut rb: RingBuffer<Row<8>> = RingBuffer::with_capacity(500).unwrap();
        group.bench_with_input(BenchmarkId::new("batch_of_4", fill), &fill, |b, &fill| {
            b.iter(|| {
                for seq in 0..fill {
                    rb.push(Row::new([seq as i32; 8]));
                }
                for _ in 0..4 {
                    black_box(rb.pop());
                }
            });
        });
    }

    group.finish();
}

/// Bounded lock round trip on the shared buffer with no other holder.
fn shared_ring_lock(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let ring: SharedRing<Row<8>> = SharedRing::new(RingBuffer::with_capacity(500).unwrap());

    c.bench_function("shared_ring_lock_push_pop", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut buffer = ring.lock_within(Duration::from_millis(2)).await.unwrap();
                buffer.push(Row::new([1; 8]));
                black_box(buffer.pop());
            });
        });
    });
}

criterion_group!(
    benches,
    ring_buffer_push_throughput,
    ring_buffer_overwrite,
    ring_buffer_batch_pop,
    shared_ring_lock
);
criterion_main!(benches);
