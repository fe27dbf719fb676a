use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::future::try_join_all;
use snowmint::{
    AtomicSnowflakeGenerator, Layout, LockSnowflakeGenerator, MonotonicClock, Poll, Result,
    SleepProvider, SnowflakeGenerator, SnowflakeGeneratorAsyncExt, TimeSource, TokioSleep,
    TokioYield,
};
use std::{sync::Barrier, thread::scope, time::Instant};
use tokio::runtime::Builder;

#[derive(Clone, Copy)]
struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded). Fits in one millisecond of the default layout.
const TOTAL_IDS: usize = 4096;

/// Thread counts doubling up to the number of logical CPUs.
fn thread_counts() -> Vec<usize> {
    let max = num_cpus::get().max(1);
    core::iter::successors(Some(1), |n| Some(n * 2))
        .take_while(|n| *n <= max)
        .collect()
}

/// Benchmarks a hot-path generator where IDs are always `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: SnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id() {
                        Ok(Poll::Ready { id }) => {
                            black_box(id);
                        }
                        _ => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks the blocking `next_id` path against a real clock.
fn bench_generator_blocking<G>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
) where
    G: SnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a shared generator across threads. `Pending` is retried with a
/// spin hint, which only happens on lost CAS races or sequence exhaustion.
fn bench_generator_contended<G>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> G,
) where
    G: SnowflakeGenerator + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in thread_counts() {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = generator_fn();
                    let barrier = Barrier::new(thread_count + 1);
                    scope(|s| {
                        for _ in 0..thread_count {
                            s.spawn(|| {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    loop {
                                        match generator.try_poll_id() {
                                            Ok(Poll::Ready { id }) => {
                                                black_box(id);
                                                break;
                                            }
                                            Ok(Poll::Pending { .. }) => core::hint::spin_loop(),
                                            Err(e) => panic!("{e}"),
                                        }
                                    }
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

/// Benchmarks many async generators in parallel, each running in a separate
/// Tokio task.
fn bench_generator_async_tokio<G, S>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn(u64) -> G + Copy + Send + 'static,
) where
    G: SnowflakeGenerator + Send + Sync + 'static,
    S: SleepProvider + 'static,
{
    let mut group = c.benchmark_group(group_name);
    group.sample_size(10);
    group.sampling_mode(criterion::SamplingMode::Flat);

    let total_ids = TOTAL_IDS * 64;

    // One generator per worker ID of the default layout.
    for num_generators in [1, 2, 4, 8, 16] {
        let ids_per_task = total_ids / num_generators;

        group.throughput(Throughput::Elements(total_ids as u64));
        group.bench_function(format!("elems/{total_ids}/gens/{num_generators}"), |b| {
            let rt = Builder::new_multi_thread().enable_all().build().unwrap();

            b.to_async(&rt).iter_custom(move |iters| async move {
                let start = Instant::now();

                for _ in 0..iters {
                    let mut tasks: Vec<tokio::task::JoinHandle<Result<()>>> =
                        Vec::with_capacity(num_generators);

                    for i in 0..num_generators {
                        let generator = generator_fn(i as u64);
                        tasks.push(tokio::spawn(async move {
                            for _ in 0..ids_per_task {
                                let id = generator.try_next_id_async::<S>().await?;
                                black_box(id);
                            }
                            Ok(())
                        }));
                    }

                    for result in try_join_all(tasks).await.unwrap() {
                        result.unwrap();
                    }
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

// --- MOCK CLOCK (fixed, non-advancing time) ---

fn benchmark_mock_sequential_lock(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/lock", || {
        LockSnowflakeGenerator::new(0, Layout::DEFAULT, FixedMockTime { millis: 1 }).unwrap()
    });
}

fn benchmark_mock_sequential_atomic(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/atomic", || {
        AtomicSnowflakeGenerator::new(0, Layout::DEFAULT, FixedMockTime { millis: 1 }).unwrap()
    });
}

/// Raw lock contention; never pending.
fn benchmark_mock_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", || {
        LockSnowflakeGenerator::new(0, Layout::DEFAULT, FixedMockTime { millis: 1 }).unwrap()
    });
}

/// Pending only on lost CAS races.
fn benchmark_mock_contended_atomic(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/atomic", || {
        AtomicSnowflakeGenerator::new(0, Layout::DEFAULT, FixedMockTime { millis: 1 }).unwrap()
    });
}

// --- MONOTONIC CLOCK (realistic time with potential waiting) ---

fn benchmark_mono_sequential_lock(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generator_blocking(c, "mono/sequential/lock", || {
        LockSnowflakeGenerator::new(0, Layout::DEFAULT, clock).unwrap()
    });
}

fn benchmark_mono_sequential_atomic(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generator_blocking(c, "mono/sequential/atomic", || {
        AtomicSnowflakeGenerator::new(0, Layout::DEFAULT, clock).unwrap()
    });
}

fn benchmark_mono_contended_lock(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generator_contended(c, "mono/contended/lock", || {
        LockSnowflakeGenerator::new(0, Layout::DEFAULT, clock).unwrap()
    });
}

fn benchmark_mono_contended_atomic(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generator_contended(c, "mono/contended/atomic", || {
        AtomicSnowflakeGenerator::new(0, Layout::DEFAULT, clock).unwrap()
    });
}

// --- ASYNC (Tokio) ---

fn benchmark_mono_tokio_lock(c: &mut Criterion) {
    bench_generator_async_tokio::<_, TokioSleep>(c, "mono/multi/async/tokio/lock", |worker| {
        LockSnowflakeGenerator::new(worker, Layout::DEFAULT, MonotonicClock::default()).unwrap()
    });
}

fn benchmark_mono_tokio_atomic(c: &mut Criterion) {
    bench_generator_async_tokio::<_, TokioSleep>(c, "mono/multi/async/tokio/atomic", |worker| {
        AtomicSnowflakeGenerator::new(worker, Layout::DEFAULT, MonotonicClock::default()).unwrap()
    });
}

fn benchmark_mono_tokio_yield_atomic(c: &mut Criterion) {
    bench_generator_async_tokio::<_, TokioYield>(
        c,
        "mono/multi/async/tokio-yield/atomic",
        |worker| {
            AtomicSnowflakeGenerator::new(worker, Layout::DEFAULT, MonotonicClock::default())
                .unwrap()
        },
    );
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential_lock,
    benchmark_mock_sequential_atomic,
    benchmark_mock_contended_lock,
    benchmark_mock_contended_atomic,
    // Monotonic clock
    benchmark_mono_sequential_lock,
    benchmark_mono_sequential_atomic,
    benchmark_mono_contended_lock,
    benchmark_mono_contended_atomic,
    // Async, one generator per task
    benchmark_mono_tokio_lock,
    benchmark_mono_tokio_atomic,
    benchmark_mono_tokio_yield_atomic,
);
criterion_main!(benches);
