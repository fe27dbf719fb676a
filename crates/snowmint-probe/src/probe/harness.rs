use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, anyhow};
use snowmint::{
    Layout, MonotonicClock, SnowflakeGenerator, SnowflakeGeneratorAsyncExt, SnowflakeId,
    TimeSource,
};
use tokio::task::JoinSet;

use super::config::{ClockKind, GeneratorKind, ProbeConfig, RuntimeKind};

/// A generator shared by every thread or task that issues requests against
/// it.
pub type SharedGenerator = Arc<dyn SnowflakeGenerator + Send + Sync>;

/// Outcome of one probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// IDs actually returned.
    pub generated: usize,
    /// Distinct IDs among them.
    pub unique: usize,
    /// IDs requested.
    pub expected: usize,
    pub elapsed: Duration,
    /// IDs issued per worker ID, read back out of the IDs themselves.
    pub per_worker: BTreeMap<u64, usize>,
}

impl Report {
    pub fn from_ids(
        ids: &[SnowflakeId],
        expected: usize,
        elapsed: Duration,
        layout: Layout,
    ) -> Self {
        let unique = ids.iter().collect::<HashSet<_>>().len();
        let mut per_worker = BTreeMap::new();
        for id in ids {
            *per_worker.entry(layout.decompose(*id).worker_id).or_insert(0) += 1;
        }
        Self {
            generated: ids.len(),
            unique,
            expected,
            elapsed,
            per_worker,
        }
    }

    pub fn duplicates(&self) -> usize {
        self.generated - self.unique
    }

    /// Every request produced an ID and no ID was seen twice.
    pub fn is_clean(&self) -> bool {
        self.generated == self.expected && self.unique == self.expected
    }

    /// IDs per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return self.generated as f64;
        }
        self.generated as f64 / secs
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "generated: {}", self.generated)?;
        writeln!(f, "actual: {}", self.unique)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "elapsed: {:?} ({:.0} ids/s)", self.elapsed, self.throughput())?;
        for (worker_id, count) in &self.per_worker {
            writeln!(f, "worker {worker_id}: {count}")?;
        }
        Ok(())
    }
}

/// Builds one generator per configured worker ID, all reading clones of one
/// clock.
pub fn build_generators(config: &ProbeConfig) -> anyhow::Result<Vec<SharedGenerator>> {
    match config.clock {
        ClockKind::System => build_with_clock(config, config.base.system_clock()?),
        ClockKind::Monotonic => {
            build_with_clock(config, MonotonicClock::with_epoch(config.base.epoch)?)
        }
    }
}

fn build_with_clock<T>(config: &ProbeConfig, clock: T) -> anyhow::Result<Vec<SharedGenerator>>
where
    T: TimeSource + Clone + Send + Sync + 'static,
{
    config
        .worker_ids()
        .map(|worker_id| {
            let worker = config.base.worker_id(worker_id);
            let generator: SharedGenerator = match config.generator {
                GeneratorKind::Lock => Arc::new(worker.build_lock_with(clock.clone())?),
                GeneratorKind::Atomic => Arc::new(worker.build_atomic_with(clock.clone())?),
            };
            Ok(generator)
        })
        .collect::<snowmint::Result<Vec<_>>>()
        .with_context(|| format!("failed to build generator for {:?}", config.base))
}

/// Runs the configured number of requests and reports on the IDs returned.
///
/// # Errors
///
/// Returns the first generation error any request hit, or a panic in a
/// worker thread or task.
pub fn run(config: &ProbeConfig) -> anyhow::Result<Report> {
    let generators = build_generators(config)?;

    tracing::info!(
        requests = config.requests,
        threads = config.threads,
        generators = generators.len(),
        runtime = ?config.runtime,
        "Starting probe"
    );

    let start = Instant::now();
    let ids = match config.runtime {
        RuntimeKind::Threads => run_threads(&generators, config.requests, config.threads)?,
        RuntimeKind::Tokio => run_tokio(&generators, config.requests, config.threads)?,
    };
    let elapsed = start.elapsed();

    let report = Report::from_ids(&ids, config.requests, elapsed, config.layout);
    if report.duplicates() > 0 {
        tracing::error!(duplicates = report.duplicates(), "Duplicate IDs observed");
    }
    Ok(report)
}

/// Request `i` goes to thread `i % threads` and generator `i % generators`.
fn run_threads(
    generators: &[SharedGenerator],
    requests: usize,
    threads: usize,
) -> anyhow::Result<Vec<SnowflakeId>> {
    let batches = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                s.spawn(move || {
                    (t..requests)
                        .step_by(threads)
                        .map(|i| generators[i % generators.len()].next_id())
                        .collect::<snowmint::Result<Vec<_>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                let batch = handle.join().map_err(|_| anyhow!("probe thread panicked"))?;
                Ok(batch?)
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    Ok(batches.into_iter().flatten().collect())
}

/// One task per request on a runtime with `threads` workers.
fn run_tokio(
    generators: &[SharedGenerator],
    requests: usize,
    threads: usize,
) -> anyhow::Result<Vec<SnowflakeId>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_time()
        .build()
        .context("failed to build Tokio runtime")?;

    runtime.block_on(async {
        let mut tasks = JoinSet::new();
        for i in 0..requests {
            let generator = Arc::clone(&generators[i % generators.len()]);
            tasks.spawn(async move { generator.next_id_async().await });
        }

        let mut ids = Vec::with_capacity(requests);
        while let Some(joined) = tasks.join_next().await {
            ids.push(joined.context("probe task panicked")??);
        }
        Ok::<_, anyhow::Error>(ids)
    })
}
