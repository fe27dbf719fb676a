use core::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use snowmint::{Backoff, ClockRegression, DEFAULT_EPOCH, GeneratorConfig, Layout, SystemClock};

const DEFAULT_EPOCH_MILLIS: u64 = DEFAULT_EPOCH.as_millis() as u64;

/// Which generator implementation to exercise.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// `LockSnowflakeGenerator`: state behind a mutex.
    Lock,
    /// `AtomicSnowflakeGenerator`: state in a single CAS word.
    Atomic,
}

/// Which clock the generators read.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Wall clock; follows system time adjustments.
    System,
    /// Wall clock sampled once, then advanced by a monotonic instant.
    Monotonic,
}

/// How requests are driven.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    /// A fixed pool of OS threads calling the blocking `next_id`.
    Threads,
    /// One Tokio task per request, awaiting `next_id_async`.
    Tokio,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffArg {
    Spin,
    Yield,
    Sleep,
}

impl From<BackoffArg> for Backoff {
    fn from(arg: BackoffArg) -> Self {
        match arg {
            BackoffArg::Spin => Self::Spin,
            BackoffArg::Yield => Self::Yield,
            BackoffArg::Sleep => Self::Sleep,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRegressionArg {
    Adopt,
    Wait,
    Reject,
}

impl From<ClockRegressionArg> for ClockRegression {
    fn from(arg: ClockRegressionArg) -> Self {
        match arg {
            ClockRegressionArg::Adopt => Self::Adopt,
            ClockRegressionArg::Wait => Self::Wait,
            ClockRegressionArg::Reject => Self::Reject,
        }
    }
}

/// Runtime configuration for the `snowmint-probe` binary.
///
/// Every flag can also be supplied through the environment variable named in
/// its description, or through a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmint-probe",
    version,
    about = "Fires concurrent ID requests at snowmint generators and checks for duplicates"
)]
pub struct CliArgs {
    /// Total number of IDs to request across all threads or tasks.
    ///
    /// Environment variable: `REQUESTS`
    #[arg(long, env = "REQUESTS", default_value_t = 10_000)]
    pub requests: usize,

    /// Number of OS threads (or Tokio worker threads) issuing requests.
    ///
    /// Environment variable: `THREADS`
    #[arg(long, env = "THREADS", default_value_t = 5)]
    pub threads: usize,

    /// Number of generator instances. Each gets its own worker ID and
    /// requests are spread across them round-robin.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long = "workers", env = "NUM_WORKERS", default_value_t = 1)]
    pub num_workers: u64,

    /// Added to each generator's index to compute its worker ID. Use this to
    /// probe the upper end of the worker ID space.
    ///
    /// Environment variable: `WORKER_OFFSET`
    #[arg(long, env = "WORKER_OFFSET", default_value_t = 0)]
    pub worker_offset: u64,

    /// Environment variable: `GENERATOR`
    #[arg(long, env = "GENERATOR", value_enum, default_value_t = GeneratorKind::Lock)]
    pub generator: GeneratorKind,

    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,

    /// How a blocked caller waits for the next millisecond.
    ///
    /// Environment variable: `BACKOFF`
    #[arg(long, env = "BACKOFF", value_enum, default_value_t = BackoffArg::Spin)]
    pub backoff: BackoffArg,

    /// What a generator does when the clock reads earlier than its last
    /// issued timestamp.
    ///
    /// Environment variable: `CLOCK_REGRESSION`
    #[arg(long, env = "CLOCK_REGRESSION", value_enum, default_value_t = ClockRegressionArg::Adopt)]
    pub clock_regression: ClockRegressionArg,

    /// Upper bound, in milliseconds, on how long one request may wait for the
    /// clock. Unbounded when omitted.
    ///
    /// Environment variable: `MAX_WAIT_MS`
    #[arg(long, env = "MAX_WAIT_MS")]
    pub max_wait_ms: Option<u64>,

    /// Epoch as milliseconds since 1970-01-01 UTC. Defaults to 2023-01-01.
    ///
    /// Environment variable: `EPOCH_MILLIS`
    #[arg(long, env = "EPOCH_MILLIS", default_value_t = DEFAULT_EPOCH_MILLIS)]
    pub epoch_millis: u64,

    /// Environment variable: `TIMESTAMP_BITS`
    #[arg(long, env = "TIMESTAMP_BITS", default_value_t = Layout::DEFAULT.timestamp_bits())]
    pub timestamp_bits: u8,

    /// Environment variable: `WORKER_BITS`
    #[arg(long, env = "WORKER_BITS", default_value_t = Layout::DEFAULT.worker_bits())]
    pub worker_bits: u8,

    /// Environment variable: `SEQUENCE_BITS`
    #[arg(long, env = "SEQUENCE_BITS", default_value_t = Layout::DEFAULT.sequence_bits())]
    pub sequence_bits: u8,

    /// Environment variable: `RUNTIME`
    #[arg(long, env = "RUNTIME", value_enum, default_value_t = RuntimeKind::Threads)]
    pub runtime: RuntimeKind,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub requests: usize,
    pub threads: usize,
    pub num_workers: u64,
    pub worker_offset: u64,
    pub generator: GeneratorKind,
    pub clock: ClockKind,
    pub runtime: RuntimeKind,
    pub layout: Layout,
    /// Shared by every generator; only the worker ID differs.
    pub base: GeneratorConfig,
}

impl ProbeConfig {
    /// Worker IDs assigned to the generators, in order.
    pub fn worker_ids(&self) -> impl Iterator<Item = u64> + use<> {
        let offset = self.worker_offset;
        (0..self.num_workers).map(move |i| offset + i)
    }
}

impl TryFrom<CliArgs> for ProbeConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.requests == 0 {
            bail!("REQUESTS must be greater than 0");
        }

        if args.threads == 0 {
            bail!("THREADS must be greater than 0");
        }

        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        let mut base = GeneratorConfig::new(0)
            .epoch(Duration::from_millis(args.epoch_millis))
            .bits(args.timestamp_bits, args.worker_bits, args.sequence_bits)
            .clock_regression(args.clock_regression.into())
            .backoff(args.backoff.into());
        if let Some(ms) = args.max_wait_ms {
            base = base.max_wait(Duration::from_millis(ms));
        }

        let layout = base.layout().with_context(|| {
            format!(
                "invalid bit layout {}/{}/{}",
                args.timestamp_bits, args.worker_bits, args.sequence_bits
            )
        })?;

        let last_worker = args
            .worker_offset
            .checked_add(args.num_workers - 1)
            .ok_or_else(|| anyhow::anyhow!("Overflow in worker ID computation"))?;
        if last_worker > layout.max_worker_id() {
            bail!(
                "NUM_WORKERS ({}) with WORKER_OFFSET ({}) exceeds available worker ID space (max = {})",
                args.num_workers,
                args.worker_offset,
                layout.max_worker_id()
            );
        }

        SystemClock::with_epoch(base.epoch)
            .with_context(|| format!("EPOCH_MILLIS ({}) is unusable", args.epoch_millis))?;

        Ok(Self {
            requests: args.requests,
            threads: args.threads,
            num_workers: args.num_workers,
            worker_offset: args.worker_offset,
            generator: args.generator,
            clock: args.clock,
            runtime: args.runtime,
            layout,
            base,
        })
    }
}
