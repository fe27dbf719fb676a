use core::time::Duration;

use crate::{
    AtomicSnowflakeGenerator, Backoff, ClockRegression, DEFAULT_EPOCH, GenerationPolicy, Layout,
    LockSnowflakeGenerator, Result, SystemClock, TimeSource,
};

/// Everything needed to construct a generator: the worker ID, the epoch, the
/// field widths and the [`GenerationPolicy`].
///
/// Nothing is validated until one of the `build_*` methods runs, and those
/// report every configuration error synchronously, before any ID can be
/// issued.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use snowmint::{Backoff, ClockRegression, Error, GeneratorConfig, SnowflakeGenerator};
///
/// let generator = GeneratorConfig::new(2)
///     .epoch(Duration::from_millis(1_672_531_200_000))
///     .bits(41, 4, 18)
///     .clock_regression(ClockRegression::Wait)
///     .backoff(Backoff::Yield)
///     .max_wait(Duration::from_millis(50))
///     .build_lock()?;
/// assert_eq!(generator.worker_id(), 2);
///
/// let err = GeneratorConfig::new(0).bits(41, 4, 19).build_lock().unwrap_err();
/// assert!(matches!(err, Error::InvalidLayout { .. }));
/// # Ok::<(), snowmint::Error>(())
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    pub worker_id: u64,
    /// Origin of the timestamp field, as a duration since 1970-01-01 UTC.
    pub epoch: Duration,
    pub timestamp_bits: u8,
    pub worker_bits: u8,
    pub sequence_bits: u8,
    pub policy: GenerationPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GeneratorConfig {
    /// Worker `worker_id`, [`DEFAULT_EPOCH`], [`Layout::DEFAULT`] widths and
    /// the default policy.
    pub const fn new(worker_id: u64) -> Self {
        Self {
            worker_id,
            epoch: DEFAULT_EPOCH,
            timestamp_bits: Layout::DEFAULT.timestamp_bits(),
            worker_bits: Layout::DEFAULT.worker_bits(),
            sequence_bits: Layout::DEFAULT.sequence_bits(),
            policy: GenerationPolicy {
                clock_regression: ClockRegression::Adopt,
                backoff: Backoff::Spin,
                max_wait: None,
            },
        }
    }

    #[must_use]
    pub const fn worker_id(mut self, worker_id: u64) -> Self {
        self.worker_id = worker_id;
        self
    }

    #[must_use]
    pub const fn epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// Sets the timestamp, worker and sequence widths.
    #[must_use]
    pub const fn bits(mut self, timestamp_bits: u8, worker_bits: u8, sequence_bits: u8) -> Self {
        self.timestamp_bits = timestamp_bits;
        self.worker_bits = worker_bits;
        self.sequence_bits = sequence_bits;
        self
    }

    #[must_use]
    pub const fn clock_regression(mut self, clock_regression: ClockRegression) -> Self {
        self.policy.clock_regression = clock_regression;
        self
    }

    #[must_use]
    pub const fn backoff(mut self, backoff: Backoff) -> Self {
        self.policy.backoff = backoff;
        self
    }

    /// Bounds how long a single `next_id` call may wait for the clock.
    #[must_use]
    pub const fn max_wait(mut self, max_wait: Duration) -> Self {
        self.policy.max_wait = Some(max_wait);
        self
    }

    /// Validates the field widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] unless the widths plus the reserved
    /// bit sum to 64.
    ///
    /// [`Error::InvalidLayout`]: crate::Error::InvalidLayout
    pub fn layout(&self) -> Result<Layout> {
        Layout::new(self.timestamp_bits, self.worker_bits, self.sequence_bits)
    }

    /// The wall clock at the configured epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the epoch lies in the future.
    ///
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    pub fn system_clock(&self) -> Result<SystemClock> {
        SystemClock::with_epoch(self.epoch)
    }

    /// Builds a [`LockSnowflakeGenerator`] reading the wall clock.
    ///
    /// # Errors
    ///
    /// Any configuration error: invalid widths, worker ID out of range, or
    /// an epoch in the future.
    pub fn build_lock(&self) -> Result<LockSnowflakeGenerator<SystemClock>> {
        let time = self.system_clock()?;
        self.build_lock_with(time)
    }

    /// Builds a [`LockSnowflakeGenerator`] reading `time`. The configured
    /// epoch is ignored: `time` defines its own.
    ///
    /// # Errors
    ///
    /// Invalid widths or a worker ID out of range.
    pub fn build_lock_with<T: TimeSource>(&self, time: T) -> Result<LockSnowflakeGenerator<T>> {
        let layout = self.layout()?;
        Ok(LockSnowflakeGenerator::new(self.worker_id, layout, time)?.with_policy(self.policy))
    }

    /// Builds an [`AtomicSnowflakeGenerator`] reading the wall clock.
    ///
    /// # Errors
    ///
    /// Any configuration error: invalid widths, worker ID out of range, or
    /// an epoch in the future.
    pub fn build_atomic(&self) -> Result<AtomicSnowflakeGenerator<SystemClock>> {
        let time = self.system_clock()?;
        self.build_atomic_with(time)
    }

    /// Builds an [`AtomicSnowflakeGenerator`] reading `time`. The configured
    /// epoch is ignored: `time` defines its own.
    ///
    /// # Errors
    ///
    /// Invalid widths or a worker ID out of range.
    pub fn build_atomic_with<T: TimeSource>(
        &self,
        time: T,
    ) -> Result<AtomicSnowflakeGenerator<T>> {
        let layout = self.layout()?;
        Ok(AtomicSnowflakeGenerator::new(self.worker_id, layout, time)?.with_policy(self.policy))
    }
}
