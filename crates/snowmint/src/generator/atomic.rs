use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    GenerationPolicy, Layout, Parts, Poll, Result, SnowflakeGenerator, SnowflakeId, TimeSource,
    generator::{
        lock::check_components,
        state::{Advance, advance},
    },
};

/// A lock-free Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last issued ID is stored packed in an [`AtomicU64`]; its timestamp and
/// sequence fields are the generator state. A new ID is published with a
/// single compare-and-swap, so only one of several racing callers can win a
/// given state. Losers get [`Poll::Pending`] with `yield_for == 0` and retry.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    worker_id: u64,
    layout: Layout,
    policy: GenerationPolicy,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator with a zeroed state and the default
    /// [`GenerationPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerIdOutOfRange`] if `worker_id` does not fit in
    /// `layout`'s worker field.
    ///
    /// # Example
    /// ```
    /// use snowmint::{AtomicSnowflakeGenerator, Layout, MonotonicClock, Poll, SnowflakeGenerator};
    ///
    /// let generator = AtomicSnowflakeGenerator::new(1, Layout::DEFAULT, MonotonicClock::default())?;
    ///
    /// let id = loop {
    ///     match generator.try_poll_id()? {
    ///         Poll::Ready { id } => break id,
    ///         Poll::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(generator.decompose(id).worker_id, 1);
    /// # Ok::<(), snowmint::Error>(())
    /// ```
    ///
    /// [`Error::WorkerIdOutOfRange`]: crate::Error::WorkerIdOutOfRange
    pub fn new(worker_id: u64, layout: Layout, time: T) -> Result<Self> {
        Self::from_components(0, worker_id, 0, layout, time)
    }

    /// Creates a generator preloaded with an explicit last timestamp and
    /// sequence.
    ///
    /// # Errors
    ///
    /// Fails when any field does not fit in `layout`; see
    /// [`LockSnowflakeGenerator::from_components`].
    ///
    /// [`LockSnowflakeGenerator::from_components`]: crate::LockSnowflakeGenerator::from_components
    pub fn from_components(
        timestamp: u64,
        worker_id: u64,
        sequence: u64,
        layout: Layout,
        time: T,
    ) -> Result<Self> {
        check_components(timestamp, worker_id, sequence, &layout)?;
        let initial = layout.compose(Parts {
            timestamp,
            worker_id,
            sequence,
        });
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial.to_raw())),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial.to_raw()),
            worker_id,
            layout,
            policy: GenerationPolicy::default(),
            time,
        })
    }

    /// Replaces the generation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attempts to issue the next ID without waiting.
    ///
    /// Besides the cases described on [`SnowflakeGenerator::try_poll_id`],
    /// this returns `Pending { yield_for: 0 }` when another thread published
    /// first.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self), fields(worker_id = self.worker_id))
    )]
    pub fn try_poll_id(&self) -> Result<Poll> {
        // Load before reading the clock. A reading older than the loaded
        // state is then a genuine regression; a state newer than the load
        // makes the CAS below fail.
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis();
        let current = self.layout.decompose(SnowflakeId::from_raw(current_raw));

        let (timestamp, sequence) = match advance(
            &self.layout,
            self.policy.clock_regression,
            current.timestamp,
            current.sequence,
            now,
        )? {
            Advance::Issue {
                timestamp,
                sequence,
            } => (timestamp, sequence),
            Advance::Pending { yield_for } => return Ok(Poll::Pending { yield_for }),
        };

        let next = self.layout.compose(Parts {
            timestamp,
            worker_id: self.worker_id,
            sequence,
        });

        if self
            .state
            .compare_exchange(
                current_raw,
                next.to_raw(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok()
        {
            Ok(Poll::Ready { id: next })
        } else {
            Ok(Poll::Pending { yield_for: 0 })
        }
    }

    /// Issues the next ID, waiting for the clock when needed.
    ///
    /// See [`SnowflakeGenerator::next_id`].
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::next_id`].
    pub fn next_id(&self) -> Result<SnowflakeId> {
        SnowflakeGenerator::next_id(self)
    }
}

impl<T> core::fmt::Debug for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtomicSnowflakeGenerator")
            .field("worker_id", &self.worker_id)
            .field("layout", &self.layout)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<T> SnowflakeGenerator for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn worker_id(&self) -> u64 {
        self.worker_id
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    fn try_poll_id(&self) -> Result<Poll> {
        self.try_poll_id()
    }
}
