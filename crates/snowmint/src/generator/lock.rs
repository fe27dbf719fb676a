use std::sync::Arc;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, GenerationPolicy, Layout, Parts, Poll, Result, SnowflakeGenerator, SnowflakeId,
    TimeSource,
    generator::state::{Advance, advance},
};

/// The mutable half of a generator: the last issued millisecond and the
/// sequence value issued within it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct State {
    last_timestamp: u64,
    sequence: u64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The `(last_timestamp, sequence)` pair lives behind a single
/// [`parking_lot::Mutex`]. The clock is read, compared and the state updated
/// in one critical section, so two callers can never observe the same state
/// and issue the same ID.
///
/// Cloning the generator shares the state: clones behave as one generator.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<State>>,
    worker_id: u64,
    layout: Layout,
    policy: GenerationPolicy,
    time: T,
}

impl<T> LockSnowflakeGenerator<T>
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
    /// use snowmint::{Layout, LockSnowflakeGenerator, SnowflakeGenerator, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(15, Layout::DEFAULT, SystemClock::default())?;
    /// let id = generator.next_id()?;
    /// assert_eq!(generator.decompose(id).worker_id, 15);
    ///
    /// assert!(LockSnowflakeGenerator::new(16, Layout::DEFAULT, SystemClock::default()).is_err());
    /// # Ok::<(), snowmint::Error>(())
    /// ```
    pub fn new(worker_id: u64, layout: Layout, time: T) -> Result<Self> {
        Self::from_components(0, worker_id, 0, layout, time)
    }

    /// Creates a generator preloaded with an explicit last timestamp and
    /// sequence.
    ///
    /// Useful for restoring persisted state or for forcing edge cases in
    /// tests. Prefer [`Self::new`] otherwise.
    ///
    /// # Errors
    ///
    /// - [`Error::WorkerIdOutOfRange`] if `worker_id` does not fit in
    ///   `layout`'s worker field.
    /// - [`Error::SequenceOutOfRange`] if `sequence` does not fit in its
    ///   field.
    /// - [`Error::TimestampOverflow`] if `timestamp` does not fit in its
    ///   field.
    pub fn from_components(
        timestamp: u64,
        worker_id: u64,
        sequence: u64,
        layout: Layout,
        time: T,
    ) -> Result<Self> {
        check_components(timestamp, worker_id, sequence, &layout)?;
        let state = State {
            last_timestamp: timestamp,
            sequence,
        };
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(state)),
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
    /// See [`SnowflakeGenerator::try_poll_id`].
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self), fields(worker_id = self.worker_id))
    )]
    pub fn try_poll_id(&self) -> Result<Poll> {
        let mut state = self.state.lock();
        // Read inside the critical section: the reading and the state it is
        // compared against must belong to the same serialised step.
        let now = self.time.current_millis();

        match advance(
            &self.layout,
            self.policy.clock_regression,
            state.last_timestamp,
            state.sequence,
            now,
        )? {
            Advance::Issue {
                timestamp,
                sequence,
            } => {
                *state = State {
                    last_timestamp: timestamp,
                    sequence,
                };
                Ok(Poll::Ready {
                    id: self.layout.compose(Parts {
                        timestamp,
                        worker_id: self.worker_id,
                        sequence,
                    }),
                })
            }
            Advance::Pending { yield_for } => Ok(Poll::Pending { yield_for }),
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

impl<T> Clone for LockSnowflakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            worker_id: self.worker_id,
            layout: self.layout,
            policy: self.policy,
            time: self.time.clone(),
        }
    }
}

impl<T> core::fmt::Debug for LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LockSnowflakeGenerator")
            .field("worker_id", &self.worker_id)
            .field("layout", &self.layout)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<T> SnowflakeGenerator for LockSnowflakeGenerator<T>
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

/// Rejects any field that would not survive packing under `layout`.
pub(crate) fn check_components(
    timestamp: u64,
    worker_id: u64,
    sequence: u64,
    layout: &Layout,
) -> Result<()> {
    if worker_id > layout.max_worker_id() {
        return Err(Error::WorkerIdOutOfRange {
            worker_id,
            max: layout.max_worker_id(),
        });
    }
    if sequence > layout.max_sequence() {
        return Err(Error::SequenceOutOfRange {
            sequence,
            max: layout.max_sequence(),
        });
    }
    if timestamp > layout.max_timestamp() {
        return Err(Error::TimestampOverflow {
            timestamp,
            max: layout.max_timestamp(),
        });
    }
    Ok(())
}
