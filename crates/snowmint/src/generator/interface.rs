use crate::{GenerationPolicy, Layout, Parts, Poll, Result, SnowflakeId, policy::WaitBudget};

/// A minimal interface for issuing Snowflake IDs.
///
/// The trait is object safe, so generators with different clocks or
/// synchronisation strategies can sit behind one `dyn SnowflakeGenerator`.
pub trait SnowflakeGenerator {
    /// The worker ID encoded into every issued ID.
    fn worker_id(&self) -> u64;

    /// The bit layout of issued IDs.
    fn layout(&self) -> Layout;

    /// The behaviour chosen at construction.
    fn policy(&self) -> GenerationPolicy;

    /// Attempts to issue the next ID without waiting.
    ///
    /// Returns [`Poll::Ready`] with a new ID, or [`Poll::Pending`] with the
    /// number of milliseconds to wait before retrying.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOverflow`] once the clock passes the layout's
    ///   range.
    /// - [`Error::ClockMovedBackwards`] if the clock regressed and the policy
    ///   is [`ClockRegression::Reject`].
    ///
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    /// [`ClockRegression::Reject`]: crate::ClockRegression::Reject
    fn try_poll_id(&self) -> Result<Poll>;

    /// Issues the next ID, waiting for the clock when needed.
    ///
    /// Every ID returned by one generator is distinct, and strictly greater
    /// than every ID it returned before, as long as the clock does not move
    /// backwards. When the current millisecond's sequence space is exhausted
    /// the call waits, using the policy's [`Backoff`], until the clock
    /// reaches the next millisecond; no sequence value is skipped or reused.
    ///
    /// # Errors
    ///
    /// Everything [`Self::try_poll_id`] returns, plus
    /// [`Error::ClockStalled`] if the policy bounds the wait with `max_wait`
    /// and the clock does not advance in time.
    ///
    /// [`Backoff`]: crate::Backoff
    /// [`Error::ClockStalled`]: crate::Error::ClockStalled
    fn next_id(&self) -> Result<SnowflakeId> {
        let policy = self.policy();
        let mut budget = WaitBudget::new(policy.max_wait);
        loop {
            match self.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => {
                    let pause = budget.charge(yield_for)?;
                    policy.backoff.pause(pause);
                }
            }
        }
    }

    /// Splits an ID issued under this generator's layout into its fields.
    fn decompose(&self, id: SnowflakeId) -> Parts {
        self.layout().decompose(id)
    }
}
