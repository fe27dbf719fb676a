use crate::SnowflakeId;

/// The outcome of a single non-blocking attempt to issue an identifier.
///
/// - [`Poll::Ready`] carries a freshly issued ID.
/// - [`Poll::Pending`] means nothing was issued: the current millisecond's
///   sequence space is exhausted, another thread won a race, or the clock is
///   behind the last issued timestamp. Retry after `yield_for` milliseconds.
///
/// This allows non-blocking generation loops and custom backoff strategies.
///
/// # Example
///
/// ```
/// use snowmint::{Layout, LockSnowflakeGenerator, Poll, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::new(0, Layout::DEFAULT, FixedTime)?;
/// match generator.try_poll_id()? {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// # Ok::<(), snowmint::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was issued and is ready to use.
    Ready {
        /// The issued ID.
        id: SnowflakeId,
    },
    /// No ID was issued.
    Pending {
        /// Milliseconds to wait before trying again. Zero means retry
        /// immediately.
        yield_for: u64,
    },
}

impl Poll {
    /// Returns the ID if one was issued.
    pub const fn ready(self) -> Option<SnowflakeId> {
        match self {
            Self::Ready { id } => Some(id),
            Self::Pending { .. } => None,
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
