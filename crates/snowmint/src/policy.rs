use core::time::Duration;
use std::time::Instant;

use crate::{Error, Result};

/// What a generator does when the clock reads earlier than the last issued
/// timestamp.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockRegression {
    /// Treat the earlier reading like any new millisecond: reset the sequence
    /// and adopt the earlier timestamp.
    ///
    /// Issuance never stalls, but an ID issued after the regression can be
    /// smaller than one issued before it, and repeated regressions can
    /// re-enter a millisecond whose sequence values were already issued.
    #[default]
    Adopt,

    /// Report [`Poll::Pending`] until the clock catches up with the last
    /// issued timestamp. Keeps IDs strictly increasing.
    ///
    /// [`Poll::Pending`]: crate::Poll::Pending
    Wait,

    /// Fail the call with [`Error::ClockMovedBackwards`].
    Reject,
}

/// How [`SnowflakeGenerator::next_id`] waits while the generator reports
/// [`Poll::Pending`].
///
/// [`SnowflakeGenerator::next_id`]: crate::SnowflakeGenerator::next_id
/// [`Poll::Pending`]: crate::Poll::Pending
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backoff {
    /// Busy-wait, re-reading the clock as fast as possible. Lowest latency,
    /// burns a core while waiting.
    #[default]
    Spin,

    /// Yield the thread to the OS scheduler between attempts.
    Yield,

    /// Sleep for the suggested number of milliseconds between attempts
    /// (spinning when the suggestion is zero).
    Sleep,
}

impl Backoff {
    /// Waits once, for roughly `yield_for` milliseconds.
    pub fn wait(self, yield_for: u64) {
        self.pause(Duration::from_millis(yield_for));
    }

    pub(crate) fn pause(self, pause: Duration) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep if pause.is_zero() => core::hint::spin_loop(),
            Self::Sleep => std::thread::sleep(pause),
        }
    }
}

/// The per-generator behaviour fixed at construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GenerationPolicy {
    pub clock_regression: ClockRegression,
    pub backoff: Backoff,
    /// Upper bound on how long a single `next_id` call may wait for the
    /// clock. `None` waits for as long as it takes.
    pub max_wait: Option<Duration>,
}

/// Tracks how long a blocking call has been waiting against
/// [`GenerationPolicy::max_wait`].
///
/// The deadline is only armed on the first pending poll so the hot path never
/// reads the clock for it.
#[derive(Debug)]
pub(crate) struct WaitBudget {
    max_wait: Option<Duration>,
    started: Option<Instant>,
}

impl WaitBudget {
    pub(crate) const fn new(max_wait: Option<Duration>) -> Self {
        Self {
            max_wait,
            started: None,
        }
    }

    /// Records a pending poll that asked to wait `yield_for` milliseconds.
    ///
    /// Returns how long to pause before the next poll: `yield_for`, cut down
    /// to whatever is left of the budget. Fails once the budget is spent.
    pub(crate) fn charge(&mut self, yield_for: u64) -> Result<Duration> {
        let pause = Duration::from_millis(yield_for);
        let Some(max_wait) = self.max_wait else {
            return Ok(pause);
        };
        let started = *self.started.get_or_insert_with(Instant::now);
        let waited = started.elapsed();
        if waited >= max_wait {
            #[cfg(feature = "tracing")]
            tracing::warn!(?waited, ?max_wait, "clock did not advance in time");
            return Err(Error::ClockStalled { waited });
        }
        Ok(pause.min(max_wait - waited))
    }
}
