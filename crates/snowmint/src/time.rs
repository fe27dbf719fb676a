use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use crate::{Error, Result};

/// Default epoch: Sunday, January 1, 2023 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_672_531_200_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH_MILLIS: Duration = Duration::from_millis(0);

/// A source of elapsed milliseconds since some fixed epoch.
///
/// Generators read the clock through this trait, which allows you to plug in
/// the wall clock, a monotonic clock, or a mocked time source in tests.
///
/// # Example
///
/// ```
/// use snowmint::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Reads the wall clock on every call.
///
/// This clock follows the operating system, including NTP corrections and
/// manual adjustments, so consecutive readings may go backwards. How a
/// generator reacts to that is decided by its [`ClockRegression`] policy.
/// Prefer [`MonotonicClock`] when that matters more than tracking the wall
/// clock across long uptimes.
///
/// [`ClockRegression`]: crate::ClockRegression
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch_millis: u64,
}

impl Default for SystemClock {
    /// Wall clock measured from [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self {
            epoch_millis: duration_millis(DEFAULT_EPOCH),
        }
    }
}

impl SystemClock {
    /// Creates a wall clock measured from `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the wall clock currently reads
    /// earlier than `epoch`.
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let now = unix_now();
        if now < epoch {
            return Err(Error::ClockBeforeEpoch {
                behind: epoch - now,
            });
        }
        Ok(Self {
            epoch_millis: duration_millis(epoch),
        })
    }

    /// The epoch, in milliseconds since 1970-01-01 UTC.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch_millis
    }
}

impl TimeSource for SystemClock {
    /// Wall-clock milliseconds since the epoch. Saturates at zero if the wall
    /// clock has been set back before the epoch.
    fn current_millis(&self) -> u64 {
        duration_millis(unix_now()).saturating_sub(self.epoch_millis)
    }
}

/// A time source that never goes backwards.
///
/// The wall clock is sampled once at construction to find the offset from
/// the epoch; after that, time advances by the elapsed [`Instant`]. External
/// adjustments to the system clock therefore have no effect on readings.
///
/// Clones share the same anchor, so every clone reports the same time.
#[derive(Copy, Clone, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`DEFAULT_EPOCH`].
    ///
    /// Falls back to an offset of zero if the wall clock reads before the
    /// default epoch.
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH).unwrap_or_else(|_| Self {
            start: Instant::now(),
            epoch_offset: 0,
        })
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the wall clock currently reads
    /// earlier than `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use snowmint::{MonotonicClock, TimeSource, DEFAULT_EPOCH};
    ///
    /// let clock = MonotonicClock::with_epoch(DEFAULT_EPOCH)?;
    /// let a = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(2));
    /// assert!(clock.current_millis() >= a);
    /// # Ok::<(), snowmint::Error>(())
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let start = Instant::now();
        let now = unix_now();
        let offset = now
            .checked_sub(epoch)
            .ok_or_else(|| Error::ClockBeforeEpoch {
                behind: epoch - now,
            })?;
        Ok(Self {
            start,
            epoch_offset: duration_millis(offset),
        })
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.epoch_offset + duration_millis(self.start.elapsed())
    }
}

fn unix_now() -> Duration {
    // A wall clock before 1970 is treated as 1970.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
