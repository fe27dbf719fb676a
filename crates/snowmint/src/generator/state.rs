use core::cmp::Ordering;

use crate::{ClockRegression, Error, Layout, Result};

/// The decision reached for one clock reading against the last issued state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Issue an ID with these fields and store them as the new state.
    Issue { timestamp: u64, sequence: u64 },
    /// Issue nothing; retry after `yield_for` milliseconds.
    Pending { yield_for: u64 },
}

/// The three-way check shared by every generator.
///
/// - Same millisecond: bump the sequence, or report pending once the
///   sequence field is full. A full sequence is never incremented, so
///   `sequence <= layout.max_sequence()` holds for every issued ID.
/// - Later millisecond: adopt it with sequence 0.
/// - Earlier millisecond: defer to the [`ClockRegression`] policy.
///
/// Callers must hold exclusive access to `(last, sequence)` for the whole
/// read-decide-store cycle.
#[inline]
pub(crate) fn advance(
    layout: &Layout,
    regression: ClockRegression,
    last: u64,
    sequence: u64,
    now: u64,
) -> Result<Advance> {
    if now > layout.max_timestamp() {
        return Err(cold_timestamp_overflow(now, layout.max_timestamp()));
    }

    match now.cmp(&last) {
        Ordering::Equal => {
            if layout.has_sequence_room(sequence) {
                Ok(Advance::Issue {
                    timestamp: now,
                    sequence: sequence + 1,
                })
            } else {
                Ok(Advance::Pending { yield_for: 1 })
            }
        }
        Ordering::Greater => Ok(Advance::Issue {
            timestamp: now,
            sequence: 0,
        }),
        Ordering::Less => cold_clock_behind(regression, last, now),
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(regression: ClockRegression, last: u64, now: u64) -> Result<Advance> {
    #[cfg(feature = "tracing")]
    tracing::warn!(last, now, ?regression, "clock moved backwards");

    match regression {
        ClockRegression::Adopt => Ok(Advance::Issue {
            timestamp: now,
            sequence: 0,
        }),
        ClockRegression::Wait => Ok(Advance::Pending {
            yield_for: last - now,
        }),
        ClockRegression::Reject => Err(Error::ClockMovedBackwards { last, now }),
    }
}

#[cold]
#[inline(never)]
fn cold_timestamp_overflow(timestamp: u64, max: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!(timestamp, max, "timestamp exceeds layout range");

    Error::TimestampOverflow { timestamp, max }
}
