use core::time::Duration;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `snowmint` can produce.
///
/// The first four variants are configuration errors: they are only returned
/// while constructing a layout, clock or generator, and a generator that was
/// built successfully can never produce them. The remaining variants come
/// from issuance and depend on the [`GenerationPolicy`] in effect.
///
/// [`GenerationPolicy`]: crate::GenerationPolicy
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The field widths plus the reserved bit do not add up to 64.
    #[error(
        "timestamp ({timestamp_bits}) + worker ({worker_bits}) + sequence ({sequence_bits}) + 1 reserved bit != 64 bits"
    )]
    InvalidLayout {
        timestamp_bits: u8,
        worker_bits: u8,
        sequence_bits: u8,
    },

    /// The worker identifier does not fit in the layout's worker field.
    #[error("worker id {worker_id} exceeds the maximum worker id of {max}")]
    WorkerIdOutOfRange { worker_id: u64, max: u64 },

    /// A preloaded sequence does not fit in the layout's sequence field.
    #[error("sequence {sequence} exceeds the maximum sequence of {max}")]
    SequenceOutOfRange { sequence: u64, max: u64 },

    /// The wall clock reads earlier than the requested epoch.
    #[error("system clock is {behind:?} before the configured epoch")]
    ClockBeforeEpoch { behind: Duration },

    /// The clock reads past the largest timestamp the layout can hold.
    #[error("timestamp {timestamp}ms exceeds the layout maximum of {max}ms")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// The clock reads earlier than the last issued timestamp and the
    /// generator is configured with [`ClockRegression::Reject`].
    ///
    /// [`ClockRegression::Reject`]: crate::ClockRegression::Reject
    #[error("clock moved backwards: last issued at {last}ms, clock now reads {now}ms")]
    ClockMovedBackwards { last: u64, now: u64 },

    /// The generator waited longer than its configured `max_wait` for the
    /// clock to advance.
    #[error("clock did not advance within {waited:?}")]
    ClockStalled { waited: Duration },
}

impl Error {
    /// Returns `true` for errors raised while building a generator.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidLayout { .. }
                | Self::WorkerIdOutOfRange { .. }
                | Self::SequenceOutOfRange { .. }
                | Self::ClockBeforeEpoch { .. }
        )
    }
}
