use crate::{Error, Parts, Result, SnowflakeId};

/// The partition of a 64-bit identifier into timestamp, worker and sequence
/// fields.
///
/// The most significant bit is always reserved (zero), so identifiers stay
/// non-negative when read as `i64`. The remaining 63 bits are split, most
/// significant first, into the three fields:
///
/// ```text
///  | reserved (1) | timestamp (T) | worker ID (W) | sequence (S) |   T + W + S = 63
/// ```
///
/// A [`Layout`] can only be obtained through [`Layout::new`] (or the
/// [`Layout::DEFAULT`] constant), so every shift and mask derived from it is
/// guaranteed to be in range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    timestamp_bits: u8,
    worker_bits: u8,
    sequence_bits: u8,
}

// The default layout must always be a valid partition.
const _: () = assert!(
    Layout::DEFAULT.timestamp_bits as u32
        + Layout::DEFAULT.worker_bits as u32
        + Layout::DEFAULT.sequence_bits as u32
        + 1
        == u64::BITS
);

impl Default for Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Layout {
    /// 41 bits of milliseconds (~69.7 years), 16 workers and 262,144 IDs per
    /// worker per millisecond.
    pub const DEFAULT: Self = Self {
        timestamp_bits: 41,
        worker_bits: 4,
        sequence_bits: 18,
    };

    /// Validates and creates a layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] unless `timestamp_bits + worker_bits +
    /// sequence_bits + 1 == 64`.
    ///
    /// # Example
    ///
    /// ```
    /// use snowmint::{Error, Layout};
    ///
    /// assert_eq!(Layout::new(41, 4, 18), Ok(Layout::DEFAULT));
    /// assert!(matches!(Layout::new(41, 4, 17), Err(Error::InvalidLayout { .. })));
    /// ```
    pub fn new(timestamp_bits: u8, worker_bits: u8, sequence_bits: u8) -> Result<Self> {
        let total =
            u32::from(timestamp_bits) + u32::from(worker_bits) + u32::from(sequence_bits) + 1;
        if total != u64::BITS {
            return Err(Error::InvalidLayout {
                timestamp_bits,
                worker_bits,
                sequence_bits,
            });
        }
        Ok(Self {
            timestamp_bits,
            worker_bits,
            sequence_bits,
        })
    }

    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    pub const fn worker_bits(&self) -> u8 {
        self.worker_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Number of bits to shift the timestamp to its position below the
    /// reserved bit.
    pub const fn timestamp_shift(&self) -> u32 {
        63 - self.timestamp_bits as u32
    }

    /// Number of bits to shift the worker ID to its position. Always equal to
    /// the sequence width.
    pub const fn worker_shift(&self) -> u32 {
        self.timestamp_shift() - self.worker_bits as u32
    }

    /// Largest timestamp (milliseconds since epoch) the layout can hold.
    pub const fn max_timestamp(&self) -> u64 {
        mask(self.timestamp_bits)
    }

    /// Largest worker ID the layout can hold.
    pub const fn max_worker_id(&self) -> u64 {
        mask(self.worker_bits)
    }

    /// Largest sequence value the layout can hold.
    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Returns true if `sequence` can be incremented without leaving the
    /// sequence field.
    pub const fn has_sequence_room(&self, sequence: u64) -> bool {
        sequence < self.max_sequence()
    }

    /// Packs the fields into an identifier.
    ///
    /// Fields wider than their slot are truncated to it. Generators never
    /// pass out-of-range values; debug builds assert as much.
    pub fn compose(&self, parts: Parts) -> SnowflakeId {
        debug_assert!(parts.timestamp <= self.max_timestamp(), "timestamp overflow");
        debug_assert!(parts.worker_id <= self.max_worker_id(), "worker_id overflow");
        debug_assert!(parts.sequence <= self.max_sequence(), "sequence overflow");

        let timestamp = (parts.timestamp & self.max_timestamp()) << self.timestamp_shift();
        let worker_id = (parts.worker_id & self.max_worker_id()) << self.worker_shift();
        let sequence = parts.sequence & self.max_sequence();
        SnowflakeId::from_raw(timestamp | worker_id | sequence)
    }

    /// Extracts the fields of an identifier. The exact inverse of
    /// [`Self::compose`].
    pub const fn decompose(&self, id: SnowflakeId) -> Parts {
        let raw = id.to_raw();
        Parts {
            timestamp: (raw >> self.timestamp_shift()) & self.max_timestamp(),
            worker_id: (raw >> self.worker_shift()) & self.max_worker_id(),
            sequence: raw & self.max_sequence(),
        }
    }
}

const fn mask(bits: u8) -> u64 {
    (1_u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_documented_widths() {
        let layout = Layout::DEFAULT;
        assert_eq!(layout.timestamp_shift(), 22);
        assert_eq!(layout.worker_shift(), 18);
        assert_eq!(layout.max_timestamp(), (1 << 41) - 1);
        assert_eq!(layout.max_worker_id(), 15);
        assert_eq!(layout.max_sequence(), 262_143);
    }

    #[test]
    fn accepts_partitions_summing_to_64() {
        assert_eq!(Layout::new(41, 4, 18), Ok(Layout::DEFAULT));
        assert!(Layout::new(41, 10, 12).is_ok());
        assert!(Layout::new(63, 0, 0).is_ok());
    }

    #[test]
    fn rejects_partitions_summing_to_63_or_65() {
        assert_eq!(
            Layout::new(41, 4, 17),
            Err(Error::InvalidLayout {
                timestamp_bits: 41,
                worker_bits: 4,
                sequence_bits: 17,
            })
        );
        assert!(matches!(
            Layout::new(41, 4, 19),
            Err(Error::InvalidLayout { .. })
        ));
    }

    #[test]
    fn rejects_widths_that_would_wrap_a_u8_sum() {
        assert!(Layout::new(255, 255, 255).is_err());
        assert!(Layout::new(200, 56, 7).is_err());
    }

    #[test]
    fn compose_matches_packing_formula() {
        let layout = Layout::DEFAULT;
        let id = layout.compose(Parts {
            timestamp: 1_234_567,
            worker_id: 9,
            sequence: 4_321,
        });
        let expected = (1_234_567_u64 << 22) | (9 << 18) | 4_321;
        assert_eq!(id.to_raw(), expected);
    }

    #[test]
    fn decompose_recovers_fields_at_their_maximums() {
        let layout = Layout::new(39, 8, 16).unwrap();
        let parts = Parts {
            timestamp: layout.max_timestamp(),
            worker_id: layout.max_worker_id(),
            sequence: layout.max_sequence(),
        };
        let id = layout.compose(parts);
        assert_eq!(layout.decompose(id), parts);
        assert_eq!(id.to_raw(), u64::MAX >> 1);
        assert!(id.to_i64() >= 0);
    }

    #[test]
    fn sequence_room_stops_at_field_maximum() {
        let layout = Layout::DEFAULT;
        assert!(layout.has_sequence_room(0));
        assert!(layout.has_sequence_room(layout.max_sequence() - 1));
        assert!(!layout.has_sequence_room(layout.max_sequence()));
    }

    #[test]
    fn zero_width_fields_are_always_zero() {
        let layout = Layout::new(63, 0, 0).unwrap();
        assert_eq!(layout.max_worker_id(), 0);
        assert_eq!(layout.max_sequence(), 0);
        let id = layout.compose(Parts {
            timestamp: 7,
            worker_id: 0,
            sequence: 0,
        });
        assert_eq!(id.to_raw(), 7);
        assert_eq!(layout.decompose(id).timestamp, 7);
    }
}
