use core::fmt;

/// A packed 64-bit Snowflake-style identifier.
///
/// Identifiers compare by their packed integer value, which orders them by
/// timestamp first, then worker ID, then sequence. The field boundaries are
/// not stored in the value; decode it with the [`Layout`] that produced it.
///
/// ```
/// use snowmint::{Layout, Parts};
///
/// let layout = Layout::DEFAULT;
/// let id = layout.compose(Parts { timestamp: 1000, worker_id: 2, sequence: 1 });
/// assert_eq!(layout.decompose(id), Parts { timestamp: 1000, worker_id: 2, sequence: 1 });
/// assert_eq!(id.to_string(), "4194828289");
/// ```
///
/// [`Layout`]: crate::Layout
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Wraps a raw packed value.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the identifier as a signed integer, for storage in `BIGINT`
    /// style columns.
    ///
    /// Identifiers produced by a [`Layout`] keep the most significant bit
    /// clear, so the value is never negative. A raw value with the reserved
    /// bit set is reinterpreted bit-for-bit.
    ///
    /// [`Layout`]: crate::Layout
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns the ID as a zero-padded 20-digit string.
    ///
    /// Padded strings sort lexicographically in the same order as the IDs
    /// themselves.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnowflakeId")
            .field(&format_args!("{:#018x}", self.id))
            .finish()
    }
}

/// The decoded fields of a [`SnowflakeId`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parts {
    /// Milliseconds since the generator's epoch.
    pub timestamp: u64,
    pub worker_id: u64,
    pub sequence: u64,
}
