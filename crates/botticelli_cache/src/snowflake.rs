//! Discord-style snowflake identifiers.
//!
//! A snowflake carries its own creation time: shifting the id right by 22 bits
//! yields milliseconds since the Discord epoch (2015-01-01T00:00:00Z). The
//! cache derives entry age and eviction order from this value alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds between the Unix epoch and the Discord epoch.
pub const DISCORD_EPOCH_MILLIS: u64 = 1_420_070_400_000;

/// Number of low-order bits below the timestamp.
const TIMESTAMP_SHIFT: u32 = 22;

/// A 64-bit identifier with an embedded creation timestamp.
///
/// Ordering is the raw integer ordering, which sorts by creation time first
/// and by the worker/process/increment bits second.
///
/// # Example
///
/// ```
/// use botticelli_cache::Snowflake;
///
/// let id = Snowflake::new(175_928_847_299_117_063);
/// assert_eq!(id.unix_millis(), 1_462_015_105_796);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{}", _0)]
#[serde(transparent)]
pub struct Snowflake(u64);

/// Identifier of an originating command message.
pub type CommandId = Snowflake;

/// Identifier of a response produced for a command.
pub type ResponseId = Snowflake;

impl Snowflake {
    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Milliseconds since the Discord epoch.
    pub const fn timestamp_millis(self) -> u64 {
        self.0 >> TIMESTAMP_SHIFT
    }

    /// Milliseconds since the Unix epoch.
    pub const fn unix_millis(self) -> u64 {
        self.timestamp_millis() + DISCORD_EPOCH_MILLIS
    }

    /// Creation time embedded in the identifier.
    ///
    /// Returns `None` if the time cannot be represented as a `DateTime`.
    pub fn created_at(self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.unix_millis()).ok()?;
        DateTime::from_timestamp_millis(millis)
    }

    /// Smallest snowflake created at the given Unix millisecond.
    ///
    /// Times before the Discord epoch clamp to the epoch.
    pub const fn from_unix_millis(millis: u64) -> Self {
        let since_epoch = millis.saturating_sub(DISCORD_EPOCH_MILLIS);
        Self(since_epoch << TIMESTAMP_SHIFT)
    }

    /// Smallest snowflake created at the given instant.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        Self::from_unix_millis(millis)
    }

    /// Same creation time, with the low 22 bits replaced by `sequence`.
    pub const fn with_sequence(self, sequence: u64) -> Self {
        let mask = (1 << TIMESTAMP_SHIFT) - 1;
        Self((self.0 & !mask) | (sequence & mask))
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_known_discord_id() {
        let id = Snowflake::new(175_928_847_299_117_063);
        let expected = Utc.with_ymd_and_hms(2016, 4, 30, 11, 18, 25).unwrap()
            + chrono::Duration::milliseconds(796);
        assert_eq!(id.created_at(), Some(expected));
    }

    #[test]
    fn datetime_conversion_keeps_millisecond() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let id = Snowflake::from_datetime(at).with_sequence(99);
        assert_eq!(id.created_at(), Some(at));
        assert_eq!(id.get() & 0x3F_FFFF, 99);
    }

    #[test]
    fn ordering_follows_creation_time() {
        let earlier = Snowflake::from_unix_millis(DISCORD_EPOCH_MILLIS + 10).with_sequence(500);
        let later = Snowflake::from_unix_millis(DISCORD_EPOCH_MILLIS + 11);
        assert!(earlier < later);
    }

    #[test]
    fn small_ids_sit_on_the_epoch() {
        assert_eq!(Snowflake::new(4).timestamp_millis(), 0);
        assert_eq!(Snowflake::new(4).unix_millis(), DISCORD_EPOCH_MILLIS);
    }
}
