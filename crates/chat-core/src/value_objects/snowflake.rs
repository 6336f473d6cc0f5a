//! Snowflake ID - the platform's 64-bit unique identifier
//!
//! Structure:
//! - Bits 63-22: Timestamp (milliseconds since the platform epoch)
//! - Bits 21-17: Internal worker ID
//! - Bits 16-12: Internal process ID
//! - Bits 11-0:  Increment

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Platform Snowflake ID (64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Platform epoch: 2015-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: u64 = 1_420_070_400_000;

    /// Create a new Snowflake from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Build the smallest Snowflake for a unix timestamp in milliseconds
    ///
    /// Useful as a pagination bound; timestamps before the epoch clamp to zero.
    pub const fn from_timestamp(unix_millis: u64) -> Self {
        Self(unix_millis.saturating_sub(Self::EPOCH) << 22)
    }

    /// Extract timestamp (milliseconds since Unix epoch)
    #[inline]
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 22) + Self::EPOCH
    }

    /// Extract internal worker ID (0-31)
    #[inline]
    pub fn worker_id(&self) -> u8 {
        ((self.0 & 0x3E_0000) >> 17) as u8
    }

    /// Extract internal process ID (0-31)
    #[inline]
    pub fn process_id(&self) -> u8 {
        ((self.0 & 0x1_F000) >> 12) as u8
    }

    /// Extract increment (0-4095)
    #[inline]
    pub fn increment(&self) -> u16 {
        (self.0 & 0xFFF) as u16
    }

    /// Convert timestamp to DateTime<Utc>
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp() as i64)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// The platform sends ids as strings (JavaScript BigInt safety)
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a snowflake ID")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("negative snowflake"))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("invalid snowflake string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example id from the platform's reference documentation
    const DOC_ID: u64 = 175_928_847_299_117_063;

    #[test]
    fn test_snowflake_creation() {
        let sf = Snowflake::new(123_456_789);
        assert_eq!(sf.into_inner(), 123_456_789);
    }

    #[test]
    fn test_snowflake_parse() {
        let sf = Snowflake::parse("123456789").unwrap();
        assert_eq!(sf.into_inner(), 123_456_789);

        assert!(Snowflake::parse("invalid").is_err());
        assert!(Snowflake::parse("-1").is_err());
    }

    #[test]
    fn test_snowflake_components() {
        let sf = Snowflake::new(DOC_ID);
        assert_eq!(sf.timestamp(), 1_462_015_105_796);
        assert_eq!(sf.worker_id(), 1);
        assert_eq!(sf.process_id(), 0);
        assert_eq!(sf.increment(), 7);
    }

    #[test]
    fn test_snowflake_created_at() {
        let sf = Snowflake::new(DOC_ID);
        assert_eq!(sf.created_at().timestamp_millis(), 1_462_015_105_796);
    }

    #[test]
    fn test_from_timestamp() {
        let sf = Snowflake::from_timestamp(1_462_015_105_796);
        assert_eq!(sf.timestamp(), 1_462_015_105_796);
        assert_eq!(sf.increment(), 0);

        assert_eq!(Snowflake::from_timestamp(0).into_inner(), 0);
    }

    #[test]
    fn test_snowflake_serialize_json() {
        let sf = Snowflake::new(DOC_ID);
        let json = serde_json::to_string(&sf).unwrap();
        assert_eq!(json, "\"175928847299117063\"");
    }

    #[test]
    fn test_snowflake_deserialize_string_or_number() {
        let sf: Snowflake = serde_json::from_str("\"175928847299117063\"").unwrap();
        assert_eq!(sf.into_inner(), DOC_ID);

        let sf: Snowflake = serde_json::from_str("7").unwrap();
        assert_eq!(sf.into_inner(), 7);

        assert!(serde_json::from_str::<Snowflake>("-7").is_err());
        assert!(serde_json::from_str::<Snowflake>("\"abc\"").is_err());
    }

    #[test]
    fn test_snowflake_display() {
        assert_eq!(Snowflake::new(42).to_string(), "42");
    }
}
