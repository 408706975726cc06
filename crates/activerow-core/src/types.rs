//! Column type definitions.
//!
//! The closed set of semantic column types understood by the coercion and
//! validation engine. Each type has a normalizer and a default validator in
//! `activerow-coerce`, plus zero or more named alternate formats listed by
//! [`ColumnType::supported_formats`].

use serde::{Deserialize, Serialize};

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Boolean flag.
    Boolean,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Free-form text.
    String,
    /// Text restricted to the column's allowed-values set.
    Enum,
    /// Calendar date, normalized to `YYYY-MM-DD` text.
    Date,
    /// Time of day, normalized to `HH:MM:SS` text.
    Time,
    /// Date and time, normalized to `YYYY-MM-DD HH:MM:SS` text.
    Timestamp,
    /// Timestamp carrying a UTC offset suffix.
    TimestampTz,
    /// Bare UTC offset, normalized to `±HH:MM` text.
    TimezoneOffset,
    /// Seconds since the unix epoch, normalized to an integer.
    UnixTimestamp,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// Email address.
    Email,
    /// JSON document stored as encoded text.
    Json,
    /// JSON document stored in a binary column (same value semantics as Json).
    JsonBinary,
    /// Uploaded file contents.
    File,
    /// Uploaded image contents.
    Image,
    /// Opaque binary data.
    Blob,
}

impl ColumnType {
    /// Lowercase type name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Enum => "enum",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TimestampTz => "timestamp_tz",
            ColumnType::TimezoneOffset => "timezone_offset",
            ColumnType::UnixTimestamp => "unix_timestamp",
            ColumnType::Ipv4 => "ipv4",
            ColumnType::Email => "email",
            ColumnType::Json => "json",
            ColumnType::JsonBinary => "json_binary",
            ColumnType::File => "file",
            ColumnType::Image => "image",
            ColumnType::Blob => "blob",
        }
    }

    /// True for date/time-flavored types.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date
                | ColumnType::Time
                | ColumnType::Timestamp
                | ColumnType::TimestampTz
                | ColumnType::UnixTimestamp
        )
    }

    /// True for JSON-encoded types.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, ColumnType::Json | ColumnType::JsonBinary)
    }

    /// True for binary payload types.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, ColumnType::File | ColumnType::Image | ColumnType::Blob)
    }

    /// Named alternate formats this type can be read as.
    ///
    /// Requesting a name outside this list fails with `Error::InvalidFormat`.
    #[must_use]
    pub const fn supported_formats(&self) -> &'static [&'static str] {
        match self {
            ColumnType::Timestamp | ColumnType::TimestampTz => &["date", "time", "unix_ts"],
            ColumnType::Date => &["unix_ts"],
            ColumnType::Time => &["seconds"],
            ColumnType::UnixTimestamp => &["date", "time", "datetime"],
            ColumnType::TimezoneOffset => &["minutes"],
            _ => &[],
        }
    }

    /// Check whether a format name is valid for this type.
    #[must_use]
    pub fn supports_format(&self, format: &str) -> bool {
        self.supported_formats().contains(&format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_predicates() {
        assert!(ColumnType::Timestamp.is_temporal());
        assert!(ColumnType::UnixTimestamp.is_temporal());
        assert!(!ColumnType::Email.is_temporal());
        assert!(ColumnType::JsonBinary.is_json());
        assert!(ColumnType::Image.is_binary());
        assert!(!ColumnType::String.is_binary());
    }

    #[test]
    fn test_supported_formats() {
        assert!(ColumnType::Timestamp.supports_format("unix_ts"));
        assert!(ColumnType::Date.supports_format("unix_ts"));
        assert!(!ColumnType::Date.supports_format("time"));
        assert!(ColumnType::Boolean.supported_formats().is_empty());
    }

    #[test]
    fn test_names() {
        assert_eq!(ColumnType::TimestampTz.name(), "timestamp_tz");
        assert_eq!(ColumnType::Ipv4.name(), "ipv4");
    }
}
