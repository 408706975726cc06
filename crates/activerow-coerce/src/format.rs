//! Derived value formats.
//!
//! Each temporal column type exposes a small dispatch table of named
//! alternate representations (a timestamp can be read as its date, its time,
//! or its epoch seconds). Requesting a name outside the type's table fails
//! with `Error::InvalidFormat`.

use activerow_core::{ColumnType, Error, Result, Value};
use chrono::DateTime;

use crate::datetime::{
    format_date, format_datetime, format_time, parse_offset, parse_stamp, parse_time_of_day,
    seconds_of_day,
};

/// Render a normalized value in one of its type's named formats.
pub fn format_value(value: &Value, column_type: ColumnType, format: &str) -> Result<Value> {
    if !column_type.supports_format(format) {
        return Err(Error::InvalidFormat {
            column_type,
            format: format.to_string(),
        });
    }
    if value.is_null() {
        return Ok(Value::Null);
    }
    let formatted = match (column_type, format) {
        (ColumnType::Timestamp | ColumnType::TimestampTz, "date") => {
            Value::Text(format_date(stamp_seconds(value)))
        }
        (ColumnType::Timestamp | ColumnType::TimestampTz, "time") => {
            Value::Text(format_time(stamp_seconds(value)))
        }
        (ColumnType::Timestamp | ColumnType::TimestampTz, "unix_ts") => {
            Value::Int(stamp_seconds(value))
        }
        (ColumnType::Date, "unix_ts") => Value::Int(stamp_seconds(value)),
        (ColumnType::Time, "seconds") => Value::Int(time_seconds(value)),
        (ColumnType::UnixTimestamp, "date") => Value::Text(format_date(stamp_seconds(value))),
        (ColumnType::UnixTimestamp, "time") => Value::Text(format_time(stamp_seconds(value))),
        (ColumnType::UnixTimestamp, "datetime") => {
            Value::Text(format_datetime(stamp_seconds(value)))
        }
        (ColumnType::TimezoneOffset, "minutes") => Value::Int(offset_minutes(value)),
        _ => {
            return Err(Error::InvalidFormat {
                column_type,
                format: format.to_string(),
            });
        }
    };
    Ok(formatted)
}

fn stamp_seconds(value: &Value) -> i64 {
    match value {
        Value::Int(i) => (*i).max(0),
        Value::Text(s) => {
            parse_stamp(s, DateTime::UNIX_EPOCH.naive_utc()).map_or(0, |stamp| stamp.seconds)
        }
        _ => 0,
    }
}

fn time_seconds(value: &Value) -> i64 {
    match value {
        Value::Int(i) => (*i).max(0).rem_euclid(86_400),
        Value::Text(s) => parse_time_of_day(s).unwrap_or_else(|| seconds_of_day(stamp_seconds(value))),
        _ => 0,
    }
}

fn offset_minutes(value: &Value) -> i64 {
    match value {
        Value::Int(i) => *i,
        Value::Text(s) => i64::from(parse_offset(s).unwrap_or(0)),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formats() {
        let ts = Value::Text("2016-09-01 10:30:00".into());
        assert_eq!(
            format_value(&ts, ColumnType::Timestamp, "date").unwrap(),
            Value::Text("2016-09-01".into())
        );
        assert_eq!(
            format_value(&ts, ColumnType::Timestamp, "time").unwrap(),
            Value::Text("10:30:00".into())
        );
        assert_eq!(
            format_value(&ts, ColumnType::Timestamp, "unix_ts").unwrap(),
            Value::Int(1_472_725_800)
        );
    }

    #[test]
    fn test_unix_timestamp_formats() {
        let ts = Value::Int(1_472_688_000);
        assert_eq!(
            format_value(&ts, ColumnType::UnixTimestamp, "datetime").unwrap(),
            Value::Text("2016-09-01 00:00:00".into())
        );
        assert_eq!(
            format_value(&ts, ColumnType::UnixTimestamp, "date").unwrap(),
            Value::Text("2016-09-01".into())
        );
    }

    #[test]
    fn test_time_and_offset_formats() {
        assert_eq!(
            format_value(&Value::Text("01:02:03".into()), ColumnType::Time, "seconds").unwrap(),
            Value::Int(3723)
        );
        assert_eq!(
            format_value(&Value::Text("-05:30".into()), ColumnType::TimezoneOffset, "minutes")
                .unwrap(),
            Value::Int(-330)
        );
    }

    #[test]
    fn test_unsupported_format_fails() {
        let err = format_value(&Value::Int(0), ColumnType::Timestamp, "week").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { format, .. } if format == "week"));
        let err = format_value(&Value::Bool(true), ColumnType::Boolean, "date").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_null_stays_null() {
        assert_eq!(
            format_value(&Value::Null, ColumnType::Date, "unix_ts").unwrap(),
            Value::Null
        );
    }
}
