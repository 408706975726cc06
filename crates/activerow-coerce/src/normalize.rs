//! Value normalization.
//!
//! [`Coercer::normalize`] is deterministic and total: every input maps to a
//! typed value, never an error. Junk numeric input truncates toward zero,
//! junk temporal input lands on the epoch floor, and `Null` passes through
//! untouched for every type (null legality is the container's concern).
//!
//! The coercer carries the base instant used to resolve relative date
//! expressions; [`Coercer::at`] pins it for reproducible tests.

use activerow_core::{ColumnType, Value};
use chrono::{NaiveDateTime, Utc};

use crate::datetime::{
    format_date, format_datetime, format_offset, format_time, parse_offset, parse_stamp,
    parse_time_of_day, seconds_of_day,
};

/// The stateless normalization engine plus its relative-expression base.
#[derive(Debug, Clone, Copy)]
pub struct Coercer {
    base: NaiveDateTime,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new()
    }
}

impl Coercer {
    /// Coercer whose relative expressions resolve against the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Utc::now().naive_utc(),
        }
    }

    /// Coercer with a pinned base instant.
    #[must_use]
    pub const fn at(base: NaiveDateTime) -> Self {
        Self { base }
    }

    /// Normalize raw input into the canonical value for a column type.
    #[must_use]
    pub fn normalize(&self, raw: &Value, column_type: ColumnType) -> Value {
        if raw.is_null() {
            return Value::Null;
        }
        match column_type {
            ColumnType::Boolean => Value::Bool(truthy(raw)),
            ColumnType::Integer => Value::Int(int_of(raw)),
            ColumnType::Float => Value::Float(float_of(raw)),
            ColumnType::String | ColumnType::Enum | ColumnType::Email | ColumnType::Ipv4 => {
                Value::Text(text_of(raw))
            }
            ColumnType::Date => Value::Text(format_date(self.stamp_of(raw))),
            ColumnType::Time => Value::Text(format_time(self.day_seconds_of(raw))),
            ColumnType::Timestamp => Value::Text(format_datetime(self.stamp_of(raw))),
            ColumnType::TimestampTz => {
                let (seconds, offset) = self.stamp_with_offset(raw);
                Value::Text(format!(
                    "{}{}",
                    format_datetime(seconds),
                    format_offset(offset)
                ))
            }
            ColumnType::TimezoneOffset => Value::Text(format_offset(offset_of(raw))),
            ColumnType::UnixTimestamp => Value::Int(self.stamp_of(raw)),
            ColumnType::Json | ColumnType::JsonBinary => normalize_json(raw),
            ColumnType::File | ColumnType::Image | ColumnType::Blob => normalize_binary(raw),
        }
    }

    fn stamp_of(&self, raw: &Value) -> i64 {
        match raw {
            Value::Int(i) => (*i).max(0),
            Value::Float(f) => (f.trunc() as i64).max(0),
            Value::Bool(b) => i64::from(*b),
            Value::Text(s) => parse_stamp(s, self.base).map_or(0, |stamp| stamp.seconds),
            _ => 0,
        }
    }

    fn stamp_with_offset(&self, raw: &Value) -> (i64, i32) {
        match raw {
            Value::Text(s) => parse_stamp(s, self.base)
                .map_or((0, 0), |stamp| (stamp.seconds, stamp.offset_minutes.unwrap_or(0))),
            other => (self.stamp_of(other), 0),
        }
    }

    fn day_seconds_of(&self, raw: &Value) -> i64 {
        match raw {
            Value::Int(i) => {
                if *i < 0 {
                    0
                } else {
                    i.rem_euclid(86_400)
                }
            }
            Value::Text(s) => parse_time_of_day(s)
                .unwrap_or_else(|| seconds_of_day(self.stamp_of(raw))),
            _ => seconds_of_day(self.stamp_of(raw)),
        }
    }
}

/// Boolean truthiness: `0`, `false`, `""`, `"0"`, and empty collections are
/// false; everything else (including the string `"false"`) is true.
fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Text(s) => !(s.is_empty() || s == "0"),
        Value::Bytes(b) => !b.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Json(j) => json_truthy(j),
    }
}

fn json_truthy(j: &serde_json::Value) -> bool {
    match j {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !(s.is_empty() || s == "0"),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(_) => true,
    }
}

fn int_of(raw: &Value) -> i64 {
    match raw {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Int(i) => *i,
        Value::Float(f) => f.trunc() as i64,
        Value::Text(s) => numeric_prefix(s).trunc() as i64,
        Value::Json(j) => j.as_i64().or_else(|| j.as_f64().map(|f| f.trunc() as i64)).unwrap_or(0),
        Value::Bytes(_) | Value::Array(_) => 0,
    }
}

fn float_of(raw: &Value) -> f64 {
    match raw {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Text(s) => numeric_prefix(s),
        Value::Json(j) => j.as_f64().unwrap_or(0.0),
        Value::Bytes(_) | Value::Array(_) => 0.0,
    }
}

/// Parse the leading numeric prefix of a string, truncating at the first
/// non-numeric character: `"1a"` -> 1.0, `"s1"` -> 0.0, `"-3.7x"` -> -3.7.
fn numeric_prefix(s: &str) -> f64 {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 {
            end = frac;
        }
    }
    if end == digits_start {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

fn offset_of(raw: &Value) -> i32 {
    match raw {
        // Small integers read as whole hours, larger ones as minutes.
        Value::Int(i) => {
            let i = *i;
            if i.abs() <= 14 {
                (i * 60) as i32
            } else {
                i.clamp(-14 * 60, 14 * 60) as i32
            }
        }
        Value::Text(s) => parse_offset(s).unwrap_or(0),
        _ => 0,
    }
}

fn text_of(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Value::Json(j) => match j {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()).to_string(),
    }
}

/// Convert an engine value into a JSON document.
pub(crate) fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => {
            serde_json::Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
        Value::Json(j) => j.clone(),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
    }
}

/// Encode-if-not-already-encoded: pre-encoded JSON text passes through, so
/// the operation is idempotent.
fn normalize_json(raw: &Value) -> Value {
    match raw {
        Value::Text(s) => {
            if serde_json::from_str::<serde_json::Value>(s).is_ok() {
                Value::Text(s.clone())
            } else {
                Value::Text(serde_json::Value::String(s.clone()).to_string())
            }
        }
        other => Value::Text(to_json(other).to_string()),
    }
}

fn normalize_binary(raw: &Value) -> Value {
    match raw {
        Value::Bytes(_) | Value::Text(_) => raw.clone(),
        other => Value::Bytes(text_of(other).into_bytes()),
    }
}
