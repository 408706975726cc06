//! Structural type validation.
//!
//! [`validate_type`] checks whether a value is structurally fit for a column
//! type. It is independent of normalization: callers validate untrusted raw
//! input before normalizing it, and the round-trip property guarantees that
//! anything produced by the normalizer validates cleanly.
//!
//! Patterns are compiled lazily on first use and cached for the lifetime of
//! the program.

use std::sync::OnceLock;

use activerow_core::{ColumnType, ErrorCode, Value};
use regex::Regex;

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+$").expect("integer pattern compiles"))
}

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)$").expect("float pattern compiles"))
}

fn ipv4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$").expect("ipv4 pattern compiles")
    })
}

/// Validate a value against a column type, returning symbolic error codes.
///
/// An empty vec means the value is acceptable. `Null` is always structurally
/// acceptable here; null legality against the descriptor's `nullable` flag is
/// the value container's concern.
///
/// `for_condition` relaxes checks for values used in query predicates rather
/// than stored: an email column accepts partial fragments for LIKE-style
/// matching under this flag.
#[must_use]
pub fn validate_type(value: &Value, column_type: ColumnType, for_condition: bool) -> Vec<ErrorCode> {
    if value.is_null() {
        return Vec::new();
    }
    let code = match column_type {
        ColumnType::Boolean => validate_boolean(value),
        ColumnType::Integer => validate_integer(value),
        ColumnType::Float => validate_float(value),
        ColumnType::String | ColumnType::Enum => validate_string(value),
        ColumnType::Date => validate_temporal(value, ErrorCode::NotDate),
        ColumnType::Time => validate_time(value),
        ColumnType::Timestamp | ColumnType::TimestampTz => {
            validate_temporal(value, ErrorCode::NotTimestamp)
        }
        ColumnType::TimezoneOffset => validate_offset(value),
        ColumnType::UnixTimestamp => validate_unix(value),
        ColumnType::Ipv4 => validate_ipv4(value),
        ColumnType::Email => validate_email(value, for_condition),
        ColumnType::Json | ColumnType::JsonBinary => validate_json(value),
        ColumnType::File | ColumnType::Image | ColumnType::Blob => validate_binary(value),
    };
    code.into_iter().collect()
}

fn validate_boolean(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Bool(_) => None,
        Value::Int(0 | 1) => None,
        Value::Text(s) => {
            let ok = matches!(s.as_str(), "" | "0" | "1" | "true" | "false");
            if ok { None } else { Some(ErrorCode::NotBoolean) }
        }
        _ => Some(ErrorCode::NotBoolean),
    }
}

fn validate_integer(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Int(_) => None,
        Value::Float(f) if f.fract() == 0.0 => None,
        Value::Text(s) if integer_re().is_match(s.trim()) => None,
        _ => Some(ErrorCode::NotInteger),
    }
}

/// Float accepts integer-valued strings and floats but rejects booleans.
fn validate_float(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Int(_) | Value::Float(_) => None,
        Value::Text(s) if float_re().is_match(s.trim()) => None,
        _ => Some(ErrorCode::NotFloat),
    }
}

fn validate_string(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Text(_) | Value::Int(_) | Value::Float(_) | Value::Bool(_) => None,
        _ => Some(ErrorCode::NotString),
    }
}

fn validate_temporal(value: &Value, code: ErrorCode) -> Option<ErrorCode> {
    match value {
        Value::Int(_) => None,
        Value::Float(f) if f.fract() == 0.0 => None,
        Value::Text(s) => {
            if crate::datetime::parse_stamp(s, chrono::DateTime::UNIX_EPOCH.naive_utc()).is_some() {
                None
            } else {
                Some(code)
            }
        }
        _ => Some(code),
    }
}

fn validate_time(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Int(i) if *i >= 0 => None,
        Value::Text(s) if crate::datetime::parse_time_of_day(s).is_some() => None,
        _ => validate_temporal(value, ErrorCode::NotTime),
    }
}

fn validate_offset(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Int(_) => None,
        Value::Text(s) if crate::datetime::parse_offset(s).is_some() => None,
        _ => Some(ErrorCode::NotTimezoneOffset),
    }
}

fn validate_unix(value: &Value) -> Option<ErrorCode> {
    validate_temporal(value, ErrorCode::NotUnixTimestamp)
}

fn validate_ipv4(value: &Value) -> Option<ErrorCode> {
    let Some(text) = value.as_str() else {
        return Some(ErrorCode::NotIpv4Address);
    };
    let Some(caps) = ipv4_re().captures(text) else {
        return Some(ErrorCode::NotIpv4Address);
    };
    for i in 1..=4 {
        let octet: u32 = caps
            .get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(256);
        if octet > 255 {
            return Some(ErrorCode::NotIpv4Address);
        }
    }
    None
}

/// Email: exactly one `@`, no leading dot, no bracket characters. Under
/// `for_condition` only the bracket rule applies, so LIKE fragments pass.
fn validate_email(value: &Value, for_condition: bool) -> Option<ErrorCode> {
    let Some(text) = value.as_str() else {
        return Some(ErrorCode::NotEmail);
    };
    if text.contains(['<', '>', '[', ']']) {
        return Some(ErrorCode::NotEmail);
    }
    if for_condition {
        return None;
    }
    if text.starts_with('.') || text.matches('@').count() != 1 {
        return Some(ErrorCode::NotEmail);
    }
    let (local, domain) = text.split_once('@').expect("exactly one @");
    if local.is_empty() || domain.is_empty() || domain.starts_with('.') {
        return Some(ErrorCode::NotEmail);
    }
    None
}

fn validate_json(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Json(_) => None,
        Value::Text(s) => {
            if serde_json::from_str::<serde_json::Value>(s).is_ok() {
                None
            } else {
                Some(ErrorCode::NotJson)
            }
        }
        _ => Some(ErrorCode::NotJson),
    }
}

fn validate_binary(value: &Value) -> Option<ErrorCode> {
    match value {
        Value::Bytes(_) | Value::Text(_) => None,
        _ => Some(ErrorCode::NotBinary),
    }
}
