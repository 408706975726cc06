//! Civil date/time parsing for the coercion engine.
//!
//! Accepts epoch integers, `Y-m-d` / `d-m-Y` dates with optional time-of-day,
//! bare times, UTC-offset suffixes, and relative expressions (`"+1 day"`).
//! Out-of-range time components roll forward into the next minute/hour/day;
//! any negative component clamps the result to the epoch floor
//! (1970-01-01 00:00:00). Unparsable input is reported as `None`; the
//! normalizer maps it to the floor, the validator to an error code.

use std::sync::OnceLock;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;

/// Seconds for 9999-12-31 23:59:59, the ceiling kept for formatting safety.
const MAX_SECONDS: i64 = 253_402_300_799;

/// A parsed instant: epoch seconds (floor-clamped) plus an optional explicit
/// UTC offset in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedStamp {
    /// Seconds since the epoch floor, never negative.
    pub seconds: i64,
    /// Explicit offset carried by the input, if any.
    pub offset_minutes: Option<i32>,
}

impl ParsedStamp {
    const fn at(seconds: i64) -> Self {
        Self {
            seconds,
            offset_minutes: None,
        }
    }
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
}

fn clamp_seconds(seconds: i64) -> i64 {
    seconds.clamp(0, MAX_SECONDS)
}

fn datetime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{1,4})[-/.](\d{1,2})[-/.](\d{1,4})(?:[ T](-?\d{1,3}):(-?\d{1,2})(?::(-?\d{1,3}))?)?(?:\s*([+-]\d{1,2}:?\d{2}))?$",
        )
        .expect("datetime pattern compiles")
    })
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(-?\d{1,3}):(-?\d{1,2})(?::(-?\d{1,3}))?$").expect("time pattern compiles")
    })
}

fn relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)([+-]\d+)\s*(second|sec|minute|min|hour|day|week|month|year)s?$")
            .expect("relative pattern compiles")
    })
}

fn offset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([+-]?)(\d{1,2})(?::?(\d{2}))?$").expect("offset pattern compiles"))
}

/// Parse a UTC offset (`"+02:00"`, `"-5:30"`, `"+2"`, `"2"`) into minutes.
#[must_use]
pub fn parse_offset(raw: &str) -> Option<i32> {
    let caps = offset_re().captures(raw.trim())?;
    let sign = if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        -1
    } else {
        1
    };
    let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: i32 = caps
        .get(3)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Format an offset in minutes as canonical `±HH:MM`.
#[must_use]
pub fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// Parse a bare time of day (`"23:59:60"`) into seconds, rolling overflow
/// forward within the day and clamping negative components to midnight.
#[must_use]
pub fn parse_time_of_day(raw: &str) -> Option<i64> {
    let caps = time_re().captures(raw.trim())?;
    let hours: i64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: i64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: i64 = caps
        .get(3)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    if hours < 0 || minutes < 0 || seconds < 0 {
        return Some(0);
    }
    Some((hours * 3600 + minutes * 60 + seconds).rem_euclid(86_400))
}

/// Parse any supported date/time expression relative to `base`.
///
/// Returns `None` only for input that matches no supported shape; recognized
/// shapes always yield a floor-clamped instant.
#[must_use]
pub fn parse_stamp(raw: &str, base: NaiveDateTime) -> Option<ParsedStamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Epoch seconds, possibly negative (clamped to the floor).
    if let Ok(epoch) = raw.parse::<i64>() {
        return Some(ParsedStamp::at(clamp_seconds(epoch)));
    }

    if let Some(stamp) = parse_relative(raw, base) {
        return Some(stamp);
    }

    if let Some(caps) = datetime_re().captures(raw) {
        let first = caps.get(1)?.as_str();
        let second: u32 = caps.get(2)?.as_str().parse().ok()?;
        let third = caps.get(3)?.as_str();

        // Four digits pin the year; `d-m-Y` otherwise requires it trailing.
        let (year, month, day): (i32, u32, u32) = if first.len() == 4 {
            (first.parse().ok()?, second, third.parse().ok()?)
        } else if third.len() == 4 {
            (third.parse().ok()?, second, first.parse().ok()?)
        } else {
            (first.parse().ok()?, second, third.parse().ok()?)
        };

        let hours: i64 = caps.get(4).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        let minutes: i64 = caps.get(5).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        let seconds: i64 = caps.get(6).map_or(Ok(0), |m| m.as_str().parse()).ok()?;

        // Negative components clamp to the epoch floor.
        if hours < 0 || minutes < 0 || seconds < 0 {
            return Some(ParsedStamp {
                seconds: 0,
                offset_minutes: caps.get(7).and_then(|m| parse_offset(m.as_str())),
            });
        }

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let days = (date - epoch_date()).num_days();
        let total = days * 86_400 + hours * 3600 + minutes * 60 + seconds;

        return Some(ParsedStamp {
            seconds: clamp_seconds(total),
            offset_minutes: caps.get(7).and_then(|m| parse_offset(m.as_str())),
        });
    }

    // Bare time of day resolves against the epoch date.
    parse_time_of_day(raw).map(ParsedStamp::at)
}

fn parse_relative(raw: &str, base: NaiveDateTime) -> Option<ParsedStamp> {
    let caps = relative_re().captures(raw)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_ascii_lowercase();

    let base_seconds = base.and_utc().timestamp();
    let seconds = match unit.as_str() {
        "second" | "sec" => base_seconds + amount,
        "minute" | "min" => base_seconds + amount * 60,
        "hour" => base_seconds + amount * 3600,
        "day" => base_seconds + amount * 86_400,
        "week" => base_seconds + amount * 7 * 86_400,
        "month" => shift_months(base, amount)?,
        "year" => shift_months(base, amount * 12)?,
        _ => return None,
    };
    Some(ParsedStamp::at(clamp_seconds(seconds)))
}

fn shift_months(base: NaiveDateTime, months: i64) -> Option<i64> {
    let date = if months >= 0 {
        base.date().checked_add_months(Months::new(u32::try_from(months).ok()?))?
    } else {
        base.date()
            .checked_sub_months(Months::new(u32::try_from(-months).ok()?))?
    };
    let shifted = date.and_time(base.time());
    Some(shifted.and_utc().timestamp())
}

fn to_datetime(seconds: i64) -> NaiveDateTime {
    DateTime::from_timestamp(clamp_seconds(seconds), 0)
        .expect("clamped seconds are in range")
        .naive_utc()
}

/// Canonical `YYYY-MM-DD` for an instant.
#[must_use]
pub fn format_date(seconds: i64) -> String {
    to_datetime(seconds).format("%Y-%m-%d").to_string()
}

/// Canonical `HH:MM:SS` for an instant's time of day.
#[must_use]
pub fn format_time(seconds: i64) -> String {
    to_datetime(seconds).format("%H:%M:%S").to_string()
}

/// Canonical `YYYY-MM-DD HH:MM:SS` for an instant.
#[must_use]
pub fn format_datetime(seconds: i64) -> String {
    to_datetime(seconds).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Seconds-of-day for an instant.
#[must_use]
pub fn seconds_of_day(seconds: i64) -> i64 {
    i64::from(to_datetime(seconds).num_seconds_from_midnight())
}
