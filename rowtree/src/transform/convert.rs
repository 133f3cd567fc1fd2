//! Pure value converters
//!
//! Every converter absorbs parse failures locally and reports them as
//! `Value::Null` (or an empty string for the formatters); they never error.
//! Dates have two canonical external encodings: an 8-digit `YYYYMMDD`
//! integer and a formatted string, either `"%d %b %Y"` (default) or an
//! ISO-8601 instant `"%Y-%m-%dT%H:%M:%S%.3fZ"`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::value::Value;

/// Default render format, e.g. "31 May 2007"
pub const DEFAULT_DATE_FORMAT: &str = "%d %b %Y";
/// ISO-8601 instant encoding with millisecond precision
pub const ISO_INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const YEAR_FORMAT: &str = "%Y";
// "dd MMM yyyy" strings are always 11 characters
const DEFAULT_FORMAT_LEN: usize = 11;

/// Loose truthiness: null, "false", "f", "no", "n", "0" and the empty string
/// (case-insensitive) are false, everything else is true
pub fn to_bool(value: &Value) -> bool {
    let Some(s) = value.lexical() else {
        return false;
    };
    let s = s.to_lowercase();
    !matches!(s.as_str(), "false" | "f" | "no" | "n" | "0" | "")
}

/// False iff the value is null or its lexical form is empty
pub fn str_to_bool(value: &Value) -> bool {
    value.lexical().is_some_and(|s| !s.is_empty())
}

/// "Y" iff [`to_bool`] holds, else "N"
pub fn to_yn(value: &Value) -> Value {
    Value::String(if to_bool(value) { "Y" } else { "N" }.to_string())
}

/// Parse as integer; null on failure
pub fn to_int(value: &Value) -> Value {
    match parse_int(value) {
        Some(i) => Value::Int(i),
        None => Value::Null,
    }
}

/// Parse as integer; the supplied default on failure
pub fn to_int_or_default(value: &Value, default: i64) -> Value {
    Value::Int(parse_int(value).unwrap_or(default))
}

/// Promote a bare year to the `YYYYMMDD` integer scale
///
/// Parses as integer; values up to 9999 are multiplied by 10000, larger
/// values pass through unchanged. Null on parse failure.
pub fn to_year_or_null(value: &Value) -> Value {
    match parse_int(value) {
        Some(year) if year <= 9999 => Value::Int(year * 10000),
        Some(other) => Value::Int(other),
        None => Value::Null,
    }
}

/// Render a date value or 8-digit integer with the given chrono format
///
/// Null or unparseable input yields an empty string, never an error.
pub fn format_date(value: &Value, format: &str) -> Value {
    let date = match value {
        Value::DateTime(dt) => Some(dt.date_naive()),
        Value::Null => None,
        other => other.lexical().as_deref().and_then(parse_compact_date),
    };
    let rendered = date.and_then(|d| render(d, format)).unwrap_or_default();
    Value::String(rendered)
}

/// Render only the 4-digit year of a date or 8-digit integer
pub fn date_to_year(value: &Value) -> Value {
    format_date(value, YEAR_FORMAT)
}

/// Decode an 8-digit integer or a canonically formatted string into a date
///
/// Date-time values pass through unchanged; null on failure.
pub fn to_date(value: &Value) -> Value {
    match value {
        Value::DateTime(dt) => Value::DateTime(*dt),
        _ => match parse_any_date(value) {
            Some(date) => Value::DateTime(midnight_utc(date)),
            None => Value::Null,
        },
    }
}

/// Encode a date (or anything [`to_date`] accepts) as an 8-digit integer
pub fn to_int_date(value: &Value) -> Value {
    let date = match value {
        Value::DateTime(dt) => Some(dt.date_naive()),
        _ => parse_any_date(value),
    };
    match date {
        Some(d) => Value::Int(encode_compact(d)),
        None => Value::Null,
    }
}

/// Parse a bare year into January 1 of that year; null/empty yields null
pub fn year_to_date(value: &Value) -> Value {
    let Some(s) = value.lexical() else {
        return Value::Null;
    };
    if s.is_empty() {
        return Value::Null;
    }
    let date = s
        .parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    match date {
        Some(d) => Value::DateTime(midnight_utc(d)),
        None => Value::Null,
    }
}

/// Parse a bare 4-character year into the 8-digit integer for January 1
///
/// Input of any other length yields null.
pub fn year_to_int_date(value: &Value) -> Value {
    let Some(s) = value.lexical() else {
        return Value::Null;
    };
    if s.len() != 4 {
        return Value::Null;
    }
    match s.parse::<i64>() {
        // adding 101 encodes the first of january
        Ok(year) => Value::Int(year * 10000 + 101),
        Err(_) => Value::Null,
    }
}

/// Lexical string form, empty string for null
pub fn to_str_or_empty(value: &Value) -> Value {
    Value::String(value.lexical().unwrap_or_default())
}

fn parse_int(value: &Value) -> Option<i64> {
    if let Value::Int(i) = value {
        return Some(*i);
    }
    value.lexical()?.parse().ok()
}

/// Parse any accepted external date encoding into a calendar date
fn parse_any_date(value: &Value) -> Option<NaiveDate> {
    let s = value.lexical()?;
    if let Some(date) = parse_compact_date(&s) {
        return Some(date);
    }
    if s.len() == DEFAULT_FORMAT_LEN {
        return NaiveDate::parse_from_str(&s, DEFAULT_DATE_FORMAT).ok();
    }
    NaiveDateTime::parse_from_str(&s, ISO_INSTANT_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Parse an 8-digit `YYYYMMDD` string, validating the calendar date
fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn encode_compact(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    date.year() as i64 * 10000 + date.month() as i64 * 100 + date.day() as i64
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Render through chrono, absorbing bad format strings as `None`
fn render(date: NaiveDate, format: &str) -> Option<String> {
    use std::fmt::Write;
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}
