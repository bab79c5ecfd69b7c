/// Typed cell parsing.
///
/// Turns a cell's text into a value that can be compared under its column's
/// type. Parsing never fails: numeric and date cells that cannot be read fall
/// back to `0`.

use crate::column::{ColumnType, ColumnTyping};
use crate::snapshot::RowRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Leading run of ASCII digits, e.g. the numerator of `12/15`.
static LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+").unwrap());

/// Everything that cannot be part of a plain decimal number.
static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.\-]").unwrap());

/// Longest decimal prefix: optional sign, digits with optional fraction.
static DECIMAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").unwrap());

/// ISO 8601 date-times with an explicit offset that RFC 3339 rejects:
/// no seconds, basic `+HHMM` offsets, or a space separator.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
];

/// Naive date-time layouts tried after the zoned formats, read as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%a %B %d %Y %H:%M:%S",
];

/// Date-only layouts, read as midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%a %B %d %Y",
    "%a, %d %B %Y",
];

/// A comparable cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SortValue::Number(n) => Some(*n),
            SortValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SortValue::Text(s) => Some(s),
            SortValue::Number(_) => None,
        }
    }

    /// Total order used by the sort. Numbers come before text; a single
    /// column never mixes the two.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Parses the cell at `column` of `row` under the table's typing.
pub fn parse_value(row: &RowRecord, column: usize, typing: &ColumnTyping) -> SortValue {
    parse_cell(row.cell(column), typing.column_type(column))
}

/// Parses raw cell text under a column type.
pub fn parse_cell(raw: &str, column_type: ColumnType) -> SortValue {
    let raw = raw.trim();
    match column_type {
        ColumnType::Numeric => SortValue::Number(parse_number(raw)),
        ColumnType::Date => SortValue::Number(parse_date(raw)),
        ColumnType::Text => SortValue::Text(raw.to_lowercase()),
    }
}

/// Reads a number out of free-form cell text.
///
/// A leading digit run wins (`"12/15 wins"` is 12). Otherwise every
/// character other than digits, `.` and `-` is dropped and the longest
/// decimal prefix of what remains is used (`"$1,234.56"` is 1234.56).
/// Anything else is 0.
///
/// ```
/// use table_enhancer::value::parse_number;
///
/// assert_eq!(parse_number("12/15"), 12.0);
/// assert_eq!(parse_number("$1,234.56"), 1234.56);
/// assert_eq!(parse_number("abc"), 0.0);
/// ```
pub fn parse_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if let Some(m) = LEADING_DIGITS.find(raw) {
        return m.as_str().parse::<f64>().unwrap_or(0.0);
    }

    let cleaned = NON_NUMERIC.replace_all(raw, "");
    let value = DECIMAL_PREFIX
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);

    // -0 and NaN both collapse to the sentinel
    if value == 0.0 || value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Reads a calendar date or date-time into milliseconds since the epoch.
///
/// Values without an explicit offset are taken as UTC. Unreadable text
/// yields 0, which sorts together with the epoch itself.
///
/// ```
/// use table_enhancer::value::parse_date;
///
/// assert_eq!(parse_date("1970-01-02"), 86_400_000.0);
/// assert_eq!(parse_date("not a date"), 0.0);
/// ```
pub fn parse_date(raw: &str) -> f64 {
    parse_timestamp_millis(raw.trim()).map_or(0.0, |ms| ms as f64)
}

fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }

    // `Z` is spelled as an offset so the zoned layouts can take it
    let zoned = match raw.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_string(),
    };
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Some(dt.timestamp_millis());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date_millis(date);
        }
    }

    parse_partial_iso(raw)
}

/// `YYYY` and `YYYY-MM`, which name the first day of the period.
fn parse_partial_iso(raw: &str) -> Option<i64> {
    let bytes = raw.as_bytes();
    let padded = match bytes.len() {
        4 if bytes.iter().all(u8::is_ascii_digit) => format!("{raw}-01-01"),
        7 if bytes[4] == b'-' => format!("{raw}-01"),
        _ => return None,
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
        .ok()
        .and_then(date_millis)
}

fn date_millis(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}
