// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Date inputs and their resolution to a concrete [`Moment`].
//!
//! Template values arrive as JSON values. Null, the empty string and the
//! literal `"now"` mean "the current instant". Numbers are milliseconds since
//! the Unix epoch. Strings are tried against a fixed list of layouts:
//!
//! | layout | interpretation |
//! |---|---|
//! | RFC 3339 / RFC 2822 | absolute instant |
//! | `2024-03-07 10:00:00+01:00` | absolute instant |
//! | `2024-03-07T10:00[:00[.000]]` | floating wall clock |
//! | `2024-03-07`, `2024-03`, `2024` | floating midnight |
//!
//! Floating values carry no offset, so their wall clock is taken verbatim in
//! the render time zone.

use crate::error::DateInputError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;

/// Largest magnitude of a millisecond timestamp (±100,000,000 days).
///
/// chrono stops at year ±262143 (about ±8.2e15 ms), so timestamps between
/// that and this bound are also out of range.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Layouts with an explicit offset.
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Layouts without an offset.
const FLOATING_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// The first argument of the date filter.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// Null, missing, or the empty string
    Absent,
    /// The literal token `"now"`
    Now,
    /// Milliseconds since the Unix epoch
    Timestamp(f64),
    /// Text still to be parsed
    Text(String),
    /// An instant with a known offset
    Zoned(DateTime<FixedOffset>),
    /// A wall-clock value with no offset
    Floating(NaiveDateTime),
    /// Values that never coerce to a date
    Unsupported,
}

impl DateInput {
    /// Classify a template value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => DateInput::Absent,
            Value::String(s) => DateInput::from(s.as_str()),
            Value::Number(n) => n
                .as_f64()
                .map_or(DateInput::Unsupported, DateInput::Timestamp),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => DateInput::Unsupported,
        }
    }

    /// True for inputs that stand for the current instant.
    #[must_use]
    pub fn is_current(&self) -> bool {
        matches!(self, DateInput::Absent | DateInput::Now)
    }

    /// Resolve to a concrete moment in `zone`, using `now` for the current instant.
    pub fn resolve(&self, zone: Tz, now: DateTime<Utc>) -> Result<Moment, DateInputError> {
        match self {
            DateInput::Absent | DateInput::Now => Ok(Moment::from_instant(now, zone)),
            DateInput::Timestamp(ms) => moment_from_millis(*ms, zone),
            DateInput::Text(text) => parse_text(text, zone)
                .ok_or_else(|| DateInputError::Unparseable(text.clone())),
            DateInput::Zoned(dt) => Ok(Moment::from_instant(dt.with_timezone(&Utc), zone)),
            DateInput::Floating(wall) => Ok(Moment::floating(*wall, zone)),
            DateInput::Unsupported => Err(DateInputError::UnsupportedType),
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        match s {
            "" => DateInput::Absent,
            "now" => DateInput::Now,
            other => DateInput::Text(other.to_string()),
        }
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(dt: DateTime<Utc>) -> Self {
        DateInput::Zoned(dt.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        DateInput::Zoned(dt)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(wall: NaiveDateTime) -> Self {
        DateInput::Floating(wall)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Floating(date.and_time(NaiveTime::MIN))
    }
}

/// A resolved instant together with its wall clock in the render time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    instant: DateTime<Utc>,
    wall: NaiveDateTime,
}

impl Moment {
    /// An absolute instant viewed from `zone`.
    #[must_use]
    pub fn from_instant(instant: DateTime<Utc>, zone: Tz) -> Self {
        Self {
            instant,
            wall: instant.with_timezone(&zone).naive_local(),
        }
    }

    /// A wall-clock value placed in `zone`.
    ///
    /// Ambiguous times take the earlier instant. Times skipped by a DST gap
    /// are read as UTC for the instant while keeping the requested wall clock.
    #[must_use]
    pub fn floating(wall: NaiveDateTime, zone: Tz) -> Self {
        let instant = zone
            .from_local_datetime(&wall)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&wall));
        Self { instant, wall }
    }

    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    #[must_use]
    pub fn wall_clock(&self) -> NaiveDateTime {
        self.wall
    }

    /// Calendar date on the wall clock.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.wall.date()
    }

    /// Wall clock of the same instant seen from another zone.
    #[must_use]
    pub fn wall_clock_in(&self, zone: Tz) -> NaiveDateTime {
        self.instant.with_timezone(&zone).naive_local()
    }
}

fn moment_from_millis(ms: f64, zone: Tz) -> Result<Moment, DateInputError> {
    if !ms.is_finite() || ms.abs() > MAX_EPOCH_MILLIS {
        return Err(DateInputError::OutOfRange(ms.to_string()));
    }
    // Fractional milliseconds truncate toward zero
    DateTime::from_timestamp_millis(ms.trunc() as i64)
        .map(|instant| Moment::from_instant(instant, zone))
        .ok_or_else(|| DateInputError::OutOfRange(ms.to_string()))
}

fn parse_text(text: &str, zone: Tz) -> Option<Moment> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let absolute = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .or_else(|| {
            OFFSET_LAYOUTS
                .iter()
                .find_map(|layout| DateTime::parse_from_str(text, layout).ok())
        });
    if let Some(dt) = absolute {
        return Some(Moment::from_instant(dt.with_timezone(&Utc), zone));
    }

    FLOATING_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| parse_partial_date(text).map(|date| date.and_time(NaiveTime::MIN)))
        .map(|wall| Moment::floating(wall, zone))
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`, missing parts default to the first.
fn parse_partial_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.splitn(3, '-');
    let year = parts.next().filter(|y| is_digits(y, 4))?;
    let month = parts.next();
    let day = parts.next();

    let year: i32 = year.parse().ok()?;
    let month: u32 = match month {
        Some(m) if is_digits(m, 2) => m.parse().ok()?,
        Some(_) => return None,
        None => 1,
    };
    let day: u32 = match day {
        Some(d) if is_digits(d, 2) => d.parse().ok()?,
        Some(_) => return None,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    }

    fn resolve(value: Value) -> Result<Moment, DateInputError> {
        DateInput::from_value(&value).resolve(Tz::UTC, now())
    }

    #[test]
    fn test_current_markers() {
        for value in [json!(null), json!(""), json!("now")] {
            let input = DateInput::from_value(&value);
            assert!(input.is_current(), "{value} should mean now");
            assert_eq!(input.resolve(Tz::UTC, now()).unwrap().instant(), now());
        }
    }

    #[test]
    fn test_now_is_case_sensitive() {
        assert_eq!(DateInput::from("NOW"), DateInput::Text("NOW".to_string()));
        assert!(resolve(json!("NOW")).is_err());
    }

    #[test]
    fn test_date_only_is_floating() {
        let zone: Tz = "America/Los_Angeles".parse().unwrap();
        let moment = DateInput::from("2024-03-07").resolve(zone, now()).unwrap();
        assert_eq!(moment.date(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(moment.instant().to_rfc3339(), "2024-03-07T08:00:00+00:00");
    }

    #[test]
    fn test_partial_dates() {
        let moment = resolve(json!("2024-03")).unwrap();
        assert_eq!(moment.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let moment = resolve(json!("2024")).unwrap();
        assert_eq!(moment.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert!(resolve(json!("2024-13-01")).is_err());
        assert!(resolve(json!("24-03-07")).is_err());
        assert!(resolve(json!("20240307")).is_err());
    }

    #[test]
    fn test_offset_is_converted_to_zone() {
        let zone: Tz = "Europe/London".parse().unwrap();
        let moment = DateInput::from("2024-03-07T23:30:00-05:00")
            .resolve(zone, now())
            .unwrap();
        assert_eq!(moment.date(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert_eq!(moment.wall_clock().hour(), 4);
        assert_eq!(moment.wall_clock().minute(), 30);
    }

    #[test]
    fn test_local_datetime_layouts() {
        for text in [
            "2024-03-07T10:15:00",
            "2024-03-07T10:15",
            "2024-03-07 10:15:00",
            "2024-03-07 10:15:00.250",
        ] {
            let moment = resolve(json!(text)).unwrap();
            assert_eq!(moment.wall_clock().hour(), 10, "{text}");
            assert_eq!(moment.wall_clock().minute(), 15, "{text}");
        }
    }

    #[test]
    fn test_rfc2822() {
        let moment = resolve(json!("Thu, 07 Mar 2024 10:00:00 +0000")).unwrap();
        assert_eq!(moment.date().day(), 7);
    }

    #[test]
    fn test_timestamps() {
        let moment = resolve(json!(1_709_769_600_000_i64)).unwrap();
        assert_eq!(moment.instant().to_rfc3339(), "2024-03-07T00:00:00+00:00");

        let moment = resolve(json!(1.9)).unwrap();
        assert_eq!(moment.instant().timestamp_millis(), 1);

        assert!(matches!(
            resolve(json!(9.0e15)),
            Err(DateInputError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_timestamps_past_chrono_range() {
        // Year 275760 is past chrono's last representable year
        for ms in [8.64e15, -8.64e15, 8.3e15] {
            assert!(matches!(
                resolve(json!(ms)),
                Err(DateInputError::OutOfRange(_))
            ));
        }

        let moment = resolve(json!(8.2e15)).unwrap();
        assert!(moment.date().year() > 200_000);
        let moment = resolve(json!(-8.2e15)).unwrap();
        assert!(moment.date().year() < -200_000);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            resolve(json!("not-a-date")),
            Err(DateInputError::Unparseable(_))
        ));
        assert_eq!(resolve(json!(true)), Err(DateInputError::UnsupportedType));
        assert_eq!(resolve(json!([2024, 3, 7])), Err(DateInputError::UnsupportedType));
        assert_eq!(resolve(json!({"year": 2024})), Err(DateInputError::UnsupportedType));
        assert!(resolve(json!("   ")).is_err());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let moment = resolve(json!("  2024-03-07 ")).unwrap();
        assert_eq!(moment.date().month(), 3);
    }

    #[test]
    fn test_dst_gap_keeps_wall_clock() {
        let zone: Tz = "America/New_York".parse().unwrap();
        let wall = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let moment = Moment::floating(wall, zone);
        assert_eq!(moment.wall_clock(), wall);
    }
}
