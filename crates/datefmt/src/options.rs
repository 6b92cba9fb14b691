// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Interpretation of the formatting-options structure.
//!
//! The structure is passed through from templates unvalidated; this module
//! reads the keys it understands and turns them into a [`FieldPlan`]: which
//! date fields to show, at what length, how precise the time is, and which
//! clock and zone to use. Unknown keys are ignored. Unknown values and
//! impossible combinations are [`FormatError`]s.

use crate::directive::DateStyle;
use crate::error::FormatError;
use chrono_tz::Tz;
use serde_json::{Map, Value};

const NUMERIC: &[&str] = &["numeric", "2-digit"];
const TEXTUAL: &[&str] = &["long", "short", "narrow"];
const MONTH: &[&str] = &["numeric", "2-digit", "long", "short", "narrow"];
const HOUR_CYCLES: &[&str] = &["h11", "h12", "h23", "h24"];

/// Component options that may not be mixed with dateStyle/timeStyle.
const COMPONENT_KEYS: &[&str] = &["weekday", "year", "month", "day", "hour", "minute", "second"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Short,
    Medium,
    Long,
}

/// Date fields to display, named by their letters (E = weekday).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFieldSet {
    D,
    MD,
    YMD,
    DE,
    MDE,
    YMDE,
    E,
    M,
    YM,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    Hour,
    Minute,
    Second,
}

/// How the year is written. `Auto` lets the locale shorten it (`24`) at
/// short lengths; `Full` always writes every digit (`2024`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStyle {
    Auto,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourCycle {
    H11,
    H12,
    H23,
}

impl HourCycle {
    /// Value of the `hc` locale extension keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            HourCycle::H11 => "h11",
            HourCycle::H12 => "h12",
            HourCycle::H23 => "h23",
        }
    }
}

/// Everything the locale-aware formatter needs besides the locale itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPlan {
    pub length: Length,
    pub date_fields: Option<DateFieldSet>,
    /// Set only when `date_fields` includes the year
    pub year_style: Option<YearStyle>,
    pub time_precision: Option<TimePrecision>,
    pub hour_cycle: Option<HourCycle>,
    pub time_zone: Option<Tz>,
}

impl FieldPlan {
    pub fn from_options(options: &Map<String, Value>) -> Result<Self, FormatError> {
        let date_style = style_option(options, "dateStyle")?;
        let time_style = style_option(options, "timeStyle")?;
        let hour_cycle = hour_cycle_option(options)?;
        let time_zone = time_zone_option(options)?;

        if date_style.is_some() || time_style.is_some() {
            if let Some(key) = COMPONENT_KEYS.iter().find(|key| is_set(options, key)) {
                return Err(FormatError::StyleConflict(key.to_string()));
            }
            return Ok(Self::from_styles(date_style, time_style, hour_cycle, time_zone));
        }

        let weekday = enum_option(options, "weekday", TEXTUAL)?;
        let year = enum_option(options, "year", NUMERIC)?;
        let month = enum_option(options, "month", MONTH)?;
        let day = enum_option(options, "day", NUMERIC)?;
        let hour = enum_option(options, "hour", NUMERIC)?;
        let minute = enum_option(options, "minute", NUMERIC)?;
        let second = enum_option(options, "second", NUMERIC)?;

        let date_fields = date_fields(weekday.is_some(), year.is_some(), month.is_some(), day.is_some())?;
        let time_precision = match (hour, minute, second) {
            (_, _, Some(_)) => Some(TimePrecision::Second),
            (_, Some(_), None) => Some(TimePrecision::Minute),
            (Some(_), None, None) => Some(TimePrecision::Hour),
            (None, None, None) => None,
        };

        // Nothing requested: numeric year, month and day
        if date_fields.is_none() && time_precision.is_none() {
            return Ok(Self {
                length: Length::Short,
                date_fields: Some(DateFieldSet::YMD),
                year_style: Some(YearStyle::Full),
                time_precision: None,
                hour_cycle,
                time_zone,
            });
        }

        let length = match (month, weekday) {
            (Some("long"), _) | (None, Some("long")) => Length::Long,
            (Some("short" | "narrow"), _) | (None, Some("short" | "narrow")) => Length::Medium,
            _ => Length::Short,
        };

        let year_style = year.map(|year| match year {
            "2-digit" => YearStyle::Auto,
            _ => YearStyle::Full,
        });

        Ok(Self {
            length,
            date_fields,
            year_style,
            time_precision,
            hour_cycle,
            time_zone,
        })
    }

    fn from_styles(
        date_style: Option<DateStyle>,
        time_style: Option<DateStyle>,
        hour_cycle: Option<HourCycle>,
        time_zone: Option<Tz>,
    ) -> Self {
        let time_precision = time_style.map(|style| match style {
            DateStyle::Short => TimePrecision::Minute,
            _ => TimePrecision::Second,
        });
        let (length, date_fields) = match date_style {
            Some(DateStyle::Full) => (Length::Long, Some(DateFieldSet::YMDE)),
            Some(DateStyle::Long) => (Length::Long, Some(DateFieldSet::YMD)),
            Some(DateStyle::Medium) => (Length::Medium, Some(DateFieldSet::YMD)),
            Some(DateStyle::Short) => (Length::Short, Some(DateFieldSet::YMD)),
            None => (style_length(time_style), None),
        };
        Self {
            length,
            date_fields,
            year_style: date_fields.map(|_| YearStyle::Auto),
            time_precision,
            hour_cycle,
            time_zone,
        }
    }
}

fn style_length(style: Option<DateStyle>) -> Length {
    match style {
        Some(DateStyle::Short) => Length::Short,
        Some(DateStyle::Full | DateStyle::Long) => Length::Long,
        Some(DateStyle::Medium) | None => Length::Medium,
    }
}

fn date_fields(
    weekday: bool,
    year: bool,
    month: bool,
    day: bool,
) -> Result<Option<DateFieldSet>, FormatError> {
    let fields = match (weekday, year, month, day) {
        (false, false, false, false) => return Ok(None),
        (false, true, true, true) => DateFieldSet::YMD,
        (true, true, true, true) => DateFieldSet::YMDE,
        (false, false, true, true) => DateFieldSet::MD,
        (true, false, true, true) => DateFieldSet::MDE,
        (false, false, false, true) => DateFieldSet::D,
        (true, false, false, true) => DateFieldSet::DE,
        (false, true, true, false) => DateFieldSet::YM,
        (false, false, true, false) => DateFieldSet::M,
        (false, true, false, false) => DateFieldSet::Y,
        (true, false, false, false) => DateFieldSet::E,
        _ => {
            let names: Vec<&str> = [("weekday", weekday), ("year", year), ("month", month), ("day", day)]
                .into_iter()
                .filter_map(|(name, set)| set.then_some(name))
                .collect();
            return Err(FormatError::UnsupportedFields(names.join("+")));
        }
    };
    Ok(Some(fields))
}

/// Present and not null.
fn is_set(options: &Map<String, Value>, key: &str) -> bool {
    options.get(key).is_some_and(|v| !v.is_null())
}

/// Option values are compared as strings; `{year: 1}` reads as `"1"`.
fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn enum_option<'a>(
    options: &Map<String, Value>,
    key: &str,
    allowed: &[&'a str],
) -> Result<Option<&'a str>, FormatError> {
    let Some(value) = options.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let text = option_text(value);
    allowed
        .iter()
        .find(|candidate| **candidate == text)
        .map(|candidate| Some(*candidate))
        .ok_or_else(|| FormatError::InvalidOption {
            option: key.to_string(),
            value: text,
        })
}

fn style_option(options: &Map<String, Value>, key: &str) -> Result<Option<DateStyle>, FormatError> {
    let Some(value) = options.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let text = option_text(value);
    text.parse::<DateStyle>()
        .map(Some)
        .map_err(|_| FormatError::InvalidStyle {
            option: key.to_string(),
            value: text,
        })
}

/// `hour12` wins over `hourCycle`.
fn hour_cycle_option(options: &Map<String, Value>) -> Result<Option<HourCycle>, FormatError> {
    if let Some(value) = options.get("hour12").filter(|v| !v.is_null()) {
        return match value {
            Value::Bool(true) => Ok(Some(HourCycle::H12)),
            Value::Bool(false) => Ok(Some(HourCycle::H23)),
            other => Err(FormatError::InvalidOption {
                option: "hour12".to_string(),
                value: option_text(other),
            }),
        };
    }
    Ok(enum_option(options, "hourCycle", HOUR_CYCLES)?.map(|cycle| match cycle {
        "h11" => HourCycle::H11,
        "h12" => HourCycle::H12,
        // h24 has no locale data of its own
        _ => HourCycle::H23,
    }))
}

fn time_zone_option(options: &Map<String, Value>) -> Result<Option<Tz>, FormatError> {
    let Some(value) = options.get("timeZone").filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let name = option_text(value);
    if name.eq_ignore_ascii_case("utc") {
        return Ok(Some(Tz::UTC));
    }
    name.parse::<Tz>()
        .map(Some)
        .map_err(|_| FormatError::InvalidTimeZone(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(options: Value) -> Result<FieldPlan, FormatError> {
        FieldPlan::from_options(options.as_object().unwrap())
    }

    #[test]
    fn test_date_styles() {
        let p = plan(json!({"dateStyle": "full"})).unwrap();
        assert_eq!(p.date_fields, Some(DateFieldSet::YMDE));
        assert_eq!(p.length, Length::Long);
        assert_eq!(p.time_precision, None);

        let p = plan(json!({"dateStyle": "medium", "timeStyle": "short"})).unwrap();
        assert_eq!(p.date_fields, Some(DateFieldSet::YMD));
        assert_eq!(p.length, Length::Medium);
        assert_eq!(p.time_precision, Some(TimePrecision::Minute));

        let p = plan(json!({"timeStyle": "long"})).unwrap();
        assert_eq!(p.date_fields, None);
        assert_eq!(p.time_precision, Some(TimePrecision::Second));
    }

    #[test]
    fn test_invalid_style() {
        assert_eq!(
            plan(json!({"dateStyle": "huge"})),
            Err(FormatError::InvalidStyle {
                option: "dateStyle".to_string(),
                value: "huge".to_string()
            })
        );
        assert!(matches!(
            plan(json!({"timeStyle": ""})),
            Err(FormatError::InvalidStyle { .. })
        ));
    }

    #[test]
    fn test_style_conflicts_with_components() {
        assert_eq!(
            plan(json!({"dateStyle": "long", "year": "numeric"})),
            Err(FormatError::StyleConflict("year".to_string()))
        );
        // Null components don't count
        assert!(plan(json!({"dateStyle": "long", "year": null})).is_ok());
    }

    #[test]
    fn test_components() {
        let p = plan(json!({"year": "numeric", "month": "long", "day": "numeric"})).unwrap();
        assert_eq!(p.date_fields, Some(DateFieldSet::YMD));
        assert_eq!(p.length, Length::Long);
        assert_eq!(p.year_style, Some(YearStyle::Full));

        let p = plan(json!({"year": "2-digit", "month": "2-digit", "day": "2-digit"})).unwrap();
        assert_eq!(p.year_style, Some(YearStyle::Auto));

        let p = plan(json!({"month": "short", "day": "2-digit", "weekday": "short"})).unwrap();
        assert_eq!(p.date_fields, Some(DateFieldSet::MDE));
        assert_eq!(p.length, Length::Medium);

        let p = plan(json!({"hour": "numeric", "minute": "2-digit"})).unwrap();
        assert_eq!(p.date_fields, None);
        assert_eq!(p.year_style, None);
        assert_eq!(p.time_precision, Some(TimePrecision::Minute));
    }

    #[test]
    fn test_unsupported_component_combination() {
        assert_eq!(
            plan(json!({"year": "numeric", "day": "numeric"})),
            Err(FormatError::UnsupportedFields("year+day".to_string()))
        );
    }

    #[test]
    fn test_empty_options_default_to_numeric_date() {
        let p = plan(json!({"someUnknownKey": true})).unwrap();
        assert_eq!(p.date_fields, Some(DateFieldSet::YMD));
        assert_eq!(p.length, Length::Short);
        assert_eq!(p.year_style, Some(YearStyle::Full));
    }

    #[test]
    fn test_invalid_component_value() {
        assert_eq!(
            plan(json!({"year": 1})),
            Err(FormatError::InvalidOption {
                option: "year".to_string(),
                value: "1".to_string()
            })
        );
    }

    #[test]
    fn test_hour_cycle() {
        let p = plan(json!({"hour": "numeric", "hour12": false, "hourCycle": "h12"})).unwrap();
        assert_eq!(p.hour_cycle, Some(HourCycle::H23));

        let p = plan(json!({"hour": "numeric", "hourCycle": "h11"})).unwrap();
        assert_eq!(p.hour_cycle, Some(HourCycle::H11));

        assert!(plan(json!({"hour12": "yes"})).is_err());
    }

    #[test]
    fn test_time_zone() {
        let p = plan(json!({"timeZone": "utc"})).unwrap();
        assert_eq!(p.time_zone, Some(Tz::UTC));

        let p = plan(json!({"timeZone": "Asia/Tokyo"})).unwrap();
        assert_eq!(p.time_zone, Some(chrono_tz::Asia::Tokyo));

        assert_eq!(
            plan(json!({"timeZone": "Mars/Olympus"})),
            Err(FormatError::InvalidTimeZone("Mars/Olympus".to_string()))
        );
    }
}
