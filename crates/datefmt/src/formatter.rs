// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The date formatter: normalize, try the locale-aware path, recover.

use crate::directive::{FormatDirective, StyleDirective};
use crate::error::{FormatError, Result};
use crate::input::{DateInput, Moment};
use crate::options::{DateFieldSet, FieldPlan, Length, TimePrecision, YearStyle};
use crate::settings::{DateSettings, parse_locale};
use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Timelike, Utc};
use icu::calendar::Iso;
use icu::datetime::DateTimeFormatter;
use icu::datetime::fieldsets::builder::{DateFields, FieldSetBuilder};
use icu::datetime::fieldsets::enums::CompositeDateTimeFieldSet;
use icu::datetime::input::{Date, DateTime as IcuDateTime, Time};
use icu::datetime::options::{
    Length as IcuLength, TimePrecision as IcuTimePrecision, YearStyle as IcuYearStyle,
};
use icu::locale::Locale;
use icu::locale::extensions::unicode::{Key, Value as KeywordValue};
use serde_json::Value;

/// Formats template values as locale-aware date strings.
///
/// Never fails: unreadable dates render as `""` and rejected locale/options
/// combinations render as [`iso_fallback`].
#[derive(Debug, Clone, Default)]
pub struct DateFormatter {
    settings: DateSettings,
}

impl DateFormatter {
    #[must_use]
    pub fn new(settings: DateSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &DateSettings {
        &self.settings
    }

    /// Format with raw template arguments.
    #[must_use]
    pub fn format_value(
        &self,
        value: &Value,
        locale_or_format: Option<&Value>,
        style_or_options: Option<&Value>,
    ) -> String {
        self.format(
            &DateInput::from_value(value),
            &FormatDirective::from_value(locale_or_format),
            &StyleDirective::from_value(style_or_options),
        )
    }

    /// Format using the current instant for `now`.
    #[must_use]
    pub fn format(
        &self,
        input: &DateInput,
        directive: &FormatDirective,
        style: &StyleDirective,
    ) -> String {
        self.format_at(input, directive, style, Utc::now())
    }

    /// Format with an explicit current instant.
    #[must_use]
    pub fn format_at(
        &self,
        input: &DateInput,
        directive: &FormatDirective,
        style: &StyleDirective,
        now: DateTime<Utc>,
    ) -> String {
        let moment = match input.resolve(self.settings.time_zone(), now) {
            Ok(moment) => moment,
            Err(err) => {
                diagnostics::debug!(
                    "date filter: invalid input, rendering empty: {reason}",
                    reason: err.to_string()
                );
                return String::new();
            }
        };

        match self.try_format(&moment, directive, style) {
            Ok(text) => text,
            Err(err) => {
                diagnostics::debug!(
                    "date filter: falling back to ISO-8601: {reason}",
                    reason: err.to_string()
                );
                iso_fallback(&moment)
            }
        }
    }

    /// The primary formatting path, without recovery.
    pub fn try_format(
        &self,
        moment: &Moment,
        directive: &FormatDirective,
        style: &StyleDirective,
    ) -> Result<String> {
        let locale = match directive {
            // Style is ignored for legacy tokens
            FormatDirective::Legacy(token) => return Ok(token.render(moment.date())),
            FormatDirective::Locale(tag) => parse_locale(tag)?,
            FormatDirective::Auto => self.settings.locale().clone(),
        };

        let plan = FieldPlan::from_options(&style.to_options())?;
        let locale = with_hour_cycle(locale, &plan)?;
        let wall = match plan.time_zone {
            Some(zone) => moment.wall_clock_in(zone),
            None => moment.wall_clock(),
        };

        let formatter = DateTimeFormatter::try_new((&locale).into(), field_set(&plan)?)
            .map_err(|e| FormatError::Formatter(format!("{e:?}")))?;
        let datetime = icu_datetime(wall)?;
        Ok(formatter.format(&datetime).to_string())
    }
}

/// Extended ISO-8601 UTC rendering with milliseconds, e.g. `2024-03-07T00:00:00.000Z`.
#[must_use]
pub fn iso_fallback(moment: &Moment) -> String {
    moment.instant().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn with_hour_cycle(mut locale: Locale, plan: &FieldPlan) -> Result<Locale> {
    let Some(cycle) = plan.hour_cycle else {
        return Ok(locale);
    };
    let key = "hc"
        .parse::<Key>()
        .map_err(|e| FormatError::Formatter(format!("{e:?}")))?;
    let value = cycle
        .keyword()
        .parse::<KeywordValue>()
        .map_err(|e| FormatError::Formatter(format!("{e:?}")))?;
    locale.extensions.unicode.keywords.set(key, value);
    Ok(locale)
}

fn field_set(plan: &FieldPlan) -> Result<CompositeDateTimeFieldSet> {
    let mut builder = FieldSetBuilder::default();
    builder.length = Some(match plan.length {
        Length::Short => IcuLength::Short,
        Length::Medium => IcuLength::Medium,
        Length::Long => IcuLength::Long,
    });
    builder.date_fields = plan.date_fields.map(|fields| match fields {
        DateFieldSet::D => DateFields::D,
        DateFieldSet::MD => DateFields::MD,
        DateFieldSet::YMD => DateFields::YMD,
        DateFieldSet::DE => DateFields::DE,
        DateFieldSet::MDE => DateFields::MDE,
        DateFieldSet::YMDE => DateFields::YMDE,
        DateFieldSet::E => DateFields::E,
        DateFieldSet::M => DateFields::M,
        DateFieldSet::YM => DateFields::YM,
        DateFieldSet::Y => DateFields::Y,
    });
    builder.year_style = plan.year_style.map(|style| match style {
        YearStyle::Auto => IcuYearStyle::Auto,
        YearStyle::Full => IcuYearStyle::Full,
    });
    builder.time_precision = plan.time_precision.map(|precision| match precision {
        TimePrecision::Hour => IcuTimePrecision::Hour,
        TimePrecision::Minute => IcuTimePrecision::Minute,
        TimePrecision::Second => IcuTimePrecision::Second,
    });
    builder
        .build_composite_datetime()
        .map_err(|e| FormatError::UnsupportedFields(format!("{e:?}")))
}

fn icu_datetime(wall: NaiveDateTime) -> Result<IcuDateTime<Iso>> {
    let range = |e: &dyn std::fmt::Debug| FormatError::CalendarRange(format!("{wall}: {e:?}"));
    let date = Date::try_new_iso(wall.year(), wall.month() as u8, wall.day() as u8)
        .map_err(|e| range(&e))?;
    // chrono reports leap seconds as nanosecond >= 1e9
    let subsecond = wall.nanosecond().min(999_999_999);
    let time = Time::try_new(
        wall.hour() as u8,
        wall.minute() as u8,
        wall.second() as u8,
        subsecond,
    )
    .map_err(|e| range(&e))?;
    Ok(IcuDateTime { date, time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{DateStyle, LegacyToken};
    use chrono::TimeZone;
    use serde_json::json;

    fn formatter() -> DateFormatter {
        DateFormatter::new(DateSettings::default())
    }

    fn march_7() -> DateInput {
        DateInput::from("2024-03-07")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_legacy_ignores_style() {
        let f = formatter();
        for style in [
            StyleDirective::Default,
            StyleDirective::from(DateStyle::Full),
            StyleDirective::Keyword("nonsense".to_string()),
            StyleDirective::from_value(Some(&json!({"timeZone": "Mars/Base"}))),
        ] {
            assert_eq!(
                f.format(&march_7(), &FormatDirective::Legacy(LegacyToken::YearMonthDay), &style),
                "2024-03-07"
            );
        }
    }

    #[test]
    fn test_invalid_input_is_empty() {
        let f = formatter();
        assert_eq!(f.format_value(&json!("garbage"), None, None), "");
        assert_eq!(f.format_value(&json!("not-a-date"), Some(&json!("yyyy-LL-dd")), None), "");
        assert_eq!(f.format_value(&json!(false), None, None), "");
    }

    #[test]
    fn test_fallback_on_bad_style() {
        let f = formatter();
        let out = f.format(
            &march_7(),
            &FormatDirective::Auto,
            &StyleDirective::Keyword("enormous".to_string()),
        );
        assert_eq!(out, "2024-03-07T00:00:00.000Z");
    }

    #[test]
    fn test_fallback_on_bad_locale() {
        let f = formatter();
        let out = f.format(
            &march_7(),
            &FormatDirective::Locale("this is not a locale".to_string()),
            &StyleDirective::Default,
        );
        assert_eq!(out, "2024-03-07T00:00:00.000Z");
    }

    #[test]
    fn test_try_format_reports_error() {
        let f = formatter();
        let moment = march_7().resolve(chrono_tz::Tz::UTC, now()).unwrap();
        let err = f
            .try_format(
                &moment,
                &FormatDirective::Auto,
                &StyleDirective::from_value(Some(&json!({"dateStyle": "long", "day": "numeric"}))),
            )
            .unwrap_err();
        assert_eq!(err, FormatError::StyleConflict("day".to_string()));
    }

    #[test]
    fn test_recovery_paths_log_with_diagnostics_enabled() {
        // SAFETY: This is safe in tests as we control the execution environment
        unsafe {
            std::env::set_var("ESTUARY_LOG", "debug");
        }
        diagnostics::init();
        let f = formatter();
        assert_eq!(f.format_value(&json!("garbage"), None, None), "");
        assert_eq!(
            f.format_value(&json!("2024-03-07"), Some(&json!("en-US")), Some(&json!("vast"))),
            "2024-03-07T00:00:00.000Z"
        );
    }

    #[test]
    fn test_numeric_year_is_written_in_full() {
        let f = formatter();
        let date = json!("2024-03-07");
        let en_us = json!("en-US");
        let numeric = json!({"year": "numeric", "month": "numeric", "day": "numeric"});
        assert_eq!(f.format_value(&date, Some(&en_us), Some(&numeric)), "3/7/2024");
        assert_eq!(f.format_value(&date, Some(&en_us), Some(&json!({}))), "3/7/2024");

        let two_digit = json!({"year": "2-digit", "month": "numeric", "day": "numeric"});
        assert_eq!(f.format_value(&date, Some(&en_us), Some(&two_digit)), "3/7/24");
        assert_eq!(f.format_value(&date, Some(&en_us), Some(&json!("short"))), "3/7/24");
    }

    #[test]
    fn test_en_gb_long() {
        let out = formatter().format(
            &march_7(),
            &FormatDirective::from("en-GB"),
            &StyleDirective::from(DateStyle::Long),
        );
        assert_eq!(out, "7 March 2024");
    }

    #[test]
    fn test_default_is_medium() {
        let f = formatter();
        let implicit = f.format(&march_7(), &FormatDirective::Auto, &StyleDirective::Default);
        let explicit = f.format(
            &march_7(),
            &FormatDirective::Auto,
            &StyleDirective::from(DateStyle::Medium),
        );
        assert_eq!(implicit, explicit);
        assert_eq!(implicit, "Mar 7, 2024");
    }

    #[test]
    fn test_iso_fallback_is_utc() {
        let zone: chrono_tz::Tz = "Asia/Tokyo".parse().unwrap();
        let moment = DateInput::from("2024-03-07T09:00:00+09:00")
            .resolve(zone, now())
            .unwrap();
        assert_eq!(iso_fallback(&moment), "2024-03-07T00:00:00.000Z");
    }

    #[test]
    fn test_time_zone_option_shifts_wall_clock() {
        let f = formatter();
        let input = DateInput::from("2024-03-07T23:00:00Z");
        let tokyo = StyleDirective::from_value(Some(&json!({
            "dateStyle": "long",
            "timeZone": "Asia/Tokyo"
        })));
        let out = f.format(&input, &FormatDirective::from("en-GB"), &tokyo);
        assert_eq!(out, "8 March 2024");
    }
}
