// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The second and third arguments of the date filter.
//!
//! Both arguments are overloaded in templates: the second is a legacy token,
//! a locale tag, or `auto`; the third is a style keyword or a whole options
//! structure. They are classified once into [`FormatDirective`] and
//! [`StyleDirective`] and matched on from there.

use crate::error::FormatError;
use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Locale sentinel meaning "use the host default locale".
pub const AUTO_LOCALE: &str = "auto";

/// Token-based patterns kept for templates written against the old filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyToken {
    /// `yyyy-LL-dd` → `2024-03-07`
    YearMonthDay,
    /// `yyyy-LL` → `2024-03`
    YearMonth,
    /// `LL/dd/yyyy` → `03/07/2024`
    MonthDayYear,
}

impl LegacyToken {
    pub const ALL: [LegacyToken; 3] = [
        LegacyToken::YearMonthDay,
        LegacyToken::YearMonth,
        LegacyToken::MonthDayYear,
    ];

    #[must_use]
    pub fn pattern(self) -> &'static str {
        match self {
            LegacyToken::YearMonthDay => "yyyy-LL-dd",
            LegacyToken::YearMonth => "yyyy-LL",
            LegacyToken::MonthDayYear => "LL/dd/yyyy",
        }
    }

    /// Exact, case-sensitive match against the three patterns.
    #[must_use]
    pub fn from_pattern(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|token| token.pattern() == s)
    }

    /// Substitute the date into the pattern. Month and day are padded to
    /// two digits; the year is printed as a plain integer.
    #[must_use]
    pub fn render(self, date: NaiveDate) -> String {
        let (year, month, day) = (date.year(), date.month(), date.day());
        match self {
            LegacyToken::YearMonthDay => format!("{year}-{month:02}-{day:02}"),
            LegacyToken::YearMonth => format!("{year}-{month:02}"),
            LegacyToken::MonthDayYear => format!("{month:02}/{day:02}/{year}"),
        }
    }
}

impl fmt::Display for LegacyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// Second filter argument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormatDirective {
    Legacy(LegacyToken),
    Locale(String),
    #[default]
    Auto,
}

impl FormatDirective {
    /// Classify a raw argument. Legacy tokens win over locale interpretation.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") | Some(AUTO_LOCALE) => FormatDirective::Auto,
            Some(s) => LegacyToken::from_pattern(s)
                .map_or_else(|| FormatDirective::Locale(s.to_string()), FormatDirective::Legacy),
        }
    }

    /// Non-string values select the host default locale.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        Self::parse(value.and_then(Value::as_str))
    }
}

impl From<&str> for FormatDirective {
    fn from(s: &str) -> Self {
        Self::parse(Some(s))
    }
}

/// Named verbosity level for dates and times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Full,
    Long,
    Medium,
    Short,
}

impl DateStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DateStyle::Full => "full",
            DateStyle::Long => "long",
            DateStyle::Medium => "medium",
            DateStyle::Short => "short",
        }
    }
}

impl FromStr for DateStyle {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(DateStyle::Full),
            "long" => Ok(DateStyle::Long),
            "medium" => Ok(DateStyle::Medium),
            "short" => Ok(DateStyle::Short),
            other => Err(FormatError::InvalidStyle {
                option: "dateStyle".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Third filter argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StyleDirective {
    /// A date-style keyword, validated only when formatting
    Keyword(String),
    /// Formatting options passed through verbatim
    Options(Map<String, Value>),
    #[default]
    Default,
}

impl StyleDirective {
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => StyleDirective::Keyword(s.clone()),
            Some(Value::Object(map)) => StyleDirective::Options(map.clone()),
            // Arrays are structured values with no recognized keys
            Some(Value::Array(_)) => StyleDirective::Options(Map::new()),
            _ => StyleDirective::Default,
        }
    }

    /// The options structure this directive stands for.
    #[must_use]
    pub fn to_options(&self) -> Map<String, Value> {
        match self {
            StyleDirective::Keyword(style) => date_style_options(style),
            StyleDirective::Options(map) => map.clone(),
            StyleDirective::Default => date_style_options(DateStyle::Medium.as_str()),
        }
    }
}

impl From<DateStyle> for StyleDirective {
    fn from(style: DateStyle) -> Self {
        StyleDirective::Keyword(style.as_str().to_string())
    }
}

fn date_style_options(style: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("dateStyle".to_string(), Value::String(style.to_string()));
    map
}
