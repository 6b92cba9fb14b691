// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Host defaults: the locale used for `auto` and the zone dates render in.

use crate::error::FormatError;
use chrono_tz::Tz;
use icu::locale::{Locale, locale};

/// Environment variables consulted for the host locale, in priority order.
const LOCALE_ENV_VARS: &[&str] = &["LC_ALL", "LC_TIME", "LANG"];

#[derive(Debug, Clone, PartialEq)]
pub struct DateSettings {
    locale: Locale,
    time_zone: Tz,
}

impl DateSettings {
    #[must_use]
    pub fn new(locale: Locale, time_zone: Tz) -> Self {
        Self { locale, time_zone }
    }

    /// Locale and zone read from the process environment.
    #[must_use]
    pub fn from_host() -> Self {
        Self::new(host_locale(), host_time_zone())
    }

    /// Override the default locale with a BCP-47 tag.
    pub fn with_locale_tag(mut self, tag: &str) -> Result<Self, FormatError> {
        self.locale = parse_locale(tag)?;
        Ok(self)
    }

    /// Override the render zone with an IANA name or `UTC`.
    pub fn with_time_zone_name(mut self, name: &str) -> Result<Self, FormatError> {
        self.time_zone = parse_time_zone(name)?;
        Ok(self)
    }

    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    #[must_use]
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }
}

impl Default for DateSettings {
    fn default() -> Self {
        Self::new(locale!("en-US"), Tz::UTC)
    }
}

pub fn parse_locale(tag: &str) -> Result<Locale, FormatError> {
    tag.parse::<Locale>()
        .map_err(|_| FormatError::InvalidLocale(tag.to_string()))
}

pub fn parse_time_zone(name: &str) -> Result<Tz, FormatError> {
    if name.eq_ignore_ascii_case("utc") {
        return Ok(Tz::UTC);
    }
    name.parse::<Tz>()
        .map_err(|_| FormatError::InvalidTimeZone(name.to_string()))
}

/// The first usable locale from LC_ALL, LC_TIME, LANG; `en-US` otherwise.
#[must_use]
pub fn host_locale() -> Locale {
    LOCALE_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| locale_from_posix(&value))
        .unwrap_or(locale!("en-US"))
}

/// The zone reported by the operating system; UTC when unknown.
#[must_use]
pub fn host_time_zone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

/// `en_GB.UTF-8@euro` → `en-GB`. `C` and `POSIX` carry no locale.
#[must_use]
pub fn locale_from_posix(value: &str) -> Option<Locale> {
    let base = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    base.replace('_', "-").parse::<Locale>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_posix() {
        assert_eq!(locale_from_posix("en_GB.UTF-8"), Some(locale!("en-GB")));
        assert_eq!(locale_from_posix("de_DE@euro"), Some(locale!("de-DE")));
        assert_eq!(locale_from_posix("fr"), Some(locale!("fr")));
        assert_eq!(locale_from_posix("C"), None);
        assert_eq!(locale_from_posix("POSIX"), None);
        assert_eq!(locale_from_posix("C.UTF-8"), None);
        assert_eq!(locale_from_posix(""), None);
    }

    #[test]
    fn test_overrides() {
        let settings = DateSettings::default()
            .with_locale_tag("en-GB")
            .unwrap()
            .with_time_zone_name("Europe/London")
            .unwrap();
        assert_eq!(settings.locale(), &locale!("en-GB"));
        assert_eq!(settings.time_zone(), chrono_tz::Europe::London);

        assert!(DateSettings::default().with_locale_tag("not a locale!").is_err());
        assert!(DateSettings::default().with_time_zone_name("Nowhere/Special").is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = DateSettings::default();
        assert_eq!(settings.locale(), &locale!("en-US"));
        assert_eq!(settings.time_zone(), Tz::UTC);
    }
}
