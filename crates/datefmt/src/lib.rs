// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! # datefmt: locale-aware date formatting for templates
//!
//! Implements the `date` template filter:
//!
//! ```text
//! format(value, localeOrFormat = "auto", styleOrOptions = "medium") -> string
//! ```
//!
//! 1. `value` is normalized to a [`Moment`]; null, `""` and `"now"` mean the
//!    current instant. Unreadable values render as `""`.
//! 2. `localeOrFormat` equal to `yyyy-LL-dd`, `yyyy-LL` or `LL/dd/yyyy`
//!    renders that numeric pattern and ignores the third argument.
//! 3. Any other non-empty value except `auto` is a locale tag; otherwise the
//!    host default locale from [`DateSettings`] is used.
//! 4. `styleOrOptions` is a date-style keyword or an options structure.
//! 5. The result comes from ICU4X. If the locale or options are rejected, the
//!    instant renders as ISO-8601 UTC instead.
//!
//! ```no_run
//! use datefmt::{DateFormatter, DateSettings};
//! use serde_json::json;
//!
//! let formatter = DateFormatter::new(DateSettings::default());
//! let text = formatter.format_value(&json!("2024-03-07"), Some(&json!("en-GB")), Some(&json!("long")));
//! assert_eq!(text, "7 March 2024");
//! ```

mod directive;
mod error;
mod formatter;
mod input;
mod options;
mod settings;

pub use directive::{AUTO_LOCALE, DateStyle, FormatDirective, LegacyToken, StyleDirective};
pub use error::{DateInputError, FormatError, Result};
pub use formatter::{DateFormatter, iso_fallback};
pub use input::{DateInput, Moment};
pub use settings::{DateSettings, host_locale, host_time_zone, locale_from_posix, parse_locale, parse_time_zone};

// Re-exported so callers can build settings without depending on the backends
pub use chrono_tz::Tz;
pub use icu::locale::Locale;
