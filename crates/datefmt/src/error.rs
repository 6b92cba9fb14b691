// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// A value that cannot be interpreted as a date/time.
///
/// The formatter absorbs this and renders the empty string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateInputError {
    /// Text that matches none of the accepted date layouts
    #[error("Cannot interpret '{0}' as a date")]
    Unparseable(String),

    /// Millisecond timestamp outside the representable range
    #[error("Timestamp out of range: {0}")]
    OutOfRange(String),

    /// Booleans, arrays and objects
    #[error("Unsupported value type for a date")]
    UnsupportedType,
}

/// A locale/options combination the locale-aware formatter rejects.
///
/// The formatter absorbs this and renders the ISO-8601 fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Locale identifier that does not parse as a BCP-47 tag
    #[error("Invalid locale identifier: {0}")]
    InvalidLocale(String),

    /// dateStyle/timeStyle value outside short|medium|long|full
    #[error("Invalid style '{value}' for {option}")]
    InvalidStyle { option: String, value: String },

    /// Option present with a value it does not accept
    #[error("Invalid value for option '{option}': {value}")]
    InvalidOption { option: String, value: String },

    /// Component option mixed with dateStyle/timeStyle
    #[error("Option '{0}' cannot be combined with dateStyle or timeStyle")]
    StyleConflict(String),

    /// Date components that do not form a displayable field set
    #[error("Unsupported combination of date fields: {0}")]
    UnsupportedFields(String),

    /// timeZone option that is not an IANA zone name
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    /// Wall-clock value the calendar backend refused
    #[error("Date out of calendar range: {0}")]
    CalendarRange(String),

    /// Field set or locale data could not be loaded
    #[error("Formatter unavailable: {0}")]
    Formatter(String),
}

/// Result type for locale-aware formatting
pub type Result<T> = std::result::Result<T, FormatError>;
