// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// Site build error types
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// estuary.yaml could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// dates.locale or dates.time_zone rejected
    #[error("Invalid date settings: {0}")]
    Dates(#[from] datefmt::FormatError),

    /// Tera parse or render failure, with the flattened error chain
    #[error("Template error in '{name}': {message}")]
    Template { name: String, message: String },

    /// Front matter that is not a YAML mapping
    #[error("Bad front matter in '{path}': {message}")]
    FrontMatter { path: String, message: String },

    /// Global data file that is not valid JSON/YAML
    #[error("Bad data file '{path}': {message}")]
    Data { path: String, message: String },

    /// Two pages resolving to the same output file
    #[error("Output '{output}' written by both '{first}' and '{second}'")]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },

    /// IO error with the path involved
    #[error("{operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SiteError {
    pub fn io<P: AsRef<std::path::Path>>(
        operation: &'static str,
        path: P,
        source: std::io::Error,
    ) -> Self {
        SiteError::Io {
            operation,
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type for site operations
pub type Result<T> = std::result::Result<T, SiteError>;
