// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Date command - runs the `date` filter outside a template
//!
//! Example:
//!   estuary date 2024-03-07 --locale en-GB --style long
//!   estuary date 1709769600000 --options '{"dateStyle":"full","timeStyle":"short"}'
//!   estuary date --locale yyyy-LL-dd
//!
//! Defaults for locale and time zone come from `estuary.yaml` when present.

use crate::common::ProjectContext;
use anyhow::{Context, Result};
use datefmt::DateFormatter;
use serde_json::Value;
use std::io::Write;

/// Arguments of one `estuary date` invocation.
#[derive(Debug, Clone, Default)]
pub struct DateRequest {
    /// Omitted means now
    pub value: Option<String>,
    /// Locale tag, `auto`, or a legacy pattern
    pub locale: Option<String>,
    /// Style keyword
    pub style: Option<String>,
    /// Options object as JSON
    pub options: Option<String>,
    /// Overrides the configured time zone
    pub time_zone: Option<String>,
}

impl DateRequest {
    /// Integers are epoch milliseconds; everything else is date text.
    fn input_value(&self) -> Value {
        match self.value.as_deref() {
            None => Value::Null,
            Some(raw) => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
        }
    }

    fn style_value(&self) -> Result<Option<Value>> {
        if let Some(json) = &self.options {
            let options: Value =
                serde_json::from_str(json).with_context(|| format!("Invalid --options JSON: {}", json))?;
            return Ok(Some(options));
        }
        Ok(self.style.clone().map(Value::String))
    }
}

pub fn date_command(project: &ProjectContext, request: &DateRequest, out: &mut dyn Write) -> Result<()> {
    let config = project.load_config()?;
    let mut settings = config.date_settings().context("Invalid date settings")?;
    if let Some(zone) = request.time_zone.as_deref() {
        settings = settings.with_time_zone_name(zone)?;
    }

    let value = request.input_value();
    let locale = request.locale.clone().map(Value::String);
    let style = request.style_value()?;

    let formatted = DateFormatter::new(settings).format_value(&value, locale.as_ref(), style.as_ref());
    writeln!(out, "{}", formatted)?;
    Ok(())
}
