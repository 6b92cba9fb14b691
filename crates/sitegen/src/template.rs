// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Tera setup shared by config expansion and page rendering.
//!
//! Every Tera instance Estuary creates gets the same built-ins:
//! - `env(name="VAR", default="...")` reads an environment variable
//! - `date` formats dates (see the `datefmt` crate), replacing Tera's own

use crate::error::{Result, SiteError};
use datefmt::{DateFormatter, DateSettings};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// The `date` filter.
///
/// Tera passes filter arguments by name:
///
/// ```text
/// {{ page.date | date }}
/// {{ page.date | date(locale="en-GB", style="long") }}
/// {{ page.date | date(format="yyyy-LL-dd") }}
/// {{ page.date | date(locale="fr-FR", options=site.date_options) }}
/// ```
///
/// `format` is accepted for `locale` and `options` for `style`. The filter
/// never fails; see [`DateFormatter`] for what bad input renders as.
#[derive(Debug, Clone)]
pub struct DateFilter {
    formatter: DateFormatter,
}

impl DateFilter {
    #[must_use]
    pub fn new(settings: DateSettings) -> Self {
        Self {
            formatter: DateFormatter::new(settings),
        }
    }
}

impl tera::Filter for DateFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let locale = args.get("locale").or_else(|| args.get("format"));
        let style = args.get("style").or_else(|| args.get("options"));
        Ok(Value::String(self.formatter.format_value(value, locale, style)))
    }

    // Output is generated text, never an echo of the input
    fn is_safe(&self) -> bool {
        true
    }
}

/// A Tera instance with Estuary's functions and filters registered.
///
/// Markdown pages become HTML, so `.md` templates autoescape like `.html`.
#[must_use]
pub fn new_tera(settings: DateSettings) -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html", ".htm", ".xml", ".md"]);
    tera.register_function("env", env_function());
    tera.register_filter("date", DateFilter::new(settings));
    tera
}

/// Expand a YAML configuration file using Tera templates.
///
/// ```text
/// # Input:
/// dir:
///   output: "{{ out | default(value='_site') }}"
/// dates:
///   time_zone: "{{ env(name='SITE_TZ', default='UTC') }}"
///
/// # With -v out=public and SITE_TZ unset:
/// dir:
///   output: "public"
/// dates:
///   time_zone: "UTC"
/// ```
pub fn expand_yaml_template(yaml_content: &str, variables: &HashMap<String, String>) -> Result<String> {
    // Config is expanded before date settings are known
    let mut tera = new_tera(DateSettings::default());

    let mut context = Context::new();
    for (key, value) in variables {
        context.insert(key, value);
    }

    tera.render_str(yaml_content, &context).map_err(|e| {
        let mut message = describe_tera_error(&e);
        if variables.is_empty() {
            message.push_str("\nNo template variables provided (use -v key=value to provide)");
        } else {
            let mut keys: Vec<&String> = variables.keys().collect();
            keys.sort();
            message.push_str(&format!("\nAvailable variables: {:?}", keys));
        }
        SiteError::Template {
            name: "config".to_string(),
            message,
        }
    })
}

/// Flatten a Tera error and its sources into one message.
///
/// Tera's top-level message is usually just "Failed to render 'x'"; the
/// useful part is further down the chain.
#[must_use]
pub fn describe_tera_error(err: &tera::Error) -> String {
    let chain = collect_error_chain(err);
    match chain.as_slice() {
        [single] => single.clone(),
        [first, rest @ ..] => {
            let mut parts = vec![first.clone()];
            parts.extend(rest.iter().map(|msg| format!("  ├─ {}", msg)));
            parts.join("\n")
        }
        [] => String::new(),
    }
}

fn collect_error_chain(err: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();

    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }

    chain
}

/// Built-in function to read environment variables
///
/// Usage in templates:
/// - `{{ env(name="VAR_NAME") }}` - Read environment variable, error if not set
/// - `{{ env(name="VAR_NAME", default="fallback") }}` - Read with default fallback
fn env_function() -> impl tera::Function {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let var_name = args
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tera::Error::msg("env function requires 'name' parameter"))?;

        let default_value = args.get("default").and_then(|v| v.as_str());

        match std::env::var(var_name) {
            Ok(value) => Ok(Value::String(value)),
            Err(std::env::VarError::NotPresent) => default_value
                .map(|default| Value::String(default.to_string()))
                .ok_or_else(|| {
                    tera::Error::msg(format!(
                        "Environment variable '{}' not set and no default provided",
                        var_name
                    ))
                }),
            Err(e) => Err(tera::Error::msg(format!(
                "Failed to read environment variable '{}': {}",
                var_name, e
            ))),
        }
    }
}
