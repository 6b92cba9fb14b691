// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Source pages: front matter, output paths, and URLs.

use crate::config::TemplateFormat;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// A template file found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,
    /// Path relative to the input directory
    pub input_path: PathBuf,
    pub format: TemplateFormat,
}

impl PageSource {
    /// Name the page body is registered under in Tera. The prefix keeps pages
    /// apart from includes; the extension keeps Tera's autoescape rules.
    #[must_use]
    pub fn template_name(&self) -> String {
        format!("@page/{}", url_path(&self.input_path))
    }
}

/// Where a page is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permalink {
    /// Derived from the input path
    Default,
    /// Template string from front matter, rendered with the page context
    Template(String),
    /// `permalink: false`
    Disabled,
}

/// Parsed front matter. Keys are merged into the page context as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    data: Map<String, Value>,
}

impl FrontMatter {
    /// Parse the YAML between the `---` fences. Empty means no keys.
    pub fn parse(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_yaml_ng::from_str::<Value>(yaml).map_err(|e| e.to_string())? {
            Value::Object(data) => Ok(Self { data }),
            Value::Null => Ok(Self::default()),
            other => Err(format!("expected a mapping, found {}", value_kind(&other))),
        }
    }

    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    #[must_use]
    pub fn layout(&self) -> Option<&str> {
        self.data
            .get("layout")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
    }

    #[must_use]
    pub fn permalink(&self) -> Permalink {
        match self.data.get("permalink") {
            Some(Value::Bool(false)) => Permalink::Disabled,
            Some(Value::String(s)) if !s.trim().is_empty() => Permalink::Template(s.clone()),
            _ => Permalink::Default,
        }
    }

    #[must_use]
    pub fn date(&self) -> Option<&Value> {
        self.data.get("date").filter(|d| !d.is_null())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Split a leading `---` YAML block from the body.
#[must_use]
pub fn split_frontmatter(content: &str) -> (&str, &str) {
    let trimmed = content.trim_start_matches('\u{feff}');
    let Some(after) = trimmed.strip_prefix("---") else {
        return ("", content);
    };
    // The opening fence must be alone on its line
    let Some(after) = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
    else {
        return ("", content);
    };
    if let Some(body) = after.strip_prefix("---") {
        return ("", strip_line_end(body));
    }
    match after.find("\n---") {
        Some(end) => {
            let yaml = &after[..end];
            let rest = &after[end + 4..];
            // Drop the remainder of the closing fence line
            let body = match rest.find('\n') {
                Some(nl) if rest[..nl].trim().is_empty() => &rest[nl + 1..],
                None if rest.trim().is_empty() => "",
                _ => rest,
            };
            (yaml, body)
        }
        None => ("", content),
    }
}

fn strip_line_end(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// `index.md` → `index.html`; `about.md` → `about/index.html`.
#[must_use]
pub fn default_output_path(input_path: &Path) -> PathBuf {
    let parent = input_path.parent().unwrap_or_else(|| Path::new(""));
    match input_path.file_stem().and_then(|s| s.to_str()) {
        Some("index") | None => parent.join("index.html"),
        Some(stem) => parent.join(stem).join("index.html"),
    }
}

/// Output path for a rendered permalink string. A trailing slash means a
/// directory with an `index.html`.
#[must_use]
pub fn permalink_output_path(rendered: &str) -> PathBuf {
    let trimmed = rendered.trim();
    let mut path: PathBuf = trimmed
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    if trimmed.ends_with('/') || path.as_os_str().is_empty() {
        path.push("index.html");
    }
    path
}

/// Public URL of an output path.
#[must_use]
pub fn url_for(output_path: &Path) -> String {
    let joined = url_path(output_path);
    match joined.strip_suffix("index.html") {
        Some(dir) => format!("/{}", dir),
        None => format!("/{}", joined),
    }
}

/// Slug of a page: the file stem, or the parent directory name for `index` files.
#[must_use]
pub fn file_slug(input_path: &Path) -> String {
    match input_path.file_stem().and_then(|s| s.to_str()) {
        Some("index") => input_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string(),
        Some(stem) => stem.to_string(),
        None => String::new(),
    }
}

/// Path joined with `/` regardless of platform.
fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
