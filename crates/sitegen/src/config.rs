// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Site configuration, parsed from `estuary.yaml` at the project root.

use crate::error::{Result, SiteError};
use crate::template::expand_yaml_template;
use datefmt::DateSettings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "estuary.yaml";

/// Top-level site configuration. Every field has a default, so an empty
/// file (or none at all) describes the standard layout.
///
/// ```yaml
/// template_formats: [md, html]
/// markdown_template_engine: tera
/// html_template_engine: tera
/// data_template_engine: tera
///
/// dir:
///   input: "src"
///   includes: "_includes"
///   data: "_data"
///   output: "_site"
///
/// passthrough_copy:
///   "src/assets": "assets"
///
/// dates:
///   locale: "en-GB"
///   time_zone: "Europe/London"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub template_formats: Vec<TemplateFormat>,
    pub markdown_template_engine: TemplateEngine,
    pub html_template_engine: TemplateEngine,
    pub data_template_engine: TemplateEngine,
    pub dir: DirConfig,
    /// Source path (relative to the project root) → destination (relative to output)
    pub passthrough_copy: BTreeMap<String, String>,
    pub dates: DateConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            template_formats: vec![TemplateFormat::Md, TemplateFormat::Html],
            markdown_template_engine: TemplateEngine::Tera,
            html_template_engine: TemplateEngine::Tera,
            data_template_engine: TemplateEngine::Tera,
            dir: DirConfig::default(),
            passthrough_copy: BTreeMap::from([("src/assets".to_string(), "assets".to_string())]),
            dates: DateConfig::default(),
        }
    }
}

/// Source template formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    Md,
    Html,
}

impl TemplateFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            TemplateFormat::Md => "md",
            TemplateFormat::Html => "html",
        }
    }

    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" => Some(TemplateFormat::Md),
            "html" => Some(TemplateFormat::Html),
            _ => None,
        }
    }
}

/// Template engine applied to a format before its own processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateEngine {
    /// Jinja2/Nunjucks-style templates
    #[serde(rename = "tera", alias = "njk")]
    Tera,
    /// Body used verbatim
    #[serde(rename = "none")]
    Verbatim,
}

/// Directory layout. `includes` and `data` are relative to `input`;
/// `input` and `output` are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirConfig {
    pub input: String,
    pub includes: String,
    pub data: String,
    pub output: String,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            input: "src".to_string(),
            includes: "_includes".to_string(),
            data: "_data".to_string(),
            output: "_site".to_string(),
        }
    }
}

/// Defaults for the `date` filter. Unset values come from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub locale: Option<String>,
    pub time_zone: Option<String>,
}

impl SiteConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml).map_err(|e| SiteError::Config(e.to_string()))
    }

    /// Read, expand (`{{ env(...) }}` and `-v` variables), and parse a config file.
    pub fn load(path: &Path, variables: &HashMap<String, String>) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| SiteError::io("Cannot read", path, e))?;
        let expanded = expand_yaml_template(&raw, variables)?;
        let config = Self::from_yaml(&expanded)?;
        diagnostics::debug!("Loaded site config from {path}", path: path.display().to_string());
        Ok(config)
    }

    /// Like [`SiteConfig::load`], but a missing file means the defaults.
    pub fn load_or_default(path: &Path, variables: &HashMap<String, String>) -> Result<Self> {
        if path.exists() {
            Self::load(path, variables)
        } else {
            diagnostics::info!("No config at {path}, using defaults", path: path.display().to_string());
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn engine_for(&self, format: TemplateFormat) -> TemplateEngine {
        match format {
            TemplateFormat::Md => self.markdown_template_engine,
            TemplateFormat::Html => self.html_template_engine,
        }
    }

    #[must_use]
    pub fn handles(&self, format: TemplateFormat) -> bool {
        self.template_formats.contains(&format)
    }

    #[must_use]
    pub fn input_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.dir.input)
    }

    #[must_use]
    pub fn includes_dir(&self, root: &Path) -> PathBuf {
        self.input_dir(root).join(&self.dir.includes)
    }

    #[must_use]
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        self.input_dir(root).join(&self.dir.data)
    }

    #[must_use]
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.dir.output)
    }

    /// Date filter defaults: configured values over host values.
    pub fn date_settings(&self) -> Result<DateSettings> {
        let mut settings = DateSettings::from_host();
        if let Some(locale) = self.dates.locale.as_deref().filter(|l| !l.is_empty()) {
            settings = settings.with_locale_tag(locale)?;
        }
        if let Some(zone) = self.dates.time_zone.as_deref().filter(|z| !z.is_empty()) {
            settings = settings.with_time_zone_name(zone)?;
        }
        Ok(settings)
    }
}
