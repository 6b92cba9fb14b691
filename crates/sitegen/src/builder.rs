// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Site build: passthrough copy, global data, includes, and page rendering.
//!
//! ```text
//! estuary.yaml
//! src/
//!   _includes/base.html     → layout / include "base.html"
//!   _data/site.yaml         → {{ site.title }}
//!   assets/logo.svg         → _site/assets/logo.svg (passthrough)
//!   index.md                → _site/index.html
//!   about.html              → _site/about/index.html
//!   feed.html (permalink)   → _site/feed.xml
//! ```

use crate::config::{SiteConfig, TemplateEngine, TemplateFormat};
use crate::error::{Result, SiteError};
use crate::markdown::render_markdown;
use crate::page::{
    FrontMatter, PageSource, Permalink, default_output_path, file_slug, permalink_output_path,
    split_frontmatter, url_for,
};
use crate::template::{describe_tera_error, new_tera};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use walkdir::WalkDir;

/// What a build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Output paths relative to the output directory, in build order
    pub pages_written: Vec<PathBuf>,
    /// Input paths of pages with `permalink: false`
    pub pages_skipped: Vec<PathBuf>,
    /// Files copied by passthrough rules
    pub files_copied: usize,
}

/// The `page` variable seen by templates.
#[derive(Debug, Clone, Serialize)]
struct PageData {
    url: String,
    input_path: String,
    output_path: String,
    file_slug: String,
    date: Value,
}

/// A page ready to be written.
struct RenderedPage {
    output_path: PathBuf,
    html: String,
}

/// Builds one project rooted at `root`.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    root: PathBuf,
    config: SiteConfig,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run the whole pipeline and write the site.
    pub fn build(&self) -> Result<BuildReport> {
        let settings = self.config.date_settings()?;
        let output_dir = self.config.output_dir(&self.root);
        let mut report = BuildReport {
            files_copied: self.copy_passthrough(&output_dir)?,
            ..BuildReport::default()
        };

        let mut tera = new_tera(settings);
        let data = self.load_global_data(&mut tera)?;
        self.register_includes(&mut tera)?;

        let pages = self.discover_pages()?;
        let mut claimed: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

        for page in &pages {
            let Some(rendered) = self.render_page(&mut tera, &data, page)? else {
                diagnostics::debug!(
                    "Skipping {input}: permalink is false",
                    input: page.input_path.display().to_string()
                );
                report.pages_skipped.push(page.input_path.clone());
                continue;
            };

            if let Some(first) = claimed.get(&rendered.output_path) {
                return Err(SiteError::DuplicateOutput {
                    output: rendered.output_path.display().to_string(),
                    first: first.display().to_string(),
                    second: page.input_path.display().to_string(),
                });
            }
            claimed.insert(rendered.output_path.clone(), page.input_path.clone());

            let target = output_dir.join(&rendered.output_path);
            write_file(&target, &rendered.html)?;
            diagnostics::debug!("Wrote {target}", target: target.display().to_string());
            report.pages_written.push(rendered.output_path);
        }

        diagnostics::info!(
            "Built {written} pages ({skipped} skipped, {copied} files copied) into {output}",
            written: report.pages_written.len(),
            skipped: report.pages_skipped.len(),
            copied: report.files_copied,
            output: output_dir.display().to_string()
        );
        Ok(report)
    }

    /// Copy each passthrough source into the output directory. A missing
    /// source is skipped with a warning.
    fn copy_passthrough(&self, output_dir: &Path) -> Result<usize> {
        let mut copied = 0;
        for (source, dest) in &self.config.passthrough_copy {
            let source_path = self.root.join(source);
            let dest_path = output_dir.join(dest);

            if !source_path.exists() {
                diagnostics::warn!(
                    "Passthrough source {path} does not exist, skipping",
                    path: source_path.display().to_string()
                );
                continue;
            }

            if source_path.is_file() {
                copy_file(&source_path, &dest_path)?;
                copied += 1;
                continue;
            }

            for entry in WalkDir::new(&source_path).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&source_path)
                    .unwrap_or_else(|_| entry.path());
                copy_file(entry.path(), &dest_path.join(relative))?;
                copied += 1;
            }
        }
        Ok(copied)
    }

    /// Load `*.json`, `*.yaml`, and `*.yml` files from the data directory,
    /// keyed by file stem.
    fn load_global_data(&self, tera: &mut Tera) -> Result<Map<String, Value>> {
        let data_dir = self.config.data_dir(&self.root);
        let mut data = Map::new();
        if !data_dir.is_dir() {
            return Ok(data);
        }

        for entry in WalkDir::new(&data_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let Some(kind) = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(DataKind::from_extension)
            else {
                continue;
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = read_file(path)?;
            let text = match self.config.data_template_engine {
                TemplateEngine::Tera => tera
                    .render_str(&raw, &Context::new())
                    .map_err(|e| data_error(path, describe_tera_error(&e)))?,
                TemplateEngine::Verbatim => raw,
            };
            let value = kind.parse(&text).map_err(|message| data_error(path, message))?;

            if data.insert(key.to_string(), value).is_some() {
                diagnostics::warn!(
                    "Global data key {key} defined more than once, last file wins",
                    key: key.to_string()
                );
            }
        }
        Ok(data)
    }

    /// Register every file under the includes directory by its relative path.
    fn register_includes(&self, tera: &mut Tera) -> Result<()> {
        let includes_dir = self.config.includes_dir(&self.root);
        if !includes_dir.is_dir() {
            return Ok(());
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(&includes_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&includes_dir)
                .unwrap_or_else(|_| entry.path());
            templates.push((slash_path(relative), read_file(entry.path())?));
        }

        let count = templates.len();
        tera.add_raw_templates(templates)
            .map_err(|e| SiteError::Template {
                name: includes_dir.display().to_string(),
                message: describe_tera_error(&e),
            })?;
        diagnostics::debug!("Registered {count} includes", count: count);
        Ok(())
    }

    /// Template files under the input directory, in path order.
    pub fn discover_pages(&self) -> Result<Vec<PageSource>> {
        let input_dir = self.config.input_dir(&self.root);
        if !input_dir.is_dir() {
            return Err(SiteError::Config(format!(
                "input directory '{}' does not exist",
                input_dir.display()
            )));
        }

        let excluded: Vec<PathBuf> = [
            self.config.includes_dir(&self.root),
            self.config.data_dir(&self.root),
            self.config.output_dir(&self.root),
        ]
        .into_iter()
        .chain(self.config.passthrough_copy.keys().map(|s| self.root.join(s)))
        .collect();

        let walker = WalkDir::new(&input_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let hidden = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('_') || name.starts_with('.'));
                !hidden && !excluded.iter().any(|ex| ex == entry.path())
            });

        let mut pages = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(format) = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .and_then(TemplateFormat::from_extension)
            else {
                continue;
            };
            if !self.config.handles(format) {
                continue;
            }
            let input_path = entry
                .path()
                .strip_prefix(&input_dir)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();
            pages.push(PageSource {
                path: entry.path().to_path_buf(),
                input_path,
                format,
            });
        }
        Ok(pages)
    }

    /// Render one page, or `None` when its permalink is `false`.
    fn render_page(
        &self,
        tera: &mut Tera,
        data: &Map<String, Value>,
        page: &PageSource,
    ) -> Result<Option<RenderedPage>> {
        let source = read_file(&page.path)?;
        let (yaml, body) = split_frontmatter(&source);
        let front_matter = FrontMatter::parse(yaml).map_err(|message| SiteError::FrontMatter {
            path: page.input_path.display().to_string(),
            message,
        })?;

        let permalink = front_matter.permalink();
        if permalink == Permalink::Disabled {
            return Ok(None);
        }

        let default_output = default_output_path(&page.input_path);
        let mut page_data = PageData {
            url: url_for(&default_output),
            input_path: slash_path(&page.input_path),
            output_path: slash_path(&default_output),
            file_slug: file_slug(&page.input_path),
            date: match front_matter.date() {
                Some(date) => date.clone(),
                None => Value::String(modified_time(&page.path)?),
            },
        };

        let mut context = Context::new();
        for (key, value) in data.iter().chain(front_matter.data()) {
            context.insert(key, value);
        }
        context.insert("page", &page_data);

        let output_path = match permalink {
            Permalink::Template(template) => {
                let rendered = tera
                    .render_str(&template, &context)
                    .map_err(|e| template_error(page, describe_tera_error(&e)))?;
                permalink_output_path(&rendered)
            }
            Permalink::Default | Permalink::Disabled => default_output,
        };
        page_data.url = url_for(&output_path);
        page_data.output_path = slash_path(&output_path);
        context.insert("page", &page_data);

        let mut content = match self.config.engine_for(page.format) {
            TemplateEngine::Tera => {
                let name = page.template_name();
                tera.add_raw_template(&name, body)
                    .and_then(|()| tera.render(&name, &context))
                    .map_err(|e| template_error(page, describe_tera_error(&e)))?
            }
            TemplateEngine::Verbatim => body.to_string(),
        };
        if page.format == TemplateFormat::Md {
            content = render_markdown(&content);
        }

        let html = match front_matter.layout() {
            Some(layout) => {
                context.insert("content", &content);
                tera.render(layout, &context).map_err(|e| {
                    template_error(page, format!("layout '{}': {}", layout, describe_tera_error(&e)))
                })?
            }
            None => content,
        };

        Ok(Some(RenderedPage { output_path, html }))
    }
}

#[derive(Debug, Clone, Copy)]
enum DataKind {
    Json,
    Yaml,
}

impl DataKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(DataKind::Json),
            "yaml" | "yml" => Some(DataKind::Yaml),
            _ => None,
        }
    }

    fn parse(self, text: &str) -> std::result::Result<Value, String> {
        match self {
            DataKind::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            DataKind::Yaml => serde_yaml_ng::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

fn data_error(path: &Path, message: String) -> SiteError {
    SiteError::Data {
        path: path.display().to_string(),
        message,
    }
}

fn template_error(page: &PageSource, message: String) -> SiteError {
    SiteError::Template {
        name: page.input_path.display().to_string(),
        message,
    }
}

/// Path joined with `/`, as used for template names and `page` fields.
fn slash_path(path: &Path) -> String {
    path.iter()
        .filter_map(|c| c.to_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn modified_time(path: &Path) -> Result<String> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SiteError::io("Cannot stat", path, e))?;
    Ok(DateTime::<Utc>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| SiteError::io("Cannot read", path, e))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SiteError::io("Cannot create directory", parent, e))?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, content).map_err(|e| SiteError::io("Cannot write", path, e))
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    create_parent(to)?;
    std::fs::copy(from, to).map_err(|e| SiteError::io("Cannot copy", from, e))?;
    Ok(())
}
