// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! # Sitegen: static site builder for Estuary
//!
//! Reads `estuary.yaml`, renders Markdown and HTML templates through Tera
//! (with the `date` filter from [`datefmt`]), and writes the site to the
//! output directory.
//!
//! ```no_run
//! use sitegen::{SiteBuilder, SiteConfig};
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = SiteConfig::load_or_default(&root.join(sitegen::CONFIG_FILE), &HashMap::new())?;
//! let report = SiteBuilder::new(root, config).build()?;
//! println!("{} pages written", report.pages_written.len());
//! # Ok::<(), sitegen::SiteError>(())
//! ```

mod builder;
mod config;
mod error;
pub mod markdown;
mod page;
mod template;

pub use builder::{BuildReport, SiteBuilder};
pub use config::{CONFIG_FILE, DateConfig, DirConfig, SiteConfig, TemplateEngine, TemplateFormat};
pub use error::{Result, SiteError};
pub use page::{FrontMatter, PageSource, Permalink};
pub use template::{DateFilter, describe_tera_error, expand_yaml_template, new_tera};
