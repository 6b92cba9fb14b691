// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Build command - renders the site described by `estuary.yaml`
//!
//! Example:
//!   estuary build
//!   estuary build --config site/estuary.yaml --output public -v base_url=/docs

use crate::common::ProjectContext;
use anyhow::{Context, Result};
use sitegen::{BuildReport, SiteBuilder};
use std::io::Write;

/// Build the site. `input` and `output` override `dir.input` and `dir.output`.
pub fn build_command(
    project: &ProjectContext,
    input: Option<&str>,
    output: Option<&str>,
    out: &mut dyn Write,
) -> Result<BuildReport> {
    let mut config = project.load_config()?;
    if let Some(input) = input {
        config.dir.input = input.to_string();
    }
    if let Some(output) = output {
        config.dir.output = output.to_string();
    }

    let root = project.root();
    let output_dir = config.output_dir(&root);
    let report = match SiteBuilder::new(root, config).build() {
        Ok(report) => report,
        Err(err) => {
            diagnostics::error!("Site build failed: {reason}", reason: err.to_string());
            return Err(err).context("Site build failed");
        }
    };

    for page in &report.pages_written {
        writeln!(out, "  {}", page.display())?;
    }
    writeln!(
        out,
        "Wrote {} pages to {} ({} skipped, {} files copied)",
        report.pages_written.len(),
        output_dir.display(),
        report.pages_skipped.len(),
        report.files_copied
    )?;
    Ok(report)
}
