// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Config command - prints the resolved configuration
//!
//! Template expansion and defaults are applied, so the output shows exactly
//! what `estuary build` would use.

use crate::common::ProjectContext;
use anyhow::{Context, Result};
use std::io::Write;

pub fn config_command(project: &ProjectContext, out: &mut dyn Write) -> Result<()> {
    let config = project.load_config()?;
    let yaml = serde_yaml_ng::to_string(&config).context("Failed to serialize configuration")?;
    out.write_all(yaml.as_bytes())?;
    Ok(())
}
