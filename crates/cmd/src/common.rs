// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitegen::{CONFIG_FILE, SiteConfig};

/// Parse a `-v key=value` template variable.
pub fn parse_variable(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Where the project lives and how its config is expanded.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    config_path: PathBuf,
    variables: HashMap<String, String>,
}

impl ProjectContext {
    /// `config_path` defaults to `estuary.yaml` in the working directory.
    #[must_use]
    pub fn new(config_path: Option<PathBuf>, variables: Vec<(String, String)>) -> Self {
        Self {
            config_path: config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE)),
            variables: variables.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory containing the config file. Relative site paths resolve here.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Load the config, or the defaults when the file is absent.
    pub fn load_config(&self) -> Result<SiteConfig> {
        SiteConfig::load_or_default(&self.config_path, &self.variables)
            .with_context(|| format!("Failed to load {}", self.config_path.display()))
    }
}
