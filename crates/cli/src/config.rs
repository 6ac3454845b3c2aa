//! `showtimes.toml` loading.
//!
//! Relative paths in the file are resolved against the file's own directory,
//! so a config can be checked in next to its data.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_available_days() -> u32 {
    records::DateWindow::DEFAULT_AVAILABLE_DAYS
}

/// One `[[providers]]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub name: String,
    /// Display name; defaults to `name`
    pub label: Option<String>,
    #[serde(default = "default_available_days")]
    pub available_days: u32,
    /// Location table JSON
    pub locations: PathBuf,
    /// Snapshot directory root
    pub snapshots: PathBuf,
}

impl ProviderConfig {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// The optional `[details]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DetailsConfig {
    pub catalog: PathBuf,
    #[serde(default)]
    pub ignored_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    pub details: Option<DetailsConfig>,
}

impl Config {
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(text).context("Invalid configuration")?;

        let mut seen = std::collections::HashSet::new();
        for provider in &mut config.providers {
            if !seen.insert(provider.name.clone()) {
                bail!("Provider `{}` is configured twice", provider.name);
            }
            provider.locations = base_dir.join(&provider.locations);
            provider.snapshots = base_dir.join(&provider.snapshots);
        }
        if let Some(details) = &mut config.details {
            details.catalog = base_dir.join(&details.catalog);
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base_dir)
            .with_context(|| format!("Failed to load config {}", path.display()))
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}
