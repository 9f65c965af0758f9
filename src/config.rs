//! Configuration Management
//!
//! Persistent CLI settings for restweave.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Last used resource file
    #[serde(default)]
    pub resources_file: Option<PathBuf>,
    /// Root path overriding the resource file's
    #[serde(default)]
    pub root_path: Option<String>,
    /// Headers added on top of the resource file's defaults
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("restweave").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective resource file (CLI > config)
    pub fn effective_resources_file(&self, cli: Option<PathBuf>) -> Option<PathBuf> {
        cli.or_else(|| self.resources_file.clone())
    }

    /// Get effective root path (CLI > config > resource file)
    pub fn effective_root_path(&self, cli: Option<String>, file: Option<String>) -> Option<String> {
        cli.or_else(|| self.root_path.clone()).or(file)
    }

    /// Merge headers (resource file < config < CLI)
    pub fn effective_headers(
        &self,
        file: &BTreeMap<String, String>,
        cli: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut headers = file.clone();
        headers.extend(self.default_headers.clone());
        headers.extend(cli.clone());
        headers
    }
}
