//! Resource Registry - Load resource definitions from JSON or YAML
//!
//! A resource file declares the root path, default headers and the
//! resources themselves. Files are parsed into [`ResourceConfig`] and turned
//! into a [`Registry`] keyed by resource name.

use super::definition::{ActionDefinition, ParamMap, ResourceDefinition};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Resource definition from a resource file
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub path: String,
    #[serde(default)]
    pub params: ParamMap,
    /// Keep the create/update/delete/get/list interface
    #[serde(default = "default_true")]
    pub defaults: bool,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionDefinition>,
}

impl From<ResourceDef> for ResourceDefinition {
    fn from(def: ResourceDef) -> Self {
        let mut definition = ResourceDefinition::new(def.path).with_defaults(def.defaults);
        definition.params = def.params;
        definition.actions = def.actions.into_iter().collect();
        definition
    }
}

/// Root structure of a resource file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub root_path: Option<String>,
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDef>,
}

impl ResourceConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse resource JSON")
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse resource YAML")
    }

    /// Load a resource file, choosing the parser by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource file {}", path.display()))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };

        tracing::info!("Loaded {} resources from {:?}", config.resources.len(), path);
        Ok(config)
    }

    /// Merge another file into this one; later files win
    pub fn merge(&mut self, other: ResourceConfig) {
        if other.root_path.is_some() {
            self.root_path = other.root_path;
        }
        self.default_headers.extend(other.default_headers);
        self.resources.extend(other.resources);
    }

    pub fn into_registry(self) -> Registry {
        let mut registry = Registry::new();
        for (key, def) in self.resources {
            registry.register(key, def.into());
        }
        registry
    }
}

/// Resource definitions keyed by name
#[derive(Debug, Clone, Default)]
pub struct Registry {
    resources: HashMap<String, ResourceDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, definition: ResourceDefinition) {
        self.resources.insert(key.into(), definition);
    }

    pub fn extend(&mut self, other: Registry) {
        self.resources.extend(other.resources);
    }

    /// Get a resource definition by key
    pub fn get(&self, key: &str) -> Option<&ResourceDefinition> {
        self.resources.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    /// Get all resource keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.resources.keys().map(|s| s.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
