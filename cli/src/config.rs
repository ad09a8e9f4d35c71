//! Configuration management for the CLI.
//!
//! Configuration is stored in ~/.unitcoder/{app_name}/config.yaml and holds
//! any number of named contexts, one of which may be current.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use unitcoder_artifact::ArtifactFormat;
use unitcoder_encode::{ErrorPolicy, ProfileName};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".unitcoder";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Map of context name to context configuration.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub contexts: HashMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Encoder defaults for one corpus or model setup.
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Codebook file (`.npy` or `.json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codebook: Option<PathBuf>,

    /// Extractor config document (YAML or JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ArtifactFormat>,

    /// Input file extension, without the dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Overrides the profile's primary layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,

    /// Overrides the profile's auxiliary layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux_layer: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<ErrorPolicy>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_existing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir(app_name: &str) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(app_name))
    }

    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Self::default_config_dir(app_name).map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Adds or replaces a context.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        self.save()
    }

    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if self.contexts.remove(name).is_none() {
            anyhow::bail!("context '{}' not found", name);
        }
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    /// Sets the current context.
    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the context by name, or the current context if no name is
    /// given.
    pub fn resolve_context(&self, name: Option<&str>) -> Option<&Context> {
        match name {
            Some(n) if !n.is_empty() => self.get_context(n),
            _ => self.get_current_context(),
        }
    }

    /// Lists all context names, sorted.
    pub fn list_contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Loads configuration for the specified app, creating an empty file when
/// none exists.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&content)?
    } else {
        let cfg = Config::default();
        std::fs::write(&config_path, serde_yaml::to_string(&cfg)?)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}
