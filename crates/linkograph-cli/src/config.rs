//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Resolve the config file location
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linkograph")
            .join("config.toml"),
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label given to commands no rule matches
    pub default_label: String,

    pub output_format: OutputFormat,

    /// Seed for random labeling sweeps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Labelings visited by a frequency sweep (all when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_label: "NoLabel".to_string(),
            output_format: OutputFormat::Json,
            seed: None,
            samples: None,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["default_label", "output_format", "seed", "samples"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default_label" => Some(self.default_label.clone()),
            "output_format" => Some(self.output_format.to_string()),
            "seed" => self.seed.map(|s| s.to_string()),
            "samples" => self.samples.map(|s| s.to_string()),
            _ => None,
        }
    }

    /// Set a key from its text form; `none` clears optional keys
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let optional = |value: &str| -> anyhow::Result<Option<u64>> {
            if value.eq_ignore_ascii_case("none") {
                return Ok(None);
            }
            Ok(Some(value.parse().with_context(|| {
                format!("Expected an integer for {}, got '{}'", key, value)
            })?))
        };

        match key {
            "default_label" => self.default_label = value.to_string(),
            "output_format" => self.output_format = value.parse()?,
            "seed" => self.seed = optional(value)?,
            "samples" => self.samples = optional(value)?,
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
