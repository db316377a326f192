use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::{GenerationParams, DEFAULT_ENDPOINT, DEFAULT_MAX_LENGTH, DEFAULT_TEMPERATURE};
use crate::export::DEFAULT_FILENAME_PREFIX;

/// Accepted by the backend's request schema
pub const MAX_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 50..=2000;
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=1.0;

/// Optional color overrides as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the generation API, e.g. http://localhost:5000/api
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Mode selected at startup (unknown names fall back to blog)
    #[serde(default = "default_mode")]
    pub default_mode: String,

    #[serde(default = "default_max_length")]
    pub max_length: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// First part of exported filenames
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// Where downloads are written (defaults to the user's download dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Show a desktop notification when a file is saved
    #[serde(default)]
    pub notifications: bool,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_mode() -> String {
    "blog".to_string()
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_filename_prefix() -> String {
    DEFAULT_FILENAME_PREFIX.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_mode: default_mode(),
            max_length: default_max_length(),
            temperature: default_temperature(),
            filename_prefix: default_filename_prefix(),
            download_dir: None,
            notifications: false,
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("scrivener");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load `path`, writing defaults there when it doesn't exist yet.
    /// A file that exists but is unreadable or invalid is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = AppConfig::default();
            if let Err(e) = config.save_to(path) {
                tracing::warn!("Could not write default config: {}", e);
            }
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            errors.push(format!(
                "endpoint '{}' must start with http:// or https://",
                self.endpoint
            ));
        }
        if !MAX_LENGTH_RANGE.contains(&self.max_length) {
            errors.push(format!(
                "max_length {} must be between {} and {}",
                self.max_length,
                MAX_LENGTH_RANGE.start(),
                MAX_LENGTH_RANGE.end()
            ));
        }
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            errors.push(format!(
                "temperature {} must be between {} and {}",
                self.temperature,
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            ));
        }
        if self.filename_prefix.trim().is_empty()
            || self.filename_prefix.contains(['/', '\\', ':'])
        {
            errors.push(format!(
                "filename_prefix '{}' must be non-empty and contain no path separators",
                self.filename_prefix
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Invalid configuration:\n  {}", errors.join("\n  "))
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_length: self.max_length,
            temperature: self.temperature,
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(crate::export::default_download_dir)
    }
}
