use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::{
    api::ApiConfig,
    model::Language,
    service::{ConfigUpdate, ServiceConfig},
    temperature::DEFAULT_THRESHOLD,
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// language = "en"
/// comparison_threshold = 2.0
///
/// [service]
/// use_mock_data = true
/// mock_latency_ms = 1000
///
/// [api]
/// base_url = "http://localhost:3000/api"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,

    /// `|today - last year|` (°C) at or below which the days count as similar.
    pub comparison_threshold: f64,

    pub service: ServiceConfig,

    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default(),
            comparison_threshold: DEFAULT_THRESHOLD,
            service: ServiceConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if !cfg.comparison_threshold.is_finite() || cfg.comparison_threshold < 0.0 {
            return Err(anyhow!(
                "Invalid comparison_threshold {} in {}: expected a non-negative number",
                cfg.comparison_threshold,
                path.display()
            ));
        }

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-timemachine", "timemachine")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Merge a partial service update into the stored service section.
    pub fn apply_service_update(&mut self, update: ConfigUpdate) {
        self.service = self.service.merged(update);
    }
}
