use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::gateway;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuraProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub aura: Option<AuraProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            aura: Some(AuraProviderConfig {
                base_url: gateway::DEFAULT_BASE_URL.to_string(),
            }),
        }
    }
}

/// Projection inputs used when the CLI flags and the remote lookup leave a
/// value unspecified. `principal` doubles as the manual fallback when the
/// balance response has no recognizable shape.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectionDefaults {
    #[serde(default = "default_principal")]
    pub principal: f64,
    #[serde(default = "default_rate_percent")]
    pub rate_percent: f64,
    #[serde(default = "default_years")]
    pub years: u32,
}

fn default_principal() -> f64 {
    1000.0
}

fn default_rate_percent() -> f64 {
    7.0
}

fn default_years() -> u32 {
    30
}

impl Default for ProjectionDefaults {
    fn default() -> Self {
        ProjectionDefaults {
            principal: default_principal(),
            rate_percent: default_rate_percent(),
            years: default_years(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Optional AURA API credential; requests go out without it when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub defaults: ProjectionDefaults,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "auragrow")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Directory holding the durable response cache.
    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "auragrow")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.providers
            .aura
            .as_ref()
            .map_or(gateway::DEFAULT_BASE_URL, |p| &p.base_url)
    }
}
