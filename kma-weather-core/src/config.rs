use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const API_KEY_ENV: &str = "KMA_API_KEY";
pub const API_URL_ENV: &str = "KMA_API_URL";
pub const TIMEOUT_ENV: &str = "KMA_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str =
    "https://apihub.kma.go.kr/api/typ02/openApi/VilageFcstInfoService_2.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
/// timeout_secs = 10
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Effective settings after layering the environment over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Config::default().resolve_with(|_| None)
    }
}

impl ResolvedSettings {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_blank(Some(api_key.into()));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("kr", "kma-weather", "kma-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = non_blank(Some(api_key));
    }

    /// Layer the process environment over this config.
    pub fn resolve(&self) -> ResolvedSettings {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Like [`Config::resolve`], reading variables through `env`.
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> ResolvedSettings {
        let api_key = non_blank(env(API_KEY_ENV)).or_else(|| non_blank(self.api_key.clone()));

        let base_url = non_blank(env(API_URL_ENV))
            .or_else(|| non_blank(self.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match non_blank(env(TIMEOUT_ENV)).map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => Some(secs),
            Some(_) => {
                tracing::warn!(var = TIMEOUT_ENV, "ignoring invalid timeout");
                None
            }
            None => None,
        }
        .or(self.timeout_secs.filter(|secs| *secs > 0))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

        ResolvedSettings {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Load `.env` from the working directory or one of its parents.
///
/// Values from the file replace variables already set in the process.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv_override().ok()
}

/// Load a specific `.env` file, replacing variables already set.
pub fn load_dotenv_from(path: &Path) -> Result<()> {
    dotenvy::from_path_override(path)
        .with_context(|| format!("Failed to load env file: {}", path.display()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
