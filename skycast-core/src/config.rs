use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::ConfigError;

/// Default OpenWeather API root; overridable for proxies and tests.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "SKYCAST_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.openweathermap.org/data/2.5"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key, set via `skycast configure`.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { api_key: None, base_url: default_base_url() }
    }
}

impl Config {
    /// The API key to use for requests, with `SKYCAST_API_KEY` taking
    /// precedence over the stored value. A missing key is the fatal
    /// precondition for any retrieval attempt.
    pub fn require_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok().as_deref())
    }

    /// Key resolution with the environment override passed in explicitly,
    /// so it can be exercised without touching process state.
    fn resolve_api_key(&self, env_override: Option<&str>) -> Result<String, ConfigError> {
        if let Some(key) = env_override {
            if !key.trim().is_empty() {
                return Ok(key.to_string());
            }
        }

        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// Unlike the recents store, a malformed config file is an error: it is
    /// user-authored and silently discarding it would hide a typo.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
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
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}

/// Platform data directory, used by the recents store.
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_an_error() {
        let cfg = Config::default();
        assert_eq!(cfg.resolve_api_key(None), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        assert_eq!(cfg.resolve_api_key(None), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn stored_api_key_is_returned() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        assert_eq!(cfg.resolve_api_key(None).as_deref(), Ok("KEY"));
    }

    #[test]
    fn environment_override_wins_over_the_stored_key() {
        let cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };
        assert_eq!(cfg.resolve_api_key(Some("ENV_KEY")).as_deref(), Ok("ENV_KEY"));
    }

    #[test]
    fn blank_environment_override_falls_back_to_the_stored_key() {
        let cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };
        assert_eq!(cfg.resolve_api_key(Some("  ")).as_deref(), Ok("FILE_KEY"));
    }

    #[test]
    fn base_url_defaults_when_absent_from_toml() {
        let cfg: Config = toml::from_str(r#"api_key = "KEY""#).expect("valid toml");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }
}
