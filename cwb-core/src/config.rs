use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// City shown when the user never picked one.
pub const DEFAULT_CITY: &str = "臺北市";

/// CWB open-data datastore base URL.
pub const DEFAULT_BASE_URL: &str = "https://opendata.cwb.gov.tw/api/v1/rest/datastore";

/// Top-level configuration stored on disk.
///
/// Every field is optional in the TOML file; accessors apply the defaults so
/// callers never see the raw `Option`s.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Selected display city, persisted across sessions.
    pub city: Option<String>,

    /// CWB open-data authorization key.
    pub authorization_key: Option<String>,

    /// Override for the datastore base URL (tests, mirrors).
    pub base_url: Option<String>,
}

impl Config {
    /// Selected city, falling back to the hardcoded default.
    pub fn city_or_default(&self) -> &str {
        self.city.as_deref().unwrap_or(DEFAULT_CITY)
    }

    pub fn base_url_or_default(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Authorization key, or a loud error telling the user how to set one.
    pub fn authorization_key(&self) -> Result<&str> {
        self.authorization_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No CWB authorization key configured.\n\
                 Hint: run `cwb configure` and enter the key from https://opendata.cwb.gov.tw."
            )
        })
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = Some(city.into());
    }

    pub fn set_authorization_key(&mut self, key: impl Into<String>) {
        self.authorization_key = Some(key.into());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
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
        let dirs = ProjectDirs::from("tw", "cwb-dashboard", "cwb")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
