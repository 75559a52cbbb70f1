use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// One city of the multi-city panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PanelCity {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub refresh_minutes: u64,

    /// Example TOML:
    /// [[panel.cities]]
    /// name = "Madrid"
    /// latitude = 40.4168
    /// longitude = -3.7038
    pub cities: Vec<PanelCity>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: 10,
            cities: vec![
                PanelCity::new("Bilbao", 43.2627, -2.9253),
                PanelCity::new("Barcelona", 41.3851, 2.1734),
                PanelCity::new("Madrid", 40.4168, -3.7038),
                PanelCity::new("Malaga", 36.7194, -4.4200),
            ],
        }
    }
}

impl PanelConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_minutes.max(1) * 60)
    }
}

/// Top-level configuration stored on disk. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open-Meteo geocoding base URL.
    pub geocoding_url: String,

    /// Open-Meteo forecast base URL.
    pub forecast_url: String,

    /// Language of geocoding results, e.g. "fr".
    pub language: String,

    /// Forecast horizon in days (1-16).
    pub forecast_days: u8,

    /// Per-request timeout; 0 disables the search timeout.
    pub request_timeout_secs: u64,

    /// Query searched once at startup.
    pub seed_query: String,

    pub panel: PanelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1".to_string(),
            forecast_url: "https://api.open-meteo.com/v1".to_string(),
            language: "fr".to_string(),
            forecast_days: 7,
            request_timeout_secs: 10,
            seed_query: "Lubumbashi".to_string(),
            panel: PanelConfig::default(),
        }
    }
}

impl Config {
    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.clamp(1, 16)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0)
            .then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = self.to_toml()?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
