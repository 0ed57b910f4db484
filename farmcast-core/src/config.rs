use anyhow::{Context, Result, anyhow, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    model::{Coordinate, LocationResult, PlaceLabel, Provenance},
    normalize::DEFAULT_HORIZON,
};

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "FARMCAST_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Absent means the layer runs in permanent synthetic mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: default_base_url() }
    }
}

/// Location used whenever the device position cannot be obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            latitude: 28.6139,
            longitude: 77.2090,
            city: "New Delhi".to_string(),
            country: "India".to_string(),
        }
    }
}

impl DefaultLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn to_location(&self) -> LocationResult {
        LocationResult {
            coordinate: self.coordinate(),
            label: PlaceLabel::new(self.city.clone(), self.country.clone()),
            provenance: Provenance::DefaultFallback,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// request_timeout_ms = 10000
///
/// [provider]
/// api_key = "..."
///
/// [default_location]
/// latitude = 18.52
/// longitude = 73.85
/// city = "Pune"
/// country = "India"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub default_location: DefaultLocation,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,

    #[serde(default = "default_forecast_horizon_days")]
    pub forecast_horizon_days: usize,

    /// How old a previously obtained position fix may be and still be reused.
    #[serde(default = "default_cache_staleness_tolerance_ms")]
    pub cache_staleness_tolerance_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            default_location: DefaultLocation::default(),
            request_timeout_ms: default_request_timeout_ms(),
            geolocation_timeout_ms: default_geolocation_timeout_ms(),
            forecast_horizon_days: default_forecast_horizon_days(),
            cache_staleness_tolerance_ms: default_cache_staleness_tolerance_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_geolocation_timeout_ms() -> u64 {
    10_000
}

fn default_forecast_horizon_days() -> usize {
    DEFAULT_HORIZON
}

fn default_cache_staleness_tolerance_ms() -> u64 {
    5 * 60 * 1000
}

impl Config {
    /// Load config from the platform config dir, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_override(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "farmcast", "farmcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.default_location.coordinate().is_valid(),
            "default_location ({}, {}) is outside valid latitude/longitude ranges",
            self.default_location.latitude,
            self.default_location.longitude
        );
        ensure!(
            !self.default_location.city.trim().is_empty(),
            "default_location.city must not be empty"
        );
        ensure!(self.forecast_horizon_days > 0, "forecast_horizon_days must be at least 1");
        ensure!(self.request_timeout_ms > 0, "request_timeout_ms must be greater than zero");
        Ok(())
    }

    /// Replace the API key with `value` when it is set and non-empty.
    pub fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
    }

    /// Returns the API key, treating blank strings as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.provider.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Store `api_key`; a blank key clears it.
    pub fn set_api_key(&mut self, api_key: String) {
        self.provider.api_key = Some(api_key).filter(|k| !k.trim().is_empty());
    }

    pub fn is_provider_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn fix_max_age(&self) -> Duration {
        Duration::from_millis(self.cache_staleness_tolerance_ms)
    }
}
