use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinates;

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
pub const DEFAULT_REVERSE_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = concat!("weather-widget/", env!("CARGO_PKG_VERSION"));

/// Remote endpoints. Overridable mostly so tests and self-hosted mirrors can
/// point the clients somewhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather: String,
    pub geocoding: String,
    pub reverse_geocoding: String,
    /// Sent as `User-Agent` to the reverse geocoder, which requires one.
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: DEFAULT_WEATHER_URL.to_string(),
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            reverse_geocoding: DEFAULT_REVERSE_GEOCODING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fixed position reported by the built-in geolocator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_accuracy")]
    pub accuracy_meters: f64,
}

fn default_accuracy() -> f64 {
    1000.0
}

impl From<HomeLocation> for Coordinates {
    fn from(home: HomeLocation) -> Self {
        Coordinates {
            latitude: home.latitude,
            longitude: home.longitude,
            accuracy_meters: home.accuracy_meters,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [home]
/// latitude = 38.72225
/// longitude = -9.13934
/// accuracy_meters = 30.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    pub home: Option<HomeLocation>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Returns the API key, preferring `WEATHER_API_KEY` over the file.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    pub(crate) fn api_key_with_env(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_home(&mut self, home: Option<HomeLocation>) {
        self.home = home;
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

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
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

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted theme flag.
    pub fn theme_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("theme"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key_with_env(None).unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn env_key_takes_precedence_over_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.api_key_with_env(Some("ENV_KEY".into())).expect("key");
        assert_eq!(key, "ENV_KEY");

        let key = cfg.api_key_with_env(None).expect("key");
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn blank_env_key_falls_back_to_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.api_key_with_env(Some("   ".into())).expect("key");
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg = Config::from_toml("api_key = \"K\"\n").expect("parse");

        assert_eq!(cfg.api_key.as_deref(), Some("K"));
        assert!(cfg.home.is_none());
        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[test]
    fn home_location_parses_with_default_accuracy() {
        let toml = r#"
[home]
latitude = 38.7
longitude = -9.1

[endpoints]
weather = "http://localhost/w"
"#;
        let cfg = Config::from_toml(toml).expect("parse");

        let home = cfg.home.expect("home");
        assert_eq!(home.accuracy_meters, 1000.0);
        assert_eq!(cfg.endpoints.weather, "http://localhost/w");
        assert_eq!(cfg.endpoints.geocoding, DEFAULT_GEOCODING_URL);
    }

    #[test]
    fn config_survives_toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("K".into());
        cfg.set_home(Some(HomeLocation {
            latitude: 1.5,
            longitude: 2.5,
            accuracy_meters: 10.0,
        }));

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");

        assert_eq!(back.api_key, cfg.api_key);
        assert_eq!(back.home, cfg.home);
    }

    #[test]
    fn files_live_under_widget_project_dirs() {
        // Platforms without a home directory have no project dirs at all.
        let Ok(config) = Config::config_file_path() else {
            return;
        };
        let theme = Config::theme_file_path().expect("theme path");

        for path in [config, theme] {
            let text = path.to_string_lossy().into_owned();
            assert!(text.contains("weather-widget"), "{text}");
        }
    }
}
