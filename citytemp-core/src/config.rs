use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://city.db?mode=rwc";
pub const DEFAULT_WEATHER_API_URL: &str = "http://api.weatherapi.com/v1/current.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the WeatherAPI.com current-conditions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_API_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND_ADDR.to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// database_url = "sqlite://city.db?mode=rwc"
///
/// [weather]
/// base_url = "http://api.weatherapi.com/v1/current.json"
/// api_key = "..."
///
/// [server]
/// bind = "127.0.0.1:8000"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub weather: WeatherApiConfig,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            weather: WeatherApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Load the config file, then layer `.env` and process environment on top.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let mut cfg = Self::load()?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Override fields from a key lookup, typically the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(url) = lookup("TEMPERATURE_API_URL") {
            self.weather.base_url = url;
        }
        if let Some(key) = lookup("TEMPERATURE_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(secs) = lookup("TEMPERATURE_API_TIMEOUT_SECS") {
            self.weather.timeout_secs = secs
                .parse()
                .with_context(|| format!("TEMPERATURE_API_TIMEOUT_SECS must be a number, got '{secs}'"))?;
        }
        if let Some(bind) = lookup("BIND_ADDR") {
            self.server.bind = bind;
        }
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "citytemp", "citytemp")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the weather API key, or an error explaining how to set one.
    pub fn weather_api_key(&self) -> Result<&str> {
        self.weather
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No weather API key configured.\n\
                     Hint: run `citytemp configure` or set TEMPERATURE_API_KEY."
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_sqlite_and_weatherapi() {
        let cfg = Config::default();

        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.weather.base_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(cfg.weather.timeout_secs, 10);
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
        assert!(cfg.weather.api_key.is_none());
    }

    #[test]
    fn weather_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.weather_api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No weather API key configured"));
        assert!(msg.contains("TEMPERATURE_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.weather.api_key = Some("   ".into());

        assert!(cfg.weather_api_key().is_err());
    }

    #[test]
    fn overrides_replace_only_present_keys() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[
            ("TEMPERATURE_API_KEY", "SECRET"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .expect("overrides should apply");

        assert_eq!(cfg.weather_api_key().expect("key must be set"), "SECRET");
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.weather.base_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(cfg.server.bind, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn invalid_timeout_override_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(lookup_from(&[("TEMPERATURE_API_TIMEOUT_SECS", "soon")]))
            .unwrap_err();

        assert!(err.to_string().contains("TEMPERATURE_API_TIMEOUT_SECS"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.weather.api_key = Some("KEY".into());
        cfg.server.bind = "0.0.0.0:9000".into();
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[weather]\napi_key = \"ABC\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.weather.api_key.as_deref(), Some("ABC"));
        assert_eq!(cfg.weather.base_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
    }
}
