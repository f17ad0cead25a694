use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ICON_BASE: &str = "http://openweathermap.org/img/wn";
pub const DEFAULT_LOCATION_URL: &str = "http://ip-api.com/json";

/// How the "use my location" action resolves coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// When false, location lookups report that geolocation is unsupported.
    pub enabled: bool,
    pub lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self { enabled: true, lookup_url: DEFAULT_LOCATION_URL.to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// http_timeout_secs = 10
///
/// [location]
/// enabled = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub icon_base: String,
    /// Unset means the HTTP client's own default.
    pub http_timeout_secs: Option<u64>,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            icon_base: DEFAULT_ICON_BASE.to_string(),
            http_timeout_secs: None,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file.
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
        ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted lookup state (the recent-city list).
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key from the environment, falling back to the stored one.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `citycast configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key_with(None).unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("citycast configure"));
    }

    #[test]
    fn environment_key_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        assert_eq!(cfg.resolve_api_key_with(None).unwrap(), "STORED");
        assert_eq!(cfg.resolve_api_key_with(Some("ENV".into())).unwrap(), "ENV");
        assert_eq!(cfg.resolve_api_key_with(Some("  ".into())).unwrap(), "STORED");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"

            [location]
            enabled = false
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert!(!cfg.location.enabled);
        assert_eq!(cfg.location.lookup_url, DEFAULT_LOCATION_URL);
        assert_eq!(cfg.http_timeout(), None);
    }

    #[test]
    fn toml_roundtrip_keeps_timeout() {
        let cfg = Config { http_timeout_secs: Some(7), ..Config::default() };
        let text = toml::to_string_pretty(&cfg).unwrap();

        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.http_timeout(), Some(Duration::from_secs(7)));
    }
}
