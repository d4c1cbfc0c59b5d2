use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides the API key from `config.toml`.
pub const API_KEY_ENV: &str = "STRATUS_OPENWEATHER_API_KEY";

const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_DIRECTORY_BASE_URL: &str = "https://countriesnow.space/api/v0.1";
const API_KEY_PLACEHOLDER: &str = "YOUR_OPENWEATHER_API_KEY";

/// A single validation finding (field + message).
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// User-friendly summary of all errors.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Weather provider settings (OpenWeather-style API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    /// Provider API key. Overridden by [`API_KEY_ENV`] when set.
    pub api_key: String,

    /// Base URL for the current-weather and one-call endpoints.
    pub base_url: String,
}

impl WeatherApiConfig {
    /// Check the key is present and not a placeholder.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_key.starts_with("YOUR_")
    }
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }
}

/// Country/city directory settings. The directory API needs no key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryApiConfig {
    pub base_url: String,
}

impl Default for DirectoryApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTORY_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory.
    pub config_dir: PathBuf,

    /// Weather provider settings.
    #[serde(default)]
    pub weather: WeatherApiConfig,

    /// City directory settings.
    #[serde(default)]
    pub directory: DirectoryApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stratus");

        Self {
            config_dir,
            weather: WeatherApiConfig::default(),
            directory: DirectoryApiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating the default if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Returns the config along with any validation warnings. Fails with a
    /// typed error when validation finds a fatal problem — notably a missing
    /// or placeholder API key, which the process must not start without.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            tracing::error!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
            return Err(config.first_fatal_error(&validation));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the effective configuration (including the env override).
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.resolved_api_key().is_none() {
            result.add_error(
                "weather.api_key",
                "missing or placeholder API key (set STRATUS_OPENWEATHER_API_KEY or edit config.toml)",
            );
        }

        if let Err(e) = Url::parse(&self.weather.base_url) {
            result.add_error("weather.base_url", e.to_string());
        }
        if let Err(e) = Url::parse(&self.directory.base_url) {
            result.add_error("directory.base_url", e.to_string());
        }

        result
    }

    /// The API key to use: environment override first, then the config file.
    /// `None` when neither holds a usable (non-placeholder) key.
    pub fn resolved_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() && !key.starts_with("YOUR_") {
                return Some(key);
            }
        }

        if self.weather.is_configured() {
            return Some(self.weather.api_key.clone());
        }

        None
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Path to `config.toml` in the platform config directory.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("stratus");
        Ok(config_dir.join("config.toml"))
    }

    fn first_fatal_error(&self, validation: &ValidationResult) -> ConfigError {
        for error in &validation.errors {
            if error.field == "weather.api_key" {
                return ConfigError::MissingApiKey;
            }
            if let Some(service) = error.field.strip_suffix(".base_url") {
                return ConfigError::InvalidBaseUrl {
                    service: service.to_string(),
                    message: error.message.clone(),
                };
            }
        }
        ConfigError::MissingApiKey
    }
}
