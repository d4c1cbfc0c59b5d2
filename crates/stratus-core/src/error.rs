//! Configuration errors.
//!
//! A missing or placeholder API key is fatal: the process refuses to start
//! rather than run against the provider with a key that cannot work.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weather API key is missing or still set to a placeholder")]
    MissingApiKey,

    #[error("invalid base URL for {service}: {message}")]
    InvalidBaseUrl { service: String, message: String },

    #[error("could not determine the platform config directory")]
    NoConfigDir,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// A message suitable for showing to the user directly.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::MissingApiKey => {
                "No weather API key configured. Set STRATUS_OPENWEATHER_API_KEY or edit config.toml."
            }
            ConfigError::InvalidBaseUrl { .. } => "A service URL in config.toml is not valid.",
            ConfigError::NoConfigDir => "Could not locate a configuration directory.",
            ConfigError::Io(_) => "A configuration file could not be read or written.",
            ConfigError::Parse(_) | ConfigError::Serialize(_) => {
                "The configuration file is malformed."
            }
        }
    }
}
