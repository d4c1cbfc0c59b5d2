//! User settings: the refresh interval, persisted as a small TOML file in
//! the config directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use stratus_core::ConfigError;

/// The allowed refresh intervals, in seconds.
pub const REFRESH_INTERVALS_SECS: [u32; 6] = [100, 300, 600, 900, 1800, 3600];

const DEFAULT_REFRESH_SECS: u32 = 900;
const SETTINGS_FILE: &str = "settings.toml";

/// A refresh interval drawn from the fixed set in [`REFRESH_INTERVALS_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInterval(u32);

impl RefreshInterval {
    /// Validate a seconds value against the allowed set.
    pub fn from_secs(secs: u32) -> Option<Self> {
        REFRESH_INTERVALS_SECS.contains(&secs).then_some(Self(secs))
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Interval in whole minutes, for display.
    pub fn minutes(self) -> u32 {
        self.0 / 60
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self(DEFAULT_REFRESH_SECS)
    }
}

/// Persisted user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub refresh_interval: RefreshInterval,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    refresh_interval_secs: u32,
}

impl Settings {
    /// Load settings from the config directory, falling back to defaults
    /// when the file is absent or holds a value outside the allowed set.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let file: SettingsFile = toml::from_str(&contents)?;

        let refresh_interval =
            RefreshInterval::from_secs(file.refresh_interval_secs).unwrap_or_else(|| {
                tracing::warn!(
                    stored = file.refresh_interval_secs,
                    "stored refresh interval not in the allowed set, using default"
                );
                RefreshInterval::default()
            });

        Ok(Self { refresh_interval })
    }

    /// Save settings to the config directory, creating it as needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir)?;
        let file = SettingsFile {
            refresh_interval_secs: self.refresh_interval.as_secs(),
        };
        let contents = toml::to_string_pretty(&file)?;
        std::fs::write(config_dir.join(SETTINGS_FILE), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fifteen_minutes() {
        let interval = RefreshInterval::default();
        assert_eq!(interval.as_secs(), 900);
        assert_eq!(interval.minutes(), 15);
    }

    #[test]
    fn only_listed_intervals_are_valid() {
        for secs in REFRESH_INTERVALS_SECS {
            assert!(RefreshInterval::from_secs(secs).is_some());
        }
        assert!(RefreshInterval::from_secs(0).is_none());
        assert!(RefreshInterval::from_secs(60).is_none());
        assert!(RefreshInterval::from_secs(7200).is_none());
    }

    #[test]
    fn load_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.refresh_interval, RefreshInterval::default());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            refresh_interval: RefreshInterval::from_secs(300).unwrap(),
        };
        settings.save(dir.path()).unwrap();

        let reloaded = Settings::load(dir.path()).unwrap();
        assert_eq!(reloaded.refresh_interval.as_secs(), 300);
    }

    #[test]
    fn out_of_set_stored_value_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "refresh_interval_secs = 123\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.refresh_interval, RefreshInterval::default());
    }
}
