use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hourly forecast entries kept per record; the provider returns many more.
pub const MAX_HOURLY_ENTRIES: usize = 6;

/// Semantic weather icons mapped from provider icon codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    #[default]
    Sun,
    Moon,
    CloudSun,
    CloudMoon,
    Cloud,
    CloudRain,
    CloudSunRain,
    CloudMoonRain,
    CloudLightning,
    Snow,
    Fog,
}

impl WeatherIcon {
    /// Convert a provider icon code (e.g. "01d", "10n") to a semantic icon.
    ///
    /// Total over all inputs: unrecognized codes yield [`WeatherIcon::Sun`].
    /// Day/night variants collapse only where the provider itself does not
    /// distinguish them (03/04/09/11/13/50).
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "01d" => Self::Sun,
            "01n" => Self::Moon,
            "02d" => Self::CloudSun,
            "02n" => Self::CloudMoon,
            "03d" | "03n" | "04d" | "04n" => Self::Cloud,
            "09d" | "09n" => Self::CloudRain,
            "10d" => Self::CloudSunRain,
            "10n" => Self::CloudMoonRain,
            "11d" | "11n" => Self::CloudLightning,
            "13d" | "13n" => Self::Snow,
            "50d" | "50n" => Self::Fog,
            _ => Self::Sun,
        }
    }

    /// Icon name usable by any front end.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::CloudSun => "cloud_sun",
            Self::CloudMoon => "cloud_moon",
            Self::Cloud => "cloud",
            Self::CloudRain => "cloud_rain",
            Self::CloudSunRain => "cloud_sun_rain",
            Self::CloudMoonRain => "cloud_moon_rain",
            Self::CloudLightning => "cloud_lightning",
            Self::Snow => "snow",
            Self::Fog => "fog",
        }
    }
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One hourly forecast entry, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
    pub icon: WeatherIcon,
}

/// Current conditions for one city.
///
/// `id` is assigned at creation and never taken from the provider; every
/// merge operation preserves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: Uuid,
    pub city_name: String,
    pub temperature: f64,
    pub condition: String,
    pub icon: WeatherIcon,
    pub uv_index: f64,
    pub wind_speed_mps: f64,
    pub humidity_pct: f64,
    pub utc_offset_secs: i32,
    pub coordinates: Coordinates,
    pub hourly_forecast: Vec<HourlyEntry>,
}

impl WeatherRecord {
    /// A record with defaults everywhere except the city name.
    pub fn new(city_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            city_name: city_name.into(),
            temperature: 0.0,
            condition: String::new(),
            icon: WeatherIcon::default(),
            uv_index: 0.0,
            wind_speed_mps: 0.0,
            humidity_pct: 0.0,
            utc_offset_secs: 0,
            coordinates: Coordinates::default(),
            hourly_forecast: Vec::new(),
        }
    }

    /// Merge a detailed fetch into this record, preserving id, city name
    /// and coordinates.
    pub fn with_detail(&self, detail: &WeatherDetail) -> Self {
        Self {
            id: self.id,
            city_name: self.city_name.clone(),
            temperature: detail.temperature,
            condition: detail.condition.clone(),
            icon: detail.icon,
            uv_index: detail.uv_index,
            wind_speed_mps: detail.wind_speed_mps,
            humidity_pct: detail.humidity_pct,
            utc_offset_secs: detail.utc_offset_secs,
            coordinates: self.coordinates,
            hourly_forecast: detail
                .hourly
                .iter()
                .take(MAX_HOURLY_ENTRIES)
                .cloned()
                .collect(),
        }
    }

    /// Local display time: current UTC instant shifted by the stored offset.
    /// An approximation — the offset is treated as constant (no DST).
    pub fn local_time(&self) -> DateTime<FixedOffset> {
        self.local_time_at(Utc::now())
    }

    fn local_time_at(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        match FixedOffset::east_opt(self.utc_offset_secs) {
            Some(offset) => now.with_timezone(&offset),
            None => now.fixed_offset(),
        }
    }

    /// Local time formatted as "HH:MM".
    pub fn format_local_time(&self) -> String {
        self.local_time().format("%H:%M").to_string()
    }
}

/// Result of a detailed (coordinate-based) fetch. Merged into an existing
/// [`WeatherRecord`] via [`WeatherRecord::with_detail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDetail {
    pub temperature: f64,
    pub condition: String,
    pub icon: WeatherIcon,
    pub uv_index: f64,
    pub wind_speed_mps: f64,
    pub humidity_pct: f64,
    pub utc_offset_secs: i32,
    pub hourly: Vec<HourlyEntry>,
}

/// Weather service errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("network error: {0}")]
    Network(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl WeatherError {
    /// A message suitable for showing to the user directly.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(_) => {
                "Unable to reach the weather service. Check your internet connection."
            }
            WeatherError::NotFound(_) => "City not found. Check the spelling and try again.",
            WeatherError::Decode(_) => "The weather service returned an unexpected response.",
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            WeatherError::Decode(e.to_string())
        } else if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
            WeatherError::NotFound(e.to_string())
        } else {
            WeatherError::Network(e.to_string())
        }
    }
}
