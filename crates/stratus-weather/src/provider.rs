use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::types::{
    Coordinates, HourlyEntry, WeatherDetail, WeatherError, WeatherIcon, WeatherRecord,
    MAX_HOURLY_ENTRIES,
};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for the weather provider's current-weather and one-call endpoints.
///
/// Stateless beyond its configuration; cheap to clone and safe to share
/// across concurrent calls.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: Url,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Resolve a free-text city name to current conditions via the provider's
    /// name-lookup endpoint.
    ///
    /// The cheap endpoint carries no UV/wind/humidity/hourly data, so those
    /// fields stay at their defaults; a detailed fetch fills them in later.
    pub async fn search_current(&self, query: &str) -> Result<WeatherRecord, WeatherError> {
        tracing::debug!(query, "searching current weather");

        let response = self
            .client
            .get(self.endpoint("weather"))
            .query(&[
                ("q", query),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(format!("no match for '{query}'")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Network(format!(
                "weather request failed with status {status}: {}",
                truncate_body(&body)
            )));
        }

        let body: CurrentWeatherResponse = response.json().await?;
        Ok(map_current(body))
    }

    /// Resolve full current + hourly data via the provider's coordinate-based
    /// one-call endpoint. Keeps the first [`MAX_HOURLY_ENTRIES`] hourly
    /// entries in provider order.
    pub async fn fetch_detailed(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherDetail, WeatherError> {
        tracing::debug!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            "fetching detailed weather"
        );

        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let response = self
            .client
            .get(self.endpoint("onecall"))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("exclude", "minutely,daily,alerts"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(format!(
                "no data for coordinates ({}, {})",
                coords.latitude, coords.longitude
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Network(format!(
                "one-call request failed with status {status}: {}",
                truncate_body(&body)
            )));
        }

        let body: OneCallResponse = response.json().await?;
        Ok(map_detail(body))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct CoordBlock {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    main: MainBlock,
    weather: Vec<ConditionBlock>,
    timezone: i32,
    coord: CoordBlock,
}

#[derive(Debug, Deserialize)]
struct OneCallCurrent {
    temp: f64,
    humidity: f64,
    uvi: f64,
    wind_speed: f64,
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct OneCallHourly {
    dt: i64,
    temp: f64,
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    timezone_offset: i32,
    current: OneCallCurrent,
    #[serde(default)]
    hourly: Vec<OneCallHourly>,
}

fn map_current(body: CurrentWeatherResponse) -> WeatherRecord {
    let (condition, icon) = primary_condition(&body.weather);

    let mut record = WeatherRecord::new(body.name);
    record.temperature = body.main.temp;
    record.condition = condition;
    record.icon = icon;
    record.utc_offset_secs = body.timezone;
    record.coordinates = Coordinates {
        latitude: body.coord.lat,
        longitude: body.coord.lon,
    };
    record
}

fn map_detail(body: OneCallResponse) -> WeatherDetail {
    let (condition, icon) = primary_condition(&body.current.weather);

    let hourly = body
        .hourly
        .into_iter()
        .take(MAX_HOURLY_ENTRIES)
        .map(|h| {
            let (condition, icon) = primary_condition(&h.weather);
            HourlyEntry {
                time: unix_to_utc(h.dt),
                temperature: h.temp,
                condition,
                icon,
            }
        })
        .collect();

    WeatherDetail {
        temperature: body.current.temp,
        condition,
        icon,
        uv_index: body.current.uvi,
        wind_speed_mps: body.current.wind_speed,
        humidity_pct: body.current.humidity,
        utc_offset_secs: body.timezone_offset,
        hourly,
    }
}

fn primary_condition(weather: &[ConditionBlock]) -> (String, WeatherIcon) {
    weather
        .first()
        .map(|w| {
            (
                w.description.clone(),
                WeatherIcon::from_provider_code(&w.icon),
            )
        })
        .unwrap_or_else(|| (String::new(), WeatherIcon::default()))
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
