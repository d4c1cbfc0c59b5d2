use anyhow::{Context, Result};
use url::Url;

use stratus_app::{CityBoard, Settings};
use stratus_core::{Config, ConfigError};
use stratus_weather::{WeatherProvider, WeatherRecord};

#[tokio::main]
async fn main() -> Result<()> {
    stratus_core::init()?;

    // Refuse to start without a usable API key.
    let (config, _validation) = Config::load_validated()?;
    let api_key = config.resolved_api_key().ok_or(ConfigError::MissingApiKey)?;

    let settings = Settings::load(&config.config_dir)?;
    tracing::info!(
        interval_secs = settings.refresh_interval.as_secs(),
        "loaded settings"
    );

    let base_url = Url::parse(&config.weather.base_url).context("invalid weather base URL")?;
    let provider = WeatherProvider::new(base_url, api_key)?;

    let board = CityBoard::with_cities(provider, seed_cities());
    board.start_periodic_refresh(settings.refresh_interval);

    tracing::info!(cities = board.cities().len(), "stratus started");

    let mut changes = board.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(message) = board.last_error() {
                    tracing::warn!(%message, "board error");
                }
                for city in board.cities() {
                    tracing::info!(
                        city = %city.city_name,
                        temperature = city.temperature,
                        condition = %city.condition,
                        local_time = %city.format_local_time(),
                        "conditions"
                    );
                }
            }
        }
    }

    board.stop_periodic_refresh();
    tracing::info!("shutting down");
    Ok(())
}

/// Cities shown on first launch, before the user saves their own.
fn seed_cities() -> Vec<WeatherRecord> {
    ["Ottawa", "Santo Domingo", "Buenos Aires", "Barcelona"]
        .into_iter()
        .map(WeatherRecord::new)
        .collect()
}
