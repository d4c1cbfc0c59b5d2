//! Country/city directory: a single keyless endpoint listing every country
//! with its cities. Independent of the weather provider and not part of the
//! refresh path; it backs a future city picker.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::types::WeatherError;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One country with its cities, in response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCities {
    pub country: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    error: bool,
    msg: String,
    data: Vec<CountryCities>,
}

/// Client for the countries/cities directory API.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    client: Arc<Client>,
    base_url: Url,
}

impl CityDirectory {
    pub fn new(base_url: Url) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    /// Fetch the full country/city listing. One request, no pagination.
    pub async fn list_countries(&self) -> Result<Vec<CountryCities>, WeatherError> {
        let url = format!("{}/countries", self.base_url.as_str().trim_end_matches('/'));
        tracing::debug!(%url, "fetching city directory");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Network(format!(
                "directory request failed with status {status}"
            )));
        }

        let body: DirectoryResponse = response.json().await?;
        if body.error {
            return Err(WeatherError::Decode(format!(
                "directory API reported an error: {}",
                body.msg
            )));
        }

        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_envelope_parses() {
        let body: DirectoryResponse = serde_json::from_value(serde_json::json!({
            "error": false,
            "msg": "countries and cities retrieved",
            "data": [
                {"country": "Canada", "cities": ["Ottawa", "Toronto"]},
                {"country": "Spain", "cities": ["Barcelona", "Madrid"]}
            ]
        }))
        .unwrap();

        assert!(!body.error);
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0].country, "Canada");
        assert_eq!(body.data[1].cities[0], "Barcelona");
    }
}
