use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{Config, error::WeatherError, model::GeoResult, provider::truncate_body};

use super::GeocodingResolver;

/// Open-Meteo geocoding search, best match only.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    base_url: String,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.geocoding_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingPlace>,
}

#[derive(Debug, Deserialize)]
struct GeocodingPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[async_trait]
impl GeocodingResolver for OpenMeteoGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<GeoResult, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::NotFound("empty query".to_string()));
        }

        let url = format!("{}/search", self.base_url);
        debug!(url = %url, "Resolving place name");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", query),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Transport(format!("Geocoding request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::from_reqwest)?;

        if !status.is_success() {
            return Err(WeatherError::NotFound(format!(
                "Geocoding request for '{query}' failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: GeocodingResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedPayload(format!("Invalid geocoding JSON: {e}")))?;

        let place = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(format!("No place matches '{query}'")))?;

        let geo = GeoResult::new(
            place.latitude,
            place.longitude,
            &place.name,
            place.country.as_deref(),
        );
        debug!(name = %geo.display_name, lat = geo.latitude, lon = geo.longitude, "Resolved place");

        Ok(geo)
    }
}
