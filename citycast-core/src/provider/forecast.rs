use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::{Config, error::WeatherError, model::RawForecastPayload, provider::truncate_body};

use super::ForecastClient;

const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,wind_speed_10m,weather_code,uv_index,is_day";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max";

/// Open-Meteo forecast endpoint; returns the payload uninterpreted.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecastClient {
    http: Client,
    base_url: String,
    forecast_days: u8,
}

impl OpenMeteoForecastClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.forecast_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days(),
        }
    }

    fn query_params(&self, latitude: f64, longitude: f64) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("temperature_unit", "celsius".to_string()),
            ("wind_speed_unit", "ms".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ]
    }
}

#[async_trait]
impl ForecastClient for OpenMeteoForecastClient {
    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawForecastPayload, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        debug!(url = %url, days = self.forecast_days, "Fetching forecast");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(latitude, longitude))
            .send()
            .await
            .map_err(|e| WeatherError::Transport(format!("Forecast request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::from_reqwest)?;

        if !status.is_success() {
            return Err(WeatherError::Transport(format!(
                "Forecast request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedPayload(format!("Invalid forecast JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_requests_all_consumed_fields() {
        let client = OpenMeteoForecastClient::new(Client::new(), &Config::default());
        let params = client.query_params(-11.67, 27.47);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("latitude"), Some("-11.67"));
        assert_eq!(get("longitude"), Some("27.47"));
        assert_eq!(get("wind_speed_unit"), Some("ms"));
        assert_eq!(get("forecast_days"), Some("7"));

        let current = get("current").unwrap_or_default();
        assert!(current.contains("uv_index") && current.contains("is_day"));
        let daily = get("daily").unwrap_or_default();
        assert!(daily.contains("precipitation_probability_max"));
    }

    #[test]
    fn forecast_days_are_clamped() {
        let config = Config {
            forecast_days: 0,
            ..Config::default()
        };
        let client = OpenMeteoForecastClient::new(Client::new(), &config);
        assert_eq!(client.forecast_days, 1);
    }
}
