use crate::{
    Config,
    error::WeatherError,
    model::{GeoResult, RawForecastPayload},
    provider::{forecast::OpenMeteoForecastClient, geocoding::OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod forecast;
pub mod geocoding;

/// Free-text place name to best-match coordinates.
#[async_trait]
pub trait GeocodingResolver: Send + Sync + Debug {
    /// `query` is expected to be trimmed and non-empty.
    async fn resolve(&self, query: &str) -> Result<GeoResult, WeatherError>;
}

/// Coordinates to the raw provider forecast.
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawForecastPayload, WeatherError>;
}

/// Both Open-Meteo clients, built from the same config.
#[derive(Debug, Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn GeocodingResolver>,
    pub forecast: Arc<dyn ForecastClient>,
}

impl Providers {
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let http = build_http_client(config.request_timeout())?;

        Ok(Self {
            geocoder: Arc::new(OpenMeteoGeocoder::new(http.clone(), config)),
            forecast: Arc::new(OpenMeteoForecastClient::new(http, config)),
        })
    }
}

pub(crate) fn build_http_client(
    timeout: Option<Duration>,
) -> Result<reqwest::Client, WeatherError> {
    let user_agent = concat!("citycast/", env!("CARGO_PKG_VERSION"));
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| WeatherError::Transport(format!("Failed to build HTTP client: {e}")))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
