//! Periodically refreshed current conditions for a fixed set of cities.
//!
//! Independent of the search pipeline: the panel never touches the watchlist
//! or the search state.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::watch,
    task::{JoinHandle, JoinSet},
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
    config::PanelCity,
    error::WeatherError,
    model::CurrentConditions,
    normalize::normalize,
    orchestrator::{Clock, SystemClock},
    provider::ForecastClient,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReading {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    pub is_day: bool,
    pub observed_at_local: NaiveDateTime,
}

impl PanelReading {
    fn new(city: &PanelCity, current: &CurrentConditions) -> Self {
        Self {
            name: city.name.clone(),
            latitude: city.latitude,
            longitude: city.longitude,
            temperature_c: current.temperature_c,
            feels_like_c: current.feels_like_c,
            wind_speed_kmh: current.wind_speed_kmh,
            weather_code: current.weather_code,
            is_day: current.is_day,
            observed_at_local: current.observed_at_local,
        }
    }
}

/// Last published panel contents. A failed refresh keeps the previous
/// readings and sets `error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub readings: Vec<PanelReading>,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CityPanel {
    forecast: Arc<dyn ForecastClient>,
    cities: Vec<PanelCity>,
    clock: Arc<dyn Clock>,
}

impl CityPanel {
    pub fn new(forecast: Arc<dyn ForecastClient>, cities: Vec<PanelCity>) -> Self {
        Self {
            forecast,
            cities,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch every city concurrently. Any failure fails the whole refresh;
    /// readings come back in configured order.
    pub async fn refresh(&self) -> Result<Vec<PanelReading>, WeatherError> {
        let mut tasks = JoinSet::new();
        for (index, city) in self.cities.iter().cloned().enumerate() {
            let forecast = Arc::clone(&self.forecast);
            tasks.spawn(async move {
                let raw = forecast.fetch_forecast(city.latitude, city.longitude).await;
                (index, city, raw)
            });
        }

        let now = self.clock.now();
        let mut readings: Vec<Option<PanelReading>> = vec![None; self.cities.len()];

        while let Some(joined) = tasks.join_next().await {
            let (index, city, raw) = joined
                .map_err(|e| WeatherError::Transport(format!("Panel fetch task failed: {e}")))?;
            let snapshot = normalize(&raw?, &city.name, now)?;
            readings[index] = Some(PanelReading::new(&city, &snapshot.current));
        }

        Ok(readings.into_iter().flatten().collect())
    }

    /// Refresh now and then every `interval`, publishing on a watch channel.
    pub fn spawn(self, interval: Duration) -> PanelHandle {
        let (tx, rx) = watch::channel(PanelState::default());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let result = self.refresh().await;

                let mut state = tx.borrow().clone();
                match result {
                    Ok(readings) => {
                        info!(cities = readings.len(), "Panel refreshed");
                        state.readings = readings;
                        state.error = None;
                        state.refreshed_at = Some(self.clock.now());
                    }
                    Err(err) => {
                        warn!(error = %err, "Panel refresh failed");
                        state.error = Some(err.to_string());
                    }
                }

                if tx.send(state).is_err() {
                    debug!("Panel receivers gone, stopping refresh");
                    break;
                }
            }
        });

        PanelHandle { receiver: rx, task }
    }
}

/// Owns the refresh task; dropping the handle stops it.
#[derive(Debug)]
pub struct PanelHandle {
    receiver: watch::Receiver<PanelState>,
    task: JoinHandle<()>,
}

impl PanelHandle {
    pub fn latest(&self) -> PanelState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published state.
    pub async fn changed(&mut self) -> Option<PanelState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
