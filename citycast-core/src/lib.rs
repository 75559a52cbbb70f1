//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Open-Meteo geocoding and forecast clients behind provider traits
//! - Normalization of raw forecasts into a canonical snapshot
//! - The bounded watchlist of recently viewed cities
//! - The search orchestrator tying them together, and a multi-city panel
//!
//! It is used by `citycast-cli`, but can also be reused by other binaries or services.

pub mod condition;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod panel;
pub mod provider;
pub mod watchlist;

#[cfg(test)]
mod test_support;

pub use condition::WeatherCondition;
pub use config::{Config, PanelCity, PanelConfig};
pub use error::WeatherError;
pub use model::{GeoResult, RawForecastPayload, WeatherSnapshot};
pub use orchestrator::{SearchOrchestrator, SearchOutcome, SearchPhase, SearchState};
pub use panel::{CityPanel, PanelHandle, PanelState};
pub use provider::{ForecastClient, GeocodingResolver, Providers};
pub use watchlist::{CityEntry, SharedWatchlist, Watchlist};
