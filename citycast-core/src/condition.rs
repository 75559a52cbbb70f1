//! Coarse WMO code buckets for presentation.
//!
//! The canonical snapshot only carries raw codes; renderers use this to pick
//! a label and an icon.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// See: <https://open-meteo.com/en/docs> for the WMO code table.
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            i32::MIN..=1 => Self::Clear,
            2..=3 => Self::Cloudy,
            4..=48 => Self::Fog,
            49..=65 => Self::Rain,
            66..=75 => Self::Snow,
            76..=99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    pub fn icon(&self, is_day: bool) -> &'static str {
        match self {
            Self::Clear if is_day => "☀️",
            Self::Clear => "🌙",
            Self::Cloudy => "☁️",
            Self::Fog => "🌫️",
            Self::Rain => "🌧️",
            Self::Snow => "❄️",
            Self::Thunderstorm => "⛈️",
            Self::Unknown => "❓",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
