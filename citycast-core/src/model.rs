use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Best geocoding match for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub latitude: f64,
    pub longitude: f64,
    /// "Place, Country" when the provider knows the country, else "Place".
    pub display_name: String,
}

impl GeoResult {
    pub fn new(latitude: f64, longitude: f64, name: &str, country: Option<&str>) -> Self {
        let display_name = match country.map(str::trim).filter(|c| !c.is_empty()) {
            Some(country) => format!("{name}, {country}"),
            None => name.to_string(),
        };

        Self {
            latitude,
            longitude,
            display_name,
        }
    }
}

/// Forecast payload exactly as the provider sent it.
///
/// Every section is optional here; the normalizer decides whether the
/// payload is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawForecastPayload {
    #[serde(default)]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub current: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: Option<RawHourly>,
    #[serde(default)]
    pub daily: Option<RawDaily>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCurrent {
    pub temperature_2m: f64,
    pub apparent_temperature: f64,
    /// m/s, requested with `wind_speed_unit=ms`.
    pub wind_speed_10m: f64,
    pub weather_code: i32,
    #[serde(default)]
    pub uv_index: f64,
    pub is_day: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub weather_code: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub weather_code: Vec<i32>,
    /// Percent; the provider sends `null` past its probability horizon.
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
}

/// Canonical, provider-agnostic weather for one place.
///
/// Built once by [`crate::normalize::normalize`] and never mutated; a new
/// search produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub wind_speed_kmh: f64,
    pub uv_index: f64,
    pub weather_code: i32,
    pub is_day: bool,
    pub observed_at_local: NaiveDateTime,
    /// Today's precipitation probability in [0, 1].
    pub chance_of_rain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub time_local: NaiveDateTime,
    pub temperature_c: f64,
    pub weather_code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub day_label: DayLabel,
    pub high_c: f64,
    pub low_c: f64,
    pub weather_code: i32,
    /// Fraction in [0, 1].
    pub precipitation_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayLabel {
    Today,
    Weekday(&'static str),
}

impl DayLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabel::Today => "Today",
            DayLabel::Weekday(name) => name,
        }
    }
}

impl std::fmt::Display for DayLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
