use crate::model::{RawCurrent, RawDaily, RawForecastPayload, RawHourly};

/// Ten hours from 2024-01-15T00:00 local (UTC+1) and two days of daily data.
pub(crate) fn sample_payload(temperature: f64) -> RawForecastPayload {
    RawForecastPayload {
        utc_offset_seconds: Some(3600),
        current: Some(RawCurrent {
            temperature_2m: temperature,
            apparent_temperature: temperature - 1.0,
            wind_speed_10m: 5.0,
            weather_code: 2,
            uv_index: 3.0,
            is_day: 1,
        }),
        hourly: Some(RawHourly {
            time: (0..10).map(|h| format!("2024-01-15T{h:02}:00")).collect(),
            temperature_2m: (0..10).map(f64::from).collect(),
            weather_code: vec![0; 10],
        }),
        daily: Some(RawDaily {
            time: vec!["2024-01-15".to_string(), "2024-01-16".to_string()],
            temperature_2m_max: vec![20.0, 21.0],
            temperature_2m_min: vec![10.0, 11.0],
            weather_code: vec![1, 61],
            precipitation_probability_max: vec![Some(80.0), Some(20.0)],
        }),
    }
}
