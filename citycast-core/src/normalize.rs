//! Conversion of the raw Open-Meteo payload into a [`WeatherSnapshot`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::{
    error::WeatherError,
    model::{
        CurrentConditions, DailyPoint, DayLabel, HourlyPoint, RawCurrent, RawDaily,
        RawForecastPayload, RawHourly, WeatherSnapshot,
    },
};

pub const HOURLY_WINDOW: usize = 6;
pub const DAILY_WINDOW: usize = 7;

const MS_TO_KMH: f64 = 3.6;

/// Indexed by day of week, 0 = Sunday.
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Build the canonical snapshot for `city_name` as seen at `now`.
///
/// Fails with [`WeatherError::MalformedPayload`] before building anything if
/// a section is missing or inconsistent, so callers never see a partial
/// snapshot.
pub fn normalize(
    raw: &RawForecastPayload,
    city_name: &str,
    now: DateTime<Utc>,
) -> Result<WeatherSnapshot, WeatherError> {
    let current = raw.current.as_ref().ok_or_else(|| missing("current"))?;
    let hourly = raw
        .hourly
        .as_ref()
        .filter(|h| !h.time.is_empty())
        .ok_or_else(|| missing("hourly"))?;
    let daily = raw
        .daily
        .as_ref()
        .filter(|d| !d.time.is_empty())
        .ok_or_else(|| missing("daily"))?;

    // Provider timestamps are wall-clock times at the location.
    let offset = Duration::seconds(i64::from(raw.utc_offset_seconds.unwrap_or(0)));
    let now_local = (now + offset).naive_utc();

    let hourly = normalize_hourly(hourly, now_local)?;
    let daily = normalize_daily(daily)?;
    let chance_of_rain = daily.first().map_or(0.0, |d| d.precipitation_probability);

    Ok(WeatherSnapshot {
        current: normalize_current(current, city_name, now_local, chance_of_rain),
        hourly,
        daily,
    })
}

fn normalize_current(
    current: &RawCurrent,
    city_name: &str,
    observed_at_local: NaiveDateTime,
    chance_of_rain: f64,
) -> CurrentConditions {
    CurrentConditions {
        name: city_name.to_string(),
        temperature_c: current.temperature_2m,
        feels_like_c: current.apparent_temperature,
        wind_speed_kmh: current.wind_speed_10m * MS_TO_KMH,
        uv_index: current.uv_index,
        weather_code: current.weather_code,
        is_day: current.is_day != 0,
        observed_at_local,
        chance_of_rain,
    }
}

fn normalize_hourly(
    hourly: &RawHourly,
    now_local: NaiveDateTime,
) -> Result<Vec<HourlyPoint>, WeatherError> {
    let times = hourly
        .time
        .iter()
        .map(|t| parse_local_datetime(t))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(start) = times.iter().position(|t| *t > now_local) else {
        return Ok(Vec::new());
    };

    times
        .iter()
        .enumerate()
        .skip(start)
        .take(HOURLY_WINDOW)
        .map(|(i, time_local)| {
            Ok(HourlyPoint {
                time_local: *time_local,
                temperature_c: value_at(&hourly.temperature_2m, i, "hourly.temperature_2m")?,
                weather_code: value_at(&hourly.weather_code, i, "hourly.weather_code")?,
            })
        })
        .collect()
}

fn normalize_daily(daily: &RawDaily) -> Result<Vec<DailyPoint>, WeatherError> {
    daily
        .time
        .iter()
        .take(DAILY_WINDOW)
        .enumerate()
        .map(|(i, raw_date)| {
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
                .map_err(|e| {
                    WeatherError::MalformedPayload(format!("Invalid date '{raw_date}': {e}"))
                })?;

            let day_label = if i == 0 {
                DayLabel::Today
            } else {
                DayLabel::Weekday(WEEKDAYS[date.weekday().num_days_from_sunday() as usize])
            };

            let percent = daily
                .precipitation_probability_max
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(0.0);

            Ok(DailyPoint {
                date,
                day_label,
                high_c: value_at(&daily.temperature_2m_max, i, "daily.temperature_2m_max")?,
                low_c: value_at(&daily.temperature_2m_min, i, "daily.temperature_2m_min")?,
                weather_code: value_at(&daily.weather_code, i, "daily.weather_code")?,
                precipitation_probability: percent / 100.0,
            })
        })
        .collect()
}

fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| WeatherError::MalformedPayload(format!("Invalid datetime format: {s}")))
}

fn value_at<T: Copy>(series: &[T], index: usize, field: &str) -> Result<T, WeatherError> {
    series.get(index).copied().ok_or_else(|| {
        let len = series.len();
        let message = format!("{field} has {len} values, needed index {index}");
        WeatherError::MalformedPayload(message)
    })
}

fn missing(section: &str) -> WeatherError {
    WeatherError::MalformedPayload(format!("No {section} data in response"))
}
