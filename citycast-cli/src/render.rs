//! Plain-text rendering. All rounding happens here, never in the core.

use std::fmt;

use citycast_core::{CityEntry, PanelState, WeatherCondition, WeatherSnapshot, panel::PanelReading};

/// Current conditions, the next hours and the 7-day outlook.
pub struct Snapshot<'a>(pub &'a WeatherSnapshot);

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = &self.0.current;
        let condition = WeatherCondition::from_wmo_code(current.weather_code);
        let icon = condition.icon(current.is_day);
        let name = &current.name;
        let observed = current.observed_at_local.format("%H:%M");
        let temperature = current.temperature_c;
        let rain = current.chance_of_rain * 100.0;
        let feels = current.feels_like_c;
        let wind = current.wind_speed_kmh;
        let uv = current.uv_index;

        writeln!(f, "{icon} {name}  {observed}")?;
        writeln!(f, "  {temperature:.0}°  {condition}")?;
        writeln!(f, "  Chance of rain {rain:.0}%")?;
        write!(f, "  Feels like {feels:.0}°  Wind {wind:.1} km/h")?;
        write!(f, "  UV {uv:.0}")?;

        if !self.0.hourly.is_empty() {
            f.write_str("\n\nNext hours")?;
            for hour in &self.0.hourly {
                let condition = WeatherCondition::from_wmo_code(hour.weather_code);
                let icon = condition.icon(current.is_day);
                let time = hour.time_local.format("%H:%M");
                let temperature = hour.temperature_c;
                write!(f, "\n  {time}  {icon}  {temperature:>3.0}°")?;
            }
        }

        if !self.0.daily.is_empty() {
            f.write_str("\n\n7-day forecast")?;
            for day in &self.0.daily {
                let condition = WeatherCondition::from_wmo_code(day.weather_code);
                let label = day.day_label.as_str();
                let icon = condition.icon(true);
                let description = condition.description();
                let high = day.high_c;
                let low = day.low_c;
                let rain = day.precipitation_probability * 100.0;
                write!(f, "\n  {label:<6} {icon}  {description:<13} ")?;
                write!(f, "{high:>3.0}/{low:<3.0} {rain:>3.0}%")?;
            }
        }

        Ok(())
    }
}

/// The watchlist, with the active city marked.
pub struct Watchlist<'a>(pub &'a [CityEntry]);

impl fmt::Display for Watchlist<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Watchlist")?;
        for entry in self.0 {
            let condition = WeatherCondition::from_wmo_code(entry.weather_code);
            let icon = condition.icon(true);
            let marker = if entry.active { "▲" } else { " " };
            let name = &entry.name;
            let time = &entry.time;
            let temperature = entry.temperature;
            write!(f, "\n {marker} {icon} {name:<24}")?;
            write!(f, " {time}  {temperature:>3.0}°")?;
        }
        Ok(())
    }
}

pub struct PanelReadings<'a>(pub &'a [PanelReading]);

impl fmt::Display for PanelReadings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cities", self.0.len())?;
        for reading in self.0 {
            let condition = WeatherCondition::from_wmo_code(reading.weather_code);
            let icon = condition.icon(reading.is_day);
            let name = &reading.name;
            let time = reading.observed_at_local.format("%H:%M");
            let temperature = reading.temperature_c;
            let feels = reading.feels_like_c;
            let wind = reading.wind_speed_kmh;
            write!(f, "\n  {icon} {name:<12} {time}  {temperature:>3.0}°")?;
            write!(f, "  feels {feels:.0}°  wind {wind:.1} km/h")?;
        }
        Ok(())
    }
}

/// A published panel state; a failed refresh shows its error above the kept readings.
pub struct Panel<'a>(pub &'a PanelState);

impl fmt::Display for Panel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.0.error {
            writeln!(f, "Panel refresh failed: {error}")?;
        }
        write!(f, "{}", PanelReadings(&self.0.readings))
    }
}
