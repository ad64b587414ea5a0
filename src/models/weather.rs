//! Weather model: one forecast summary per trip day

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weather description sent to the plan generator when no forecast is loaded yet
pub const NO_WEATHER_DESCRIPTION: &str = "No description available";

/// Per-day forecast summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDay {
    /// Calendar day this summary covers
    pub date: NaiveDate,
    /// Free-text description of the day
    pub description: String,
    /// Short conditions label (e.g. "Partially cloudy")
    pub conditions: String,
    /// Minimum temperature in Celsius
    pub temp_min: f64,
    /// Maximum temperature in Celsius
    pub temp_max: f64,
    /// Apparent temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Precipitation probability percentage
    pub precip_probability: f64,
    /// Cloud cover percentage
    pub cloud_cover: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Local sunrise time as reported (HH:MM:SS)
    pub sunrise: String,
    /// Local sunset time as reported (HH:MM:SS)
    pub sunset: String,
    /// Icon name, when the service provides one
    pub icon: Option<String>,
}

impl WeatherDay {
    /// Day heading, e.g. "Sunday, Jun 1"
    #[must_use]
    pub fn format_day(&self) -> String {
        self.date.format("%A, %b %-d").to_string()
    }

    /// Temperature range with unit
    #[must_use]
    pub fn format_temperature_range(&self) -> String {
        format!("{}°C – {}°C", self.temp_min, self.temp_max)
    }

    /// One-line summary used by text renderers
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} | {} | {}% humidity | {}% precipitation | sunrise {} | sunset {}",
            self.format_day(),
            self.description,
            self.format_temperature_range(),
            self.humidity,
            self.precip_probability,
            self.sunrise,
            self.sunset
        )
    }
}

/// Weather description for a plan request: the first day's description,
/// or a fixed placeholder when no forecast has arrived
#[must_use]
pub fn weather_description(days: &[WeatherDay]) -> String {
    days.first()
        .map(|day| day.description.trim())
        .filter(|description| !description.is_empty())
        .unwrap_or(NO_WEATHER_DESCRIPTION)
        .to_string()
}

#[cfg(test)]
pub(crate) fn sample_day(date: NaiveDate, description: &str) -> WeatherDay {
    WeatherDay {
        date,
        description: description.to_string(),
        conditions: "Clear".to_string(),
        temp_min: 18.0,
        temp_max: 24.5,
        feels_like: 23.0,
        humidity: 60.0,
        precip_probability: 10.0,
        cloud_cover: 20.0,
        wind_speed: 12.0,
        sunrise: "04:25:00".to_string(),
        sunset: "18:52:00".to_string(),
        icon: Some("clear-day".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn test_weather_description_uses_first_day() {
        let days = vec![
            sample_day(june(1), "Sunny all day."),
            sample_day(june(2), "Rain in the afternoon."),
        ];
        assert_eq!(weather_description(&days), "Sunny all day.");
    }

    #[test]
    fn test_weather_description_placeholder() {
        assert_eq!(weather_description(&[]), NO_WEATHER_DESCRIPTION);
        let blank = vec![sample_day(june(1), "  ")];
        assert_eq!(weather_description(&blank), NO_WEATHER_DESCRIPTION);
    }

    #[test]
    fn test_format_day_and_summary() {
        let day = sample_day(june(1), "Clear conditions throughout the day.");
        assert_eq!(day.format_day(), "Sunday, Jun 1");
        assert_eq!(day.format_temperature_range(), "18°C – 24.5°C");
        assert!(day.summary_line().contains("60% humidity"));
        assert!(day.summary_line().contains("sunset 18:52:00"));
    }
}
