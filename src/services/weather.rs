//! Daily forecast via the planner backend

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{WeatherProvider, get_json, normalize_base_url};
use crate::models::WeatherDay;
use crate::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub days: Vec<ForecastDayWire>,
}

/// One day of the backend forecast; missing or null measurements decode
/// as zero
#[derive(Debug, Deserialize)]
pub struct ForecastDayWire {
    pub datetime: NaiveDate,
    pub conditions: Option<String>,
    pub description: Option<String>,
    pub tempmin: Option<f64>,
    pub tempmax: Option<f64>,
    pub feelslike: Option<f64>,
    pub humidity: Option<f64>,
    pub precipprob: Option<f64>,
    pub cloudcover: Option<f64>,
    pub windspeed: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub icon: Option<String>,
}

impl From<ForecastDayWire> for WeatherDay {
    fn from(day: ForecastDayWire) -> Self {
        Self {
            date: day.datetime,
            description: day.description.unwrap_or_default(),
            conditions: day.conditions.unwrap_or_default(),
            temp_min: day.tempmin.unwrap_or_default(),
            temp_max: day.tempmax.unwrap_or_default(),
            feels_like: day.feelslike.unwrap_or_default(),
            humidity: day.humidity.unwrap_or_default(),
            precip_probability: day.precipprob.unwrap_or_default(),
            cloud_cover: day.cloudcover.unwrap_or_default(),
            wind_speed: day.windspeed.unwrap_or_default(),
            sunrise: day.sunrise.unwrap_or_default(),
            sunset: day.sunset.unwrap_or_default(),
            icon: day.icon,
        }
    }
}

pub struct BackendWeather {
    client: Client,
    base_url: String,
}

impl BackendWeather {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    #[must_use]
    pub fn forecast_url(&self, lat: f64, lon: f64, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/weather?lat={}&lon={}&start={}&end={}",
            self.base_url,
            lat,
            lon,
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        )
    }
}

#[async_trait]
impl WeatherProvider for BackendWeather {
    #[instrument(skip(self))]
    async fn forecast(
        &self,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeatherDay>> {
        let url = self.forecast_url(lat, lon, start, end);
        let response: ForecastResponse = get_json(&self.client, &url, "Weather").await?;
        info!("Received {} forecast days for {} .. {}", response.days.len(), start, end);
        Ok(response.days.into_iter().map(WeatherDay::from).collect())
    }
}
