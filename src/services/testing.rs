//! In-memory services for unit tests

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{Geocoder, PlacesProvider, PlanGenerator, Services, WeatherProvider};
use crate::error::TripPlannerError;
use crate::models::{Location, PlaceResult, PlanRequest, PlanResult, WeatherDay, weather::sample_day};
use crate::Result;

/// Answers immediately. "Atlantis" finds nothing, "offline" fails in
/// transport, places always fail.
pub(crate) struct StaticServices;

#[async_trait]
impl Geocoder for StaticServices {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        match query {
            "Atlantis" => Ok(vec![]),
            "offline" => Err(TripPlannerError::transport("connection refused")),
            _ => Ok(vec![Location::new(query, 35.65, 139.74)]),
        }
    }
}

#[async_trait]
impl PlacesProvider for StaticServices {
    async fn nearby(&self, _lat: f64, _lon: f64) -> Result<Vec<PlaceResult>> {
        Err(TripPlannerError::transport("places backend down"))
    }
}

#[async_trait]
impl WeatherProvider for StaticServices {
    async fn forecast(
        &self,
        _lat: f64,
        _lon: f64,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<WeatherDay>> {
        Ok(vec![sample_day(start, "Clear skies.")])
    }
}

#[async_trait]
impl PlanGenerator for StaticServices {
    async fn generate(&self, request: &PlanRequest) -> PlanResult {
        PlanResult::Generated(format!(
            "* {} days of {}",
            request.day_count, request.weather_description
        ))
    }
}

pub(crate) fn static_services() -> Services {
    let services = Arc::new(StaticServices);
    Services {
        geocoder: services.clone(),
        places: services.clone(),
        weather: services.clone(),
        planner: services,
    }
}
