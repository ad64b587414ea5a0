//! External service boundary
//!
//! Each service the planner talks to sits behind an `async_trait` so the
//! orchestrator can be driven by in-memory fakes. The HTTP implementations
//! share one `reqwest::Client`. No request is ever retried.

pub mod geocoding;
pub mod places;
pub mod plan;
pub mod weather;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServicesConfig;
use crate::error::TripPlannerError;
use crate::models::{Location, PlaceResult, PlanRequest, PlanResult, WeatherDay};
use crate::Result;

pub use geocoding::NominatimGeocoder;
pub use places::BackendPlaces;
pub use plan::BackendPlanGenerator;
pub use weather::BackendWeather;

/// Free-text destination search
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for `query`; an empty list means nothing matched
    async fn search(&self, query: &str) -> Result<Vec<Location>>;
}

/// Points of interest near a coordinate
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn nearby(&self, lat: f64, lon: f64) -> Result<Vec<PlaceResult>>;
}

/// Daily forecast for a date window
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(
        &self,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeatherDay>>;
}

/// Packing recommendation generator.
///
/// Infallible by contract: failures come back as [`PlanResult::Fallback`].
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &PlanRequest) -> PlanResult;
}

/// The four services a planning session depends on
#[derive(Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub places: Arc<dyn PlacesProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub planner: Arc<dyn PlanGenerator>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl Services {
    /// HTTP-backed services built from configuration
    pub fn from_config(config: &ServicesConfig) -> Result<Self> {
        let client = build_client(config)?;
        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::new(client.clone(), &config.geocoding_url)),
            places: Arc::new(BackendPlaces::new(client.clone(), &config.backend_url)),
            weather: Arc::new(BackendWeather::new(client.clone(), &config.backend_url)),
            planner: Arc::new(BackendPlanGenerator::new(client, &config.backend_url)),
        })
    }
}

/// Shared HTTP client with the configured timeout and user agent
pub fn build_client(config: &ServicesConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| TripPlannerError::config(format!("Failed to create HTTP client: {e}")))
}

/// GET `url` and decode a JSON body, mapping non-success statuses to
/// transport errors
pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: &str, service: &str) -> Result<T> {
    debug!("{} request: {}", service, url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TripPlannerError::transport(format!(
            "{service} returned {status}: {body}"
        )));
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| TripPlannerError::parse(format!("Unexpected {service} response: {e}")))
}

/// Strip trailing slashes so paths can be appended with `/`
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
