//! Nominatim geocoding client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::{info, instrument};

use super::{Geocoder, get_json, normalize_base_url};
use crate::error::TripPlannerError;
use crate::models::Location;
use crate::Result;

/// One search hit as returned by `/search?format=json`
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    #[serde(default)]
    pub osm_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
    #[serde(default)]
    pub address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl From<NominatimResult> for Location {
    fn from(result: NominatimResult) -> Self {
        let NominatimAddress {
            city,
            town,
            village,
            state,
            country,
        } = result.address;

        Self {
            name: result.name,
            display_name: result.display_name,
            city: city.or(town).or(village).unwrap_or_default(),
            region: state.unwrap_or_default(),
            country: country.unwrap_or_default(),
            latitude: result.lat,
            longitude: result.lon,
            id: result.osm_id,
        }
    }
}

/// Nominatim sends coordinates as strings; accept numbers too
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}&addressdetails=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        let results: Vec<NominatimResult> =
            get_json(&self.client, &self.search_url(query), "Geocoding").await?;
        if results.is_empty() {
            return Err(TripPlannerError::not_found(format!("No results for '{query}'")));
        }

        info!("Geocoding found {} candidates for '{}'", results.len(), query);
        Ok(results.into_iter().map(Location::from).collect())
    }
}
