//! Nearby places via the planner backend

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{PlacesProvider, get_json, normalize_base_url};
use crate::models::PlaceResult;
use crate::Result;

/// Size segment inserted between an icon's prefix and suffix
const ICON_SIZE: &str = "bg_64";

#[derive(Debug, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub results: Vec<PlaceWire>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceWire {
    pub fsq_place_id: String,
    pub name: String,
    #[serde(default)]
    pub location: PlaceLocationWire,
    #[serde(default)]
    pub categories: Vec<CategoryWire>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceLocationWire {
    pub formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryWire {
    pub name: Option<String>,
    pub icon: Option<IconWire>,
}

#[derive(Debug, Deserialize)]
pub struct IconWire {
    pub prefix: String,
    pub suffix: String,
}

impl From<PlaceWire> for PlaceResult {
    fn from(place: PlaceWire) -> Self {
        let category_icon = place
            .categories
            .first()
            .and_then(|category| category.icon.as_ref())
            .map(|icon| format!("{}{}{}", icon.prefix, ICON_SIZE, icon.suffix));

        Self {
            id: place.fsq_place_id,
            name: place.name,
            address: place.location.formatted_address.unwrap_or_default(),
            category_icon,
        }
    }
}

pub struct BackendPlaces {
    client: Client,
    base_url: String,
}

impl BackendPlaces {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    #[must_use]
    pub fn places_url(&self, lat: f64, lon: f64) -> String {
        format!("{}/places?lat={}&lon={}", self.base_url, lat, lon)
    }
}

#[async_trait]
impl PlacesProvider for BackendPlaces {
    #[instrument(skip(self))]
    async fn nearby(&self, lat: f64, lon: f64) -> Result<Vec<PlaceResult>> {
        let response: PlacesResponse =
            get_json(&self.client, &self.places_url(lat, lon), "Places").await?;
        info!("Found {} places near ({:.4}, {:.4})", response.results.len(), lat, lon);
        Ok(response.results.into_iter().map(PlaceResult::from).collect())
    }
}
