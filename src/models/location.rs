//! Location model for a selected destination

use serde::{Deserialize, Serialize};

/// A destination picked from geocoding search results.
///
/// Immutable once selected; the session replaces or clears it as a whole.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Short name (landmark, city, ...)
    pub name: String,
    /// Full human-readable name as returned by the geocoder
    pub display_name: String,
    /// City, town or village
    pub city: String,
    /// State or region
    pub region: String,
    /// Country name
    pub country: String,
    /// Latitude in decimal degrees
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Geocoder object id
    pub id: u64,
}

impl Location {
    /// Create a location with only a name and coordinates
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            city: String::new(),
            region: String::new(),
            country: String::new(),
            latitude,
            longitude,
            id: 0,
        }
    }

    /// Sentence describing the destination for the plan generator
    #[must_use]
    pub fn destination_description(&self) -> String {
        format!(
            "the {} located at {}, {}, {}",
            self.name, self.city, self.region, self.country
        )
    }

    /// Label shown for the selected destination: the short name, or the
    /// first part of the display name when the geocoder gave none
    #[must_use]
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.display_name
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
