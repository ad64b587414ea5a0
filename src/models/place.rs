//! Nearby point of interest

use serde::{Deserialize, Serialize};

/// A landmark near the destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResult {
    pub id: String,
    pub name: String,
    pub address: String,
    /// URL of the category icon, if the place has a category
    pub category_icon: Option<String>,
}
