//! Location resolution workflow
//!
//! Free-text query in, confirmed [`Location`] out. The search action is
//! disabled while a request is outstanding, so at most one geocoding call
//! runs per submission.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TripPlannerError;
use crate::models::Location;
use crate::Result;

/// Message surfaced when the geocoder finds nothing
pub const NOT_FOUND_MESSAGE: &str = "Location not found!";

/// Message surfaced for any other search failure
pub const FAILURE_MESSAGE: &str = "Failed to fetch data";

/// Search box state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearch {
    /// Current free-text query
    pub query: String,
    /// Candidates of the last successful search
    pub candidates: Vec<Location>,
    /// Whether the candidate list is presented for selection
    pub candidates_open: bool,
    /// A geocoding request is outstanding
    pub searching: bool,
    /// Last user-visible search error
    pub error: Option<String>,
}

impl LocationSearch {
    /// Replace the query text
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    /// Whether the search action is currently enabled
    #[must_use]
    pub fn can_search(&self) -> bool {
        !self.searching && !self.query.trim().is_empty()
    }

    /// Mark a search as outstanding and return the query to send
    pub fn begin(&mut self) -> Result<String> {
        if self.searching {
            return Err(TripPlannerError::validation(
                "A location search is already in progress.",
            ));
        }
        let query = self.query.trim();
        if query.is_empty() {
            return Err(TripPlannerError::validation("Please enter a location to search."));
        }
        self.searching = true;
        self.error = None;
        Ok(query.to_string())
    }

    /// Apply the geocoder's answer.
    ///
    /// Zero results clear the query and surface a not-found error; transport
    /// failures surface a generic failure. Either way the search action is
    /// enabled again.
    pub fn finish(&mut self, outcome: Result<Vec<Location>>) -> Result<usize> {
        self.searching = false;
        match outcome {
            Ok(candidates) if !candidates.is_empty() => {
                debug!("Presenting {} location candidates", candidates.len());
                let count = candidates.len();
                self.candidates = candidates;
                self.candidates_open = true;
                Ok(count)
            }
            Ok(_) | Err(TripPlannerError::NotFound { .. }) => {
                self.close_with_error(NOT_FOUND_MESSAGE);
                self.query.clear();
                Err(TripPlannerError::not_found(NOT_FOUND_MESSAGE))
            }
            Err(e) => {
                warn!("Location search failed: {}", e);
                self.close_with_error(FAILURE_MESSAGE);
                Err(e)
            }
        }
    }

    /// Pick a presented candidate; closes the candidate presentation
    pub fn select(&mut self, index: usize) -> Result<Location> {
        if !self.candidates_open {
            return Err(TripPlannerError::validation("No search results to choose from."));
        }
        let location = self.candidates.get(index).cloned().ok_or_else(|| {
            TripPlannerError::validation(format!(
                "Search result {} does not exist ({} available).",
                index,
                self.candidates.len()
            ))
        })?;
        self.candidates.clear();
        self.candidates_open = false;
        self.query.clear();
        Ok(location)
    }

    /// Close the candidate presentation without choosing
    pub fn dismiss(&mut self) {
        self.candidates_open = false;
    }

    fn close_with_error(&mut self, message: &str) {
        self.candidates.clear();
        self.candidates_open = false;
        self.error = Some(message.to_string());
    }
}
