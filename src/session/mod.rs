//! Planning session: state, transitions and change notification
//!
//! [`SessionStore`] is the single source of truth for one planning
//! interaction. Network work happens elsewhere; results come back as
//! [`Completion`] events that the store applies synchronously after
//! checking the generation token they were issued under.

pub mod events;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::dates::DateRange;
use crate::formatter::ThemeMode;
use crate::location_search::LocationSearch;
use crate::models::{Location, PlaceResult, PlanResult, WeatherDay};
use crate::url_params::UrlParams;

pub use events::{
    Completion, CompletionPayload, SearchTicket, SessionEvent, SubmissionTicket, WeatherTicket,
};
pub use store::SessionStore;

/// Where a session stands with respect to plan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No location selected
    Empty,
    /// Location selected, no dates picked yet
    LocationSet,
    /// Location selected and dates picked, but not yet ready to submit
    RangePending,
    /// Location, finalized dates and purpose present; submission allowed
    Ready,
    /// A plan request is outstanding
    Generating,
    /// Plan text arrived
    Completed,
    /// Plan request failed; fallback text stored
    Failed,
}

/// Full in-memory state of one planning interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub location: Option<Location>,
    pub search: LocationSearch,
    pub dates: DateRange,
    pub purpose: String,
    pub weather: Vec<WeatherDay>,
    pub places: Vec<PlaceResult>,
    pub plan: Option<PlanResult>,
    pub loading: bool,
    pub places_visible: bool,
    pub weather_visible: bool,
    pub theme: ThemeMode,
    pub url: UrlParams,
}

impl Session {
    /// Derive the state-machine state from the stored entities
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.loading {
            return SessionState::Generating;
        }
        if let Some(plan) = &self.plan {
            return if plan.is_fallback() {
                SessionState::Failed
            } else {
                SessionState::Completed
            };
        }
        match &self.location {
            None => SessionState::Empty,
            Some(_) if self.dates.finalized && !self.purpose.trim().is_empty() => {
                SessionState::Ready
            }
            Some(_) if self.dates.is_selected() => SessionState::RangePending,
            Some(_) => SessionState::LocationSet,
        }
    }

    /// Raw text of the active plan, if any
    #[must_use]
    pub fn plan_text(&self) -> Option<&str> {
        self.plan.as_ref().map(PlanResult::text)
    }

    /// Coordinates for request construction: the selected location's, or
    /// the ones carried over on the URL
    #[must_use]
    pub fn request_coordinates(&self) -> Option<(f64, f64)> {
        self.location
            .as_ref()
            .map(|location| (location.latitude, location.longitude))
            .or_else(|| self.url.coordinates())
    }

    /// Query string mirroring the session
    #[must_use]
    pub fn query_string(&self) -> String {
        self.url.to_query_string()
    }
}
