//! Session notifications and asynchronous completions

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{PlaceResult, PlanRequest, PlanResult, WeatherDay};

use super::SessionState;

/// Change notification published to store subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    SearchQueryChanged { query: String },
    SearchStarted { query: String },
    SearchCompleted { candidates: usize },
    SearchFailed { message: String },
    LocationSelected { name: String, lat: f64, lon: f64 },
    LocationCleared,
    DatesSelected { day_count: u32 },
    DatesConfirmed { start: NaiveDate, end: NaiveDate, day_count: u32 },
    DatesCleared,
    PurposeChanged { purpose: String },
    /// User-visible warning for a rejected input
    Warning { message: String },
    WeatherLoaded { days: usize },
    PlacesLoaded { count: usize },
    PlanRequested { generation: u64 },
    PlanFinished { state: SessionState },
    PlanCleared,
    PanelsChanged { places_visible: bool, weather_visible: bool },
    /// A result arrived for a request that no longer matches the session
    StaleResultDiscarded { generation: u64 },
    Reset { generation: u64 },
}

impl SessionEvent {
    /// Short name used in log lines
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SearchQueryChanged { .. } => "search_query_changed",
            SessionEvent::SearchStarted { .. } => "search_started",
            SessionEvent::SearchCompleted { .. } => "search_completed",
            SessionEvent::SearchFailed { .. } => "search_failed",
            SessionEvent::LocationSelected { .. } => "location_selected",
            SessionEvent::LocationCleared => "location_cleared",
            SessionEvent::DatesSelected { .. } => "dates_selected",
            SessionEvent::DatesConfirmed { .. } => "dates_confirmed",
            SessionEvent::DatesCleared => "dates_cleared",
            SessionEvent::PurposeChanged { .. } => "purpose_changed",
            SessionEvent::Warning { .. } => "warning",
            SessionEvent::WeatherLoaded { .. } => "weather_loaded",
            SessionEvent::PlacesLoaded { .. } => "places_loaded",
            SessionEvent::PlanRequested { .. } => "plan_requested",
            SessionEvent::PlanFinished { .. } => "plan_finished",
            SessionEvent::PlanCleared => "plan_cleared",
            SessionEvent::PanelsChanged { .. } => "panels_changed",
            SessionEvent::StaleResultDiscarded { .. } => "stale_result_discarded",
            SessionEvent::Reset { .. } => "reset",
        }
    }
}

/// An outstanding geocoding search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

/// Everything needed to fetch weather for a freshly finalized range
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTicket {
    pub generation: u64,
    pub lat: f64,
    pub lon: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Everything needed to run the two submission requests
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTicket {
    pub generation: u64,
    /// Sequence number of this submission within the session
    pub submission: u64,
    pub lat: f64,
    pub lon: f64,
    pub request: PlanRequest,
}

/// Result of an asynchronous request, tagged with the generation it was
/// issued under
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub generation: u64,
    pub payload: CompletionPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPayload {
    /// Forecast for the range it was requested for
    Weather {
        start: NaiveDate,
        end: NaiveDate,
        days: Vec<WeatherDay>,
    },
    Places {
        submission: u64,
        places: Vec<PlaceResult>,
    },
    Plan {
        submission: u64,
        plan: PlanResult,
    },
}

impl Completion {
    #[must_use]
    pub fn weather(ticket: &WeatherTicket, days: Vec<WeatherDay>) -> Self {
        Self {
            generation: ticket.generation,
            payload: CompletionPayload::Weather {
                start: ticket.start,
                end: ticket.end,
                days,
            },
        }
    }

    #[must_use]
    pub fn places(ticket: &SubmissionTicket, places: Vec<PlaceResult>) -> Self {
        Self {
            generation: ticket.generation,
            payload: CompletionPayload::Places {
                submission: ticket.submission,
                places,
            },
        }
    }

    #[must_use]
    pub fn plan(ticket: &SubmissionTicket, plan: PlanResult) -> Self {
        Self {
            generation: ticket.generation,
            payload: CompletionPayload::Plan {
                submission: ticket.submission,
                plan,
            },
        }
    }
}
