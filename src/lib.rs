//! `trip-planner` - destination, dates and purpose in; packing list out
//!
//! This library provides the planning session state machine, the
//! orchestration of its weather, places and plan-generation requests, and
//! the formatting and export of the generated packing list.

pub mod api;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod formatter;
pub mod location_search;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod purpose;
pub mod services;
pub mod session;
pub mod url_params;
pub mod web;

// Re-export core types for public API
pub use config::TripPlannerConfig;
pub use dates::DateRange;
pub use error::TripPlannerError;
pub use formatter::{ContentBlock, ThemeMode};
pub use models::{Location, PlaceResult, PlanRequest, PlanResult, WeatherDay};
pub use orchestrator::{PendingRequests, TripPlanner};
pub use services::Services;
pub use session::{Session, SessionEvent, SessionState, SessionStore};
pub use url_params::UrlParams;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
