//! Data models for the trip planner
//!
//! This module contains the domain models organized by concern:
//! - Location: a confirmed geocoded destination
//! - Weather: per-day forecast summaries for the trip window
//! - Place: nearby points of interest
//! - Plan: the generation request and its result

pub mod location;
pub mod place;
pub mod plan;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Location;
pub use place::PlaceResult;
pub use plan::{PlanRequest, PlanResult};
pub use weather::WeatherDay;
