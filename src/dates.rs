//! Date range validation
//!
//! Pure constraint logic over a start/end pair. The weather service's free
//! tier only covers short windows, so a raw span of 15 days or more is never
//! allowed to stand.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Smallest raw day difference that is rejected
pub const MAX_SPAN_DAYS: i64 = 15;

/// Warning surfaced when a range is too long
pub const SPAN_WARNING: &str = "Due to free tier limitations, you can only select up to 15 days.";

/// Warning surfaced when the end precedes the start
pub const ORDER_WARNING: &str = "The end date must not be before the start date.";

/// Outcome of validating a start/end pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub accepted: bool,
    pub day_count: u32,
}

impl Validation {
    fn rejected() -> Self {
        Self {
            accepted: false,
            day_count: 0,
        }
    }
}

/// Validate a date pair. The day count is inclusive of both endpoints.
#[must_use]
pub fn validate(start: NaiveDate, end: NaiveDate) -> Validation {
    let difference = (end - start).num_days();
    if !(0..MAX_SPAN_DAYS).contains(&difference) {
        return Validation::rejected();
    }
    Validation {
        accepted: true,
        // bounded by MAX_SPAN_DAYS
        day_count: difference as u32 + 1,
    }
}

/// Warning text for a rejected pair
#[must_use]
pub fn rejection_warning(start: NaiveDate, end: NaiveDate) -> &'static str {
    if end < start { ORDER_WARNING } else { SPAN_WARNING }
}

/// Travel window of a session.
///
/// `day_count` is derived from the endpoints and is either 0 or
/// `end - start + 1`. A range only becomes `finalized` through an explicit
/// confirmation and stays so until [`DateRange::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub day_count: u32,
    pub finalized: bool,
}

impl DateRange {
    /// Record a tentative picker selection.
    ///
    /// A complete pair is validated immediately; a rejected pair zeroes the
    /// whole range and returns `false`.
    pub fn select(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        self.start = start;
        self.end = end;
        self.finalized = false;
        match (start, end) {
            (Some(start), Some(end)) => {
                let validation = validate(start, end);
                if validation.accepted {
                    self.day_count = validation.day_count;
                    true
                } else {
                    self.clear();
                    false
                }
            }
            _ => {
                self.day_count = 0;
                true
            }
        }
    }

    /// Lock a pair as the range used for weather and plan requests
    pub fn finalize(&mut self, start: NaiveDate, end: NaiveDate) -> bool {
        let validation = validate(start, end);
        if !validation.accepted {
            self.clear();
            return false;
        }
        self.start = Some(start);
        self.end = Some(end);
        self.day_count = validation.day_count;
        self.finalized = true;
        true
    }

    /// Forget endpoints, count and finalization
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Both endpoints of a finalized range
    #[must_use]
    pub fn finalized_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.finalized, self.start, self.end) {
            (true, Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Whether any endpoint has been picked
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Tentative count label, e.g. "(5 days)", empty until the end is picked
    #[must_use]
    pub fn day_count_label(&self) -> String {
        match self.end {
            Some(_) if self.day_count > 0 => format!("({} days)", self.day_count),
            _ => String::new(),
        }
    }

    /// Range label, e.g. "Jun. 01 2025 – Jun. 05 2025"
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let (start, end) = (self.start?, self.end?);
        Some(format!(
            "{} – {}",
            start.format("%b. %d %Y"),
            end.format("%b. %d %Y")
        ))
    }
}
