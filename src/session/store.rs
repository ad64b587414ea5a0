//! Session state store
//!
//! Owns the [`Session`] and exposes the state-machine transitions. Every
//! transition is a discrete, synchronous mutation followed by a
//! [`SessionEvent`] broadcast to subscribers, so a UI layer can react
//! without the store knowing about it.

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::dates::{self, DateRange};
use crate::error::TripPlannerError;
use crate::formatter::ThemeMode;
use crate::models::{Location, PlanRequest, weather::weather_description};
use crate::url_params::UrlParams;
use crate::Result;

use super::events::{
    Completion, CompletionPayload, SearchTicket, SessionEvent, SubmissionTicket, WeatherTicket,
};
use super::{Session, SessionState};

/// Buffered notifications per subscriber before the oldest are dropped
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

pub const MISSING_DESTINATION: &str = "Please enter your destination.";
pub const MISSING_DATES: &str = "Please confirm your travel dates.";
pub const MISSING_FIELDS: &str = "Please fill out all fields.";
pub const LOCATION_LOCKED: &str = "Please clear the selected location first.";

/// Single source of truth for one planning session
#[derive(Debug)]
pub struct SessionStore {
    session: Session,
    /// Bumped on every reset; results issued under an older value are stale
    generation: u64,
    /// Submission whose results may still be applied
    active_submission: Option<u64>,
    submissions: u64,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: Session::default(),
            generation: 0,
            active_submission: None,
            submissions: 0,
            events,
        }
    }

    /// Start a session from URL parameters.
    ///
    /// `start`/`end` become a tentative range and the search box gets the
    /// `location` text. Coordinates stay on the URL for request
    /// construction but do not rebuild a [`Location`].
    #[must_use]
    pub fn hydrate(params: UrlParams) -> Self {
        let mut store = Self::new();
        store.load_params(params);
        store
    }

    /// Reset, then hydrate from URL parameters as a fresh session would
    pub fn restore(&mut self, params: UrlParams) {
        self.reset();
        self.load_params(params);
    }

    fn load_params(&mut self, params: UrlParams) {
        self.session.search.query = params.location.clone().unwrap_or_default();
        self.session.url = params;

        if let Some((start, end)) = self.session.url.dates() {
            if self.session.dates.select(Some(start), Some(end)) {
                debug!(
                    "Hydrated tentative range {} .. {} ({} days)",
                    start, end, self.session.dates.day_count
                );
            } else {
                warn!(
                    "Dropping URL date range {} .. {}: {}",
                    start,
                    end,
                    dates::rejection_warning(start, end)
                );
                self.session.url.clear_dates();
            }
        }
    }

    /// Current session contents
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Owned copy of the session for readers outside the lock
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        debug!(event_type = event.event_type(), generation = self.generation, "SessionStore::notify");
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn reject(&self, message: &str) -> TripPlannerError {
        self.notify(SessionEvent::Warning {
            message: message.to_string(),
        });
        TripPlannerError::validation(message)
    }

    fn ensure_idle(&self, action: &str) -> Result<()> {
        if self.session.loading {
            return Err(self.reject(&format!("Cannot {action} while a plan is being generated.")));
        }
        Ok(())
    }

    /// Inputs changed after a plan exists: drop the plan so the session is
    /// eligible for a new submission
    fn invalidate_plan(&mut self) {
        if self.session.plan.is_some() {
            self.clear_plan_fields();
            self.notify(SessionEvent::PlanCleared);
        }
    }

    fn clear_plan_fields(&mut self) {
        self.session.plan = None;
        self.session.places.clear();
        self.session.places_visible = false;
        self.session.weather_visible = false;
        self.active_submission = None;
    }

    // === Location ===

    /// Edit the destination search text; mirrored to the `location` parameter
    pub fn set_search_query(&mut self, query: &str) -> Result<()> {
        if self.session.location.is_some() {
            return Err(self.reject(LOCATION_LOCKED));
        }
        self.session.search.set_query(query);
        self.session.url.set_location_query(query);
        self.notify(SessionEvent::SearchQueryChanged {
            query: query.to_string(),
        });
        Ok(())
    }

    /// Mark a geocoding search as outstanding
    pub fn begin_location_search(&mut self) -> Result<SearchTicket> {
        if self.session.location.is_some() {
            return Err(self.reject(LOCATION_LOCKED));
        }
        let query = self.session.search.begin()?;
        self.notify(SessionEvent::SearchStarted {
            query: query.clone(),
        });
        Ok(SearchTicket {
            generation: self.generation,
            query,
        })
    }

    /// Apply the geocoder's answer to the search it was issued for
    pub fn finish_location_search(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<Vec<Location>>,
    ) -> Result<usize> {
        if ticket.generation != self.generation {
            self.notify(SessionEvent::StaleResultDiscarded {
                generation: ticket.generation,
            });
            return Ok(0);
        }

        let result = self.session.search.finish(outcome);
        match &result {
            Ok(candidates) => self.notify(SessionEvent::SearchCompleted {
                candidates: *candidates,
            }),
            Err(e) => {
                if matches!(e, TripPlannerError::NotFound { .. }) {
                    self.session.url.location = None;
                }
                self.notify(SessionEvent::SearchFailed {
                    message: e.user_message(),
                });
            }
        }
        result
    }

    /// Select one of the presented search candidates
    pub fn select_candidate(&mut self, index: usize) -> Result<Location> {
        self.ensure_idle("change the destination")?;
        let location = self.session.search.select(index)?;
        self.select_location(location.clone())?;
        Ok(location)
    }

    /// Set the destination; the date range is left alone
    pub fn select_location(&mut self, location: Location) -> Result<()> {
        self.ensure_idle("change the destination")?;
        info!(
            "Selected destination {} ({})",
            location.label(),
            location.format_coordinates()
        );
        self.invalidate_plan();
        self.session
            .url
            .set_coordinates(location.latitude, location.longitude);
        self.notify(SessionEvent::LocationSelected {
            name: location.label().to_string(),
            lat: location.latitude,
            lon: location.longitude,
        });
        self.session.search.dismiss();
        self.session.location = Some(location);
        Ok(())
    }

    /// Clear the destination and re-enable free-text search.
    ///
    /// A finalized range stays finalized.
    pub fn clear_location(&mut self) -> Result<()> {
        self.ensure_idle("clear the destination")?;
        self.invalidate_plan();
        self.session.location = None;
        self.session.search.query.clear();
        self.session.url.clear_location();
        self.notify(SessionEvent::LocationCleared);
        Ok(())
    }

    // === Dates ===

    /// Record a tentative picker selection and return its day count
    pub fn select_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<u32> {
        self.ensure_idle("change the dates")?;
        if self.session.dates.finalized {
            return Err(self.reject("Dates are confirmed. Choose change to pick new ones."));
        }
        if self.session.dates.select(start, end) {
            let day_count = self.session.dates.day_count;
            self.notify(SessionEvent::DatesSelected { day_count });
            Ok(day_count)
        } else {
            let (start, end) = (start.unwrap_or_default(), end.unwrap_or_default());
            Err(self.reject(dates::rejection_warning(start, end)))
        }
    }

    /// Finalize a range. Issues the ticket for exactly one weather fetch.
    pub fn confirm_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<WeatherTicket> {
        self.ensure_idle("change the dates")?;
        if self.session.dates.finalized {
            return Err(self.reject("Dates are already confirmed."));
        }
        let Some(location) = &self.session.location else {
            return Err(self.reject(MISSING_DESTINATION));
        };
        let (lat, lon) = (location.latitude, location.longitude);

        let mut range = DateRange::default();
        if !range.finalize(start, end) {
            self.session.dates.clear();
            self.session.url.clear_dates();
            return Err(self.reject(dates::rejection_warning(start, end)));
        }

        self.invalidate_plan();
        self.session.dates = range;
        self.session.weather.clear();
        self.session.url.set_dates(start, end);
        info!(
            "Confirmed travel dates {} .. {} ({} days)",
            start, end, self.session.dates.day_count
        );
        self.notify(SessionEvent::DatesConfirmed {
            start,
            end,
            day_count: self.session.dates.day_count,
        });

        Ok(WeatherTicket {
            generation: self.generation,
            lat,
            lon,
            start,
            end,
        })
    }

    /// Un-finalize and clear the range
    pub fn change_date_range(&mut self) -> Result<()> {
        self.ensure_idle("change the dates")?;
        self.invalidate_plan();
        self.session.dates.clear();
        self.session.weather.clear();
        self.session.url.clear_dates();
        self.notify(SessionEvent::DatesCleared);
        Ok(())
    }

    // === Purpose & presentation ===

    pub fn set_purpose(&mut self, purpose: &str) -> Result<()> {
        self.ensure_idle("change the purpose")?;
        let purpose = purpose.trim();
        if purpose == self.session.purpose {
            return Ok(());
        }
        self.invalidate_plan();
        self.session.purpose = purpose.to_string();
        self.notify(SessionEvent::PurposeChanged {
            purpose: purpose.to_string(),
        });
        Ok(())
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.session.theme = theme;
    }

    /// Open or close the places/weather panels.
    ///
    /// Opening needs a plan result and nothing loading; closing always works.
    pub fn set_panels(&mut self, places: Option<bool>, weather: Option<bool>) -> Result<()> {
        let opening = places == Some(true) || weather == Some(true);
        if opening && (self.session.loading || self.session.plan.is_none()) {
            return Err(self.reject("Generate a plan first."));
        }
        if let Some(visible) = places {
            self.session.places_visible = visible;
        }
        if let Some(visible) = weather {
            self.session.weather_visible = visible;
        }
        self.notify(SessionEvent::PanelsChanged {
            places_visible: self.session.places_visible,
            weather_visible: self.session.weather_visible,
        });
        Ok(())
    }

    // === Submission ===

    /// Move from `Ready` to `Generating` and hand out the request ticket
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket> {
        if self.session.loading {
            return Err(self.reject("A plan is already being generated."));
        }
        if self.session.plan.is_some() {
            return Err(self.reject("A plan has already been generated. Change an input or reset to plan again."));
        }
        let Some(location) = &self.session.location else {
            return Err(self.reject(MISSING_DESTINATION));
        };
        if !self.session.dates.finalized {
            return Err(self.reject(MISSING_DATES));
        }
        if self.session.dates.day_count == 0 || self.session.purpose.is_empty() {
            return Err(self.reject(MISSING_FIELDS));
        }
        let Some((lat, lon)) = self.session.request_coordinates() else {
            return Err(self.reject(MISSING_DESTINATION));
        };

        let request = PlanRequest {
            day_count: self.session.dates.day_count,
            purpose: self.session.purpose.clone(),
            destination_description: location.destination_description(),
            weather_description: weather_description(&self.session.weather),
        };

        self.submissions += 1;
        self.active_submission = Some(self.submissions);
        self.session.loading = true;
        self.session.places.clear();
        info!(
            "Submitting plan request: {} days, purpose '{}'",
            request.day_count, request.purpose
        );
        self.notify(SessionEvent::PlanRequested {
            generation: self.generation,
        });

        Ok(SubmissionTicket {
            generation: self.generation,
            submission: self.submissions,
            lat,
            lon,
            request,
        })
    }

    /// Apply an asynchronous result. Returns `false` when it was stale and
    /// discarded.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            debug!(
                "Discarding result from generation {} (current {})",
                completion.generation, self.generation
            );
            self.notify(SessionEvent::StaleResultDiscarded {
                generation: completion.generation,
            });
            return false;
        }

        match completion.payload {
            CompletionPayload::Weather { start, end, days } => {
                if self.session.dates.finalized_bounds() != Some((start, end)) {
                    debug!("Discarding weather for {} .. {}: range changed", start, end);
                    self.notify(SessionEvent::StaleResultDiscarded {
                        generation: completion.generation,
                    });
                    return false;
                }
                let count = days.len();
                self.session.weather = days;
                self.notify(SessionEvent::WeatherLoaded { days: count });
            }
            CompletionPayload::Places { submission, places } => {
                if self.active_submission != Some(submission) {
                    self.notify(SessionEvent::StaleResultDiscarded {
                        generation: completion.generation,
                    });
                    return false;
                }
                let count = places.len();
                self.session.places = places;
                self.notify(SessionEvent::PlacesLoaded { count });
            }
            CompletionPayload::Plan { submission, plan } => {
                if self.active_submission != Some(submission) || !self.session.loading {
                    self.notify(SessionEvent::StaleResultDiscarded {
                        generation: completion.generation,
                    });
                    return false;
                }
                self.session.plan = Some(plan);
                self.session.loading = false;
                let state = self.session.state();
                info!("Plan request finished: {:?}", state);
                self.notify(SessionEvent::PlanFinished { state });
            }
        }
        true
    }

    /// Drop the plan, places and panels while keeping every input
    pub fn clear_plan(&mut self) -> Result<()> {
        self.ensure_idle("clear the plan")?;
        self.invalidate_plan();
        Ok(())
    }

    /// Return to the empty session from any state.
    ///
    /// Bumps the generation so results still in flight are discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.active_submission = None;
        let theme = self.session.theme;
        self.session = Session {
            theme,
            ..Session::default()
        };
        info!("Session reset (generation {})", self.generation);
        self.notify(SessionEvent::Reset {
            generation: self.generation,
        });
    }
}
