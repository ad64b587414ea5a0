//! Plan request orchestration
//!
//! [`TripPlanner`] sequences the network calls of a planning session on top
//! of the [`SessionStore`]. Every transition happens under the store lock;
//! network calls run in spawned tasks outside it and post a single
//! [`Completion`] back when they finish. The store decides whether the
//! completion is still current.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::TripPlannerError;
use crate::export;
use crate::formatter::{self, ContentBlock, ThemeMode};
use crate::models::Location;
use crate::services::Services;
use crate::session::{Completion, Session, SessionEvent, SessionStore};
use crate::url_params::UrlParams;
use crate::Result;

/// Places and plan requests issued by one submission
#[derive(Debug)]
pub struct PendingRequests {
    places: JoinHandle<bool>,
    plan: JoinHandle<bool>,
}

/// Which results of a submission were applied to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub places_applied: bool,
    pub plan_applied: bool,
}

impl PendingRequests {
    /// Wait for both requests to land
    pub async fn wait(self) -> Result<SubmissionOutcome> {
        let (places, plan) = tokio::join!(self.places, self.plan);
        Ok(SubmissionOutcome {
            places_applied: places.map_err(join_error)?,
            plan_applied: plan.map_err(join_error)?,
        })
    }
}

fn join_error(e: tokio::task::JoinError) -> TripPlannerError {
    TripPlannerError::transport(format!("Request task did not complete: {e}"))
}

/// One planning session wired to its services
#[derive(Debug, Clone)]
pub struct TripPlanner {
    store: Arc<Mutex<SessionStore>>,
    services: Services,
}

impl TripPlanner {
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self::with_store(SessionStore::new(), services)
    }

    /// Session hydrated from a page query string
    #[must_use]
    pub fn from_query_string(query: &str, services: Services) -> Self {
        Self::with_store(SessionStore::hydrate(UrlParams::parse(query)), services)
    }

    fn with_store(store: SessionStore, services: Services) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            services,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Reads ===

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.lock().subscribe()
    }

    #[must_use]
    pub fn query_string(&self) -> String {
        self.lock().session().query_string()
    }

    /// Content blocks of the current plan
    #[must_use]
    pub fn formatted_plan(&self) -> Option<Vec<ContentBlock>> {
        self.lock().session().plan_text().map(formatter::format_response)
    }

    /// HTML fragment of the current plan; `theme` defaults to the session's
    #[must_use]
    pub fn plan_html(&self, theme: Option<ThemeMode>) -> Option<String> {
        let store = self.lock();
        let session = store.session();
        let theme = theme.unwrap_or(session.theme);
        session
            .plan_text()
            .map(|text| formatter::render_html(&formatter::format_response(text), theme))
    }

    /// PDF bytes of the current plan, or of the no-data placeholder
    pub fn plan_pdf(&self) -> Result<Vec<u8>> {
        let text = self.lock().session().plan_text().map(str::to_string);
        export::plan_document(text.as_deref())
    }

    /// Write the plan document into `dir`
    pub fn export_pdf(&self, dir: &Path) -> Result<PathBuf> {
        let text = self.lock().session().plan_text().map(str::to_string);
        export::export_plan(text.as_deref(), dir)
    }

    // === Location ===

    /// Geocode `query` and present the candidates. Returns how many were
    /// found.
    pub async fn search_location(&self, query: &str) -> Result<usize> {
        let ticket = {
            let mut store = self.lock();
            store.set_search_query(query)?;
            store.begin_location_search()?
        };

        let outcome = self.services.geocoder.search(&ticket.query).await;
        self.lock().finish_location_search(&ticket, outcome)
    }

    pub fn select_candidate(&self, index: usize) -> Result<Location> {
        self.lock().select_candidate(index)
    }

    pub fn select_location(&self, location: Location) -> Result<()> {
        self.lock().select_location(location)
    }

    pub fn clear_location(&self) -> Result<()> {
        self.lock().clear_location()
    }

    // === Dates ===

    pub fn select_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<u32> {
        self.lock().select_dates(start, end)
    }

    /// Finalize the range and start its weather fetch.
    ///
    /// The handle resolves to whether the forecast was applied. A failed
    /// fetch applies an empty forecast.
    pub fn confirm_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<JoinHandle<bool>> {
        let ticket = self.lock().confirm_date_range(start, end)?;
        let store = Arc::clone(&self.store);
        let weather = Arc::clone(&self.services.weather);

        Ok(tokio::spawn(async move {
            let days = match weather
                .forecast(ticket.lat, ticket.lon, ticket.start, ticket.end)
                .await
            {
                Ok(days) => days,
                Err(e) => {
                    warn!("Weather fetch failed, continuing without forecast: {}", e);
                    Vec::new()
                }
            };
            let completion = Completion::weather(&ticket, days);
            store.lock().unwrap_or_else(PoisonError::into_inner).apply(completion)
        }))
    }

    pub fn change_date_range(&self) -> Result<()> {
        self.lock().change_date_range()
    }

    // === Purpose, theme, panels ===

    pub fn set_purpose(&self, purpose: &str) -> Result<()> {
        self.lock().set_purpose(purpose)
    }

    pub fn set_theme(&self, theme: ThemeMode) {
        self.lock().set_theme(theme);
    }

    pub fn set_panels(&self, places: Option<bool>, weather: Option<bool>) -> Result<()> {
        self.lock().set_panels(places, weather)
    }

    // === Submission ===

    /// Issue the places and plan requests concurrently.
    ///
    /// Rejected without any network call unless the session is ready.
    pub fn submit_plan(&self) -> Result<PendingRequests> {
        let ticket = self.lock().begin_submission()?;

        let places = {
            let store = Arc::clone(&self.store);
            let provider = Arc::clone(&self.services.places);
            let ticket = ticket.clone();
            tokio::spawn(async move {
                let places = match provider.nearby(ticket.lat, ticket.lon).await {
                    Ok(places) => places,
                    Err(e) => {
                        warn!("Places fetch failed, continuing without places: {}", e);
                        Vec::new()
                    }
                };
                let completion = Completion::places(&ticket, places);
                store.lock().unwrap_or_else(PoisonError::into_inner).apply(completion)
            })
        };

        let plan = {
            let store = Arc::clone(&self.store);
            let planner = Arc::clone(&self.services.planner);
            tokio::spawn(async move {
                let plan = planner.generate(&ticket.request).await;
                debug!("Plan request for submission {} finished", ticket.submission);
                let completion = Completion::plan(&ticket, plan);
                store.lock().unwrap_or_else(PoisonError::into_inner).apply(completion)
            })
        };

        Ok(PendingRequests { places, plan })
    }

    pub fn clear_plan(&self) -> Result<()> {
        self.lock().clear_plan()
    }

    // === Reset ===

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Replace the session with one hydrated from `query`
    pub fn restore(&self, query: &str) {
        self.lock().restore(UrlParams::parse(query));
    }
}
