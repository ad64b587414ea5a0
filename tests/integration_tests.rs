//! End-to-end planning sessions against recording fake services

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use trip_planner::services::{Geocoder, PlacesProvider, PlanGenerator, WeatherProvider};
use trip_planner::{
    Location, PlaceResult, PlanRequest, PlanResult, Services, SessionEvent, SessionState,
    TripPlanner, TripPlannerError, WeatherDay,
};

/// Records every call; plan generation can be held until released
#[derive(Default)]
struct RecordingServices {
    places_calls: Mutex<Vec<(f64, f64)>>,
    weather_calls: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    plan_calls: Mutex<Vec<PlanRequest>>,
    hold_plan: bool,
    release: Notify,
}

impl RecordingServices {
    fn held() -> Self {
        Self {
            hold_plan: true,
            ..Self::default()
        }
    }

    fn total_calls(&self) -> usize {
        self.places_calls.lock().unwrap().len()
            + self.weather_calls.lock().unwrap().len()
            + self.plan_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Geocoder for RecordingServices {
    async fn search(&self, query: &str) -> trip_planner::Result<Vec<Location>> {
        if query == "Atlantis" {
            return Err(TripPlannerError::not_found("nothing"));
        }
        Ok(vec![Location::new(query, 35.65, 139.74)])
    }
}

#[async_trait]
impl PlacesProvider for RecordingServices {
    async fn nearby(&self, lat: f64, lon: f64) -> trip_planner::Result<Vec<PlaceResult>> {
        self.places_calls.lock().unwrap().push((lat, lon));
        Ok(vec![PlaceResult {
            id: "4b19f917f964a520abe623e3".to_string(),
            name: "Zojo-ji".to_string(),
            address: "4-7-35 Shibakoen, Minato, Tokyo".to_string(),
            category_icon: None,
        }])
    }
}

#[async_trait]
impl WeatherProvider for RecordingServices {
    async fn forecast(
        &self,
        _lat: f64,
        _lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> trip_planner::Result<Vec<WeatherDay>> {
        self.weather_calls.lock().unwrap().push((start, end));
        Err(TripPlannerError::transport("weather backend unavailable"))
    }
}

#[async_trait]
impl PlanGenerator for RecordingServices {
    async fn generate(&self, request: &PlanRequest) -> PlanResult {
        self.plan_calls.lock().unwrap().push(request.clone());
        if self.hold_plan {
            self.release.notified().await;
        }
        PlanResult::Generated(format!(
            "**Packing list** for {} days\n\n* Light jacket\n* Umbrella\n1. Check the forecast",
            request.day_count
        ))
    }
}

fn planner_with(services: Arc<RecordingServices>) -> TripPlanner {
    TripPlanner::new(Services {
        geocoder: services.clone(),
        places: services.clone(),
        weather: services.clone(),
        planner: services,
    })
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_tokyo_tower_vacation() {
    let services = Arc::new(RecordingServices::default());
    let planner = planner_with(services.clone());

    planner.select_location(Location::new("Tokyo Tower", 35.65, 139.74)).unwrap();
    let weather_applied = planner
        .confirm_date_range(date("2025-06-01"), date("2025-06-05"))
        .unwrap()
        .await
        .unwrap();
    assert!(weather_applied);
    assert_eq!(planner.snapshot().dates.day_count, 5);

    planner.set_purpose("vacation").unwrap();
    assert_eq!(planner.snapshot().state(), SessionState::Ready);
    planner.submit_plan().unwrap().wait().await.unwrap();

    assert_eq!(*services.places_calls.lock().unwrap(), vec![(35.65, 139.74)]);
    let plan_calls = services.plan_calls.lock().unwrap().clone();
    assert_eq!(plan_calls.len(), 1);
    assert_eq!(plan_calls[0].day_count, 5);
    assert_eq!(plan_calls[0].purpose, "vacation");
    assert!(plan_calls[0].query_string().starts_with("days=5&purpose=vacation&"));
    // failed weather degrades to the placeholder description
    assert_eq!(plan_calls[0].weather_description, "No description available");

    let session = planner.snapshot();
    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.places.len(), 1);
    assert!(session.weather.is_empty());
    assert_eq!(services.weather_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_suppresses_late_plan() {
    let services = Arc::new(RecordingServices::held());
    let planner = planner_with(services.clone());
    let mut events = planner.subscribe();

    planner.select_location(Location::new("Tokyo Tower", 35.65, 139.74)).unwrap();
    planner
        .confirm_date_range(date("2025-06-01"), date("2025-06-05"))
        .unwrap()
        .await
        .unwrap();
    planner.set_purpose("vacation").unwrap();

    let pending = planner.submit_plan().unwrap();
    assert_eq!(planner.snapshot().state(), SessionState::Generating);

    planner.reset();
    services.release.notify_one();
    let outcome = pending.wait().await.unwrap();

    assert!(!outcome.plan_applied);
    assert!(!outcome.places_applied);
    let session = planner.snapshot();
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.plan.is_none());
    assert!(session.places.is_empty());
    assert_eq!(planner.query_string(), "");

    let mut discarded = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SessionEvent::StaleResultDiscarded { .. }) {
            discarded += 1;
        }
    }
    assert_eq!(discarded, 2);
}

#[tokio::test]
async fn test_unready_submission_issues_no_calls() {
    let services = Arc::new(RecordingServices::default());
    let planner = planner_with(services.clone());

    // no location
    assert!(planner.submit_plan().is_err());

    // location, tentative dates only
    planner.select_location(Location::new("Kyoto", 35.0, 135.7)).unwrap();
    planner.select_dates(Some(date("2025-06-01")), Some(date("2025-06-03"))).unwrap();
    planner.set_purpose("hiking").unwrap();
    assert!(planner.submit_plan().is_err());

    // finalized dates, purpose removed
    planner
        .confirm_date_range(date("2025-06-01"), date("2025-06-03"))
        .unwrap()
        .await
        .unwrap();
    planner.set_purpose("  ").unwrap();
    let err = planner.submit_plan().unwrap_err();
    assert_eq!(err.user_message(), "Please fill out all fields.");

    assert!(services.places_calls.lock().unwrap().is_empty());
    assert!(services.plan_calls.lock().unwrap().is_empty());
    assert_eq!(services.total_calls(), 1);
}

#[tokio::test]
async fn test_long_range_is_rejected_and_zeroed() {
    let services = Arc::new(RecordingServices::default());
    let planner = planner_with(services.clone());
    planner.select_location(Location::new("Kyoto", 35.0, 135.7)).unwrap();

    let err = planner
        .confirm_date_range(date("2025-06-01"), date("2025-06-16"))
        .unwrap_err();
    assert!(matches!(err, TripPlannerError::Validation { .. }));

    let dates = planner.snapshot().dates;
    assert_eq!(dates.day_count, 0);
    assert_eq!((dates.start, dates.end), (None, None));
    assert!(services.weather_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_url_round_trip() {
    let services = Arc::new(RecordingServices::default());
    let planner = planner_with(services.clone());
    planner.search_location("Tokyo Tower").await.unwrap();
    planner.select_candidate(0).unwrap();
    planner
        .confirm_date_range(date("2025-06-01"), date("2025-06-05"))
        .unwrap()
        .await
        .unwrap();

    let query = planner.query_string();
    let reloaded = TripPlanner::from_query_string(&query, planner_services(services));
    let session = reloaded.snapshot();

    assert_eq!(session.request_coordinates(), Some((35.65, 139.74)));
    assert_eq!(session.url.dates(), Some((date("2025-06-01"), date("2025-06-05"))));
    assert_eq!(session.dates.day_count, 5);
    assert!(!session.dates.finalized);
    // descriptive fields do not survive a reload
    assert!(session.location.is_none());
    assert_eq!(session.search.query, "Tokyo Tower");
}

#[tokio::test]
async fn test_export_after_plan() {
    let services = Arc::new(RecordingServices::default());
    let planner = planner_with(services);
    planner.select_location(Location::new("Tokyo Tower", 35.65, 139.74)).unwrap();
    planner
        .confirm_date_range(date("2025-06-01"), date("2025-06-02"))
        .unwrap()
        .await
        .unwrap();
    planner.set_purpose("sightseeing").unwrap();
    planner.submit_plan().unwrap().wait().await.unwrap();

    let blocks = planner.formatted_plan().unwrap();
    assert_eq!(blocks.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = planner.export_pdf(dir.path()).unwrap();
    assert!(path.ends_with("packing-list.pdf"));
    assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));
}

fn planner_services(services: Arc<RecordingServices>) -> Services {
    Services {
        geocoder: services.clone(),
        places: services.clone(),
        weather: services.clone(),
        planner: services,
    }
}
