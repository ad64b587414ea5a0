use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TripPlannerError;
use crate::export::EXPORT_FILE_NAME;
use crate::formatter::{ContentBlock, ThemeMode};
use crate::models::{Location, PlanResult};
use crate::orchestrator::TripPlanner;
use crate::purpose::{PURPOSE_GROUPS, PurposeGroup};
use crate::session::{Session, SessionState};

/// Shared handler state: the one in-memory session of this process
#[derive(Debug, Clone)]
pub struct AppState {
    pub planner: TripPlanner,
}

/// Library error rendered as `{error, message}` JSON
#[derive(Debug)]
pub struct ApiError(TripPlannerError);

impl From<TripPlannerError> for ApiError {
    fn from(e: TripPlannerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if code.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.user_message(),
        }));
        (code, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: SessionState,
    pub query_string: String,
    pub session: Session,
}

impl SessionView {
    fn of(planner: &TripPlanner) -> Json<Self> {
        let session = planner.snapshot();
        Json(Self {
            state: session.state(),
            query_string: session.query_string(),
            session,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub state: SessionState,
    pub plan: PlanResult,
    pub blocks: Vec<ContentBlock>,
    pub html: String,
}

#[derive(Deserialize)]
pub struct RestoreRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Select either a presented candidate by index or an explicit location
#[derive(Deserialize)]
pub struct SelectRequest {
    pub index: Option<usize>,
    pub location: Option<Location>,
}

#[derive(Deserialize)]
pub struct DatesRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
pub struct PurposeRequest {
    pub purpose: String,
}

#[derive(Deserialize)]
pub struct PanelsRequest {
    pub places: Option<bool>,
    pub weather: Option<bool>,
}

#[derive(Deserialize)]
pub struct WaitParams {
    /// Hold the response until the spawned requests have landed
    #[serde(default)]
    pub wait: bool,
}

#[derive(Deserialize)]
pub struct ThemeParams {
    pub theme: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", get(get_session).post(restore_session))
        .route("/location/search", post(search_location))
        .route("/location/select", post(select_location))
        .route("/location", delete(clear_location))
        .route("/dates", post(select_dates).delete(change_dates))
        .route("/dates/confirm", post(confirm_dates))
        .route("/purpose", put(set_purpose))
        .route("/purposes", get(get_purposes))
        .route("/plan", post(submit_plan).get(get_plan).delete(clear_plan))
        .route("/plan/pdf", get(get_plan_pdf))
        .route("/panels", put(set_panels))
        .route("/reset", post(reset))
        .with_state(state)
}

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    SessionView::of(&state.planner)
}

async fn restore_session(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> Json<SessionView> {
    state.planner.restore(&request.query);
    SessionView::of(&state.planner)
}

async fn search_location(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SessionView>> {
    state.planner.search_location(&request.query).await?;
    Ok(SessionView::of(&state.planner))
}

async fn select_location(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<SessionView>> {
    match (request.index, request.location) {
        (Some(index), _) => {
            state.planner.select_candidate(index)?;
        }
        (None, Some(location)) => state.planner.select_location(location)?,
        (None, None) => {
            return Err(TripPlannerError::validation("Provide a candidate index or a location.").into());
        }
    }
    Ok(SessionView::of(&state.planner))
}

async fn clear_location(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    state.planner.clear_location()?;
    Ok(SessionView::of(&state.planner))
}

async fn select_dates(
    State(state): State<AppState>,
    Json(request): Json<DatesRequest>,
) -> ApiResult<Json<SessionView>> {
    state.planner.select_dates(request.start, request.end)?;
    Ok(SessionView::of(&state.planner))
}

async fn confirm_dates(
    State(state): State<AppState>,
    Query(params): Query<WaitParams>,
    Json(request): Json<ConfirmRequest>,
) -> ApiResult<Json<SessionView>> {
    let weather = state.planner.confirm_date_range(request.start, request.end)?;
    if params.wait {
        weather
            .await
            .map_err(|e| TripPlannerError::transport(format!("Weather task did not complete: {e}")))?;
    }
    Ok(SessionView::of(&state.planner))
}

async fn change_dates(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    state.planner.change_date_range()?;
    Ok(SessionView::of(&state.planner))
}

async fn set_purpose(
    State(state): State<AppState>,
    Json(request): Json<PurposeRequest>,
) -> ApiResult<Json<SessionView>> {
    state.planner.set_purpose(&request.purpose)?;
    Ok(SessionView::of(&state.planner))
}

async fn get_purposes() -> Json<&'static [PurposeGroup]> {
    Json(PURPOSE_GROUPS)
}

async fn submit_plan(
    State(state): State<AppState>,
    Query(params): Query<WaitParams>,
) -> ApiResult<(StatusCode, Json<SessionView>)> {
    let pending = state.planner.submit_plan()?;
    if params.wait {
        pending.wait().await?;
        return Ok((StatusCode::OK, SessionView::of(&state.planner)));
    }
    Ok((StatusCode::ACCEPTED, SessionView::of(&state.planner)))
}

async fn get_plan(
    State(state): State<AppState>,
    Query(params): Query<ThemeParams>,
) -> ApiResult<Json<PlanView>> {
    let theme = params
        .theme
        .as_deref()
        .map(str::parse::<ThemeMode>)
        .transpose()?;
    if let Some(theme) = theme {
        state.planner.set_theme(theme);
    }

    let session = state.planner.snapshot();
    let plan = session
        .plan
        .clone()
        .ok_or_else(|| TripPlannerError::not_found("No plan has been generated yet."))?;
    let blocks = state.planner.formatted_plan().unwrap_or_default();
    let html = state.planner.plan_html(theme).unwrap_or_default();

    Ok(Json(PlanView {
        state: session.state(),
        plan,
        blocks,
        html,
    }))
}

async fn clear_plan(State(state): State<AppState>) -> ApiResult<Json<SessionView>> {
    state.planner.clear_plan()?;
    Ok(SessionView::of(&state.planner))
}

async fn get_plan_pdf(State(state): State<AppState>) -> ApiResult<Response> {
    let bytes = state.planner.plan_pdf()?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn set_panels(
    State(state): State<AppState>,
    Json(request): Json<PanelsRequest>,
) -> ApiResult<Json<SessionView>> {
    state.planner.set_panels(request.places, request.weather)?;
    Ok(SessionView::of(&state.planner))
}

async fn reset(State(state): State<AppState>) -> Json<SessionView> {
    state.planner.reset();
    SessionView::of(&state.planner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::static_services;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            planner: TripPlanner::new(static_services()),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_full_session_over_http() {
        let app = app();

        let (status, _) = send_json(&app, "POST", "/location/search", Some(json!({"query": "Tokyo Tower"}))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, view) = send_json(&app, "POST", "/location/select", Some(json!({"index": 0}))).await;
        assert_eq!(view["state"], "locationSet");

        let (status, view) = send_json(
            &app,
            "POST",
            "/dates/confirm?wait=true",
            Some(json!({"start": "2025-06-01", "end": "2025-06-05"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["session"]["dates"]["dayCount"], 5);

        send_json(&app, "PUT", "/purpose", Some(json!({"purpose": "vacation"}))).await;
        let (status, view) = send_json(&app, "POST", "/plan?wait=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "completed");

        let (status, plan) = send_json(&app, "GET", "/plan?theme=dark", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["blocks"][0]["type"], "List");
        assert!(plan["html"].as_str().unwrap().contains("prose dark"));

        let (status, pdf) = send(&app, "GET", "/plan/pdf", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(pdf.starts_with(b"%PDF"));

        let (_, view) = send_json(&app, "POST", "/reset", None).await;
        assert_eq!(view["state"], "empty");
        assert_eq!(view["queryString"], "");
    }

    #[tokio::test]
    async fn test_errors_render_as_json() {
        let app = app();

        let (status, body) = send_json(&app, "POST", "/plan", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation");
        assert_eq!(body["message"], "Please enter your destination.");

        let (status, body) = send_json(&app, "POST", "/location/search", Some(json!({"query": "Atlantis"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Location not found!");

        let (status, _) = send_json(&app, "GET", "/plan", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send_json(&app, "GET", "/plan?theme=sepia", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation");
    }

    #[tokio::test]
    async fn test_restore_and_purposes() {
        let app = app();
        let (_, view) = send_json(
            &app,
            "POST",
            "/session",
            Some(json!({"query": "location=Kyoto&start=2025-06-01&end=2025-06-20"})),
        )
        .await;
        assert_eq!(view["session"]["search"]["query"], "Kyoto");
        assert_eq!(view["session"]["dates"]["dayCount"], 0);
        assert_eq!(view["queryString"], "location=Kyoto");

        let (_, purposes) = send_json(&app, "GET", "/purposes", None).await;
        assert_eq!(purposes.as_array().unwrap().len(), 4);
        assert_eq!(purposes[0]["options"][0]["value"], "vacation");
    }
}
