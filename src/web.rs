use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{self, AppState};
use crate::config::WebConfig;
use crate::orchestrator::TripPlanner;

/// API under `/api`, the static frontend everywhere else
pub fn app(planner: TripPlanner, config: &WebConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(AppState { planner }))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
}

pub async fn run(planner: TripPlanner, config: &WebConfig) -> Result<()> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.port);

    axum::serve(listener, app(planner, config))
        .await
        .context("Web server stopped unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::static_services;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_api_is_nested() {
        let app = app(TripPlanner::new(static_services()), &WebConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/session")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
