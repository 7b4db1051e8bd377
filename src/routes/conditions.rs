//! Current conditions, trends, exercise guidance, forecast and manual refresh.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use super::AppState;
use crate::aqi::{self, AqiInfo, ExerciseQuality};
use crate::models::{EnvironmentalSnapshot, Trends};
use crate::provider::{ProviderError, SnapshotProvider};
use crate::refresh::ErrorDisplay;

// ---

pub fn router<P: SnapshotProvider>() -> Router<AppState<P>> {
    // ---
    Router::new()
        .route("/api/environment", get(environment::<P>))
        .route("/api/trends", get(trends::<P>))
        .route("/api/exercise", get(exercise::<P>))
        .route("/api/forecast", get(forecast::<P>))
        .route("/api/refresh", post(refresh::<P>))
}

#[derive(Debug, Serialize)]
struct EnvironmentView {
    city: String,
    snapshot: Option<EnvironmentalSnapshot>,
    aqi_info: Option<AqiInfo>,
    pollen_category: Option<&'static str>,
    uv_category: Option<&'static str>,
    loading: bool,
    error: Option<String>,
    error_display: ErrorDisplay,
    last_updated: Option<DateTime<Utc>>,
}

async fn environment<P: SnapshotProvider>(State(app): State<AppState<P>>) -> Json<EnvironmentView> {
    // ---
    let s = app.controller.state().lock();
    let snapshot = s.current.clone();

    Json(EnvironmentView {
        city: app.city_name.clone(),
        aqi_info: snapshot.as_ref().map(|d| aqi::aqi_info(d.aqi)),
        pollen_category: snapshot.as_ref().map(|d| aqi::pollen_category(d.pollen_level)),
        uv_category: snapshot.as_ref().map(|d| aqi::uv_category(d.uv_index)),
        snapshot,
        loading: s.loading(),
        error: s.error.clone(),
        error_display: s.error_display(),
        last_updated: s.last_updated,
    })
}

async fn trends<P: SnapshotProvider>(State(app): State<AppState<P>>) -> Json<Trends> {
    Json(app.controller.state().lock().trends.clone())
}

#[derive(Debug, Serialize)]
struct ExerciseView {
    aqi: u32,
    quality: ExerciseQuality,
    recommendation: String,
}

async fn exercise<P: SnapshotProvider>(State(app): State<AppState<P>>) -> impl IntoResponse {
    // ---
    let s = app.controller.state().lock();
    let Some(current) = s.current.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "No environmental data loaded yet" })),
        )
            .into_response();
    };

    let quality = aqi::exercise_quality(current.aqi);
    let recommendation = aqi::best_exercise_time(&s.trends.aqi, app.utc_offset_hours)
        .unwrap_or_else(|| quality.recommendation.to_string());

    (
        StatusCode::OK,
        Json(ExerciseView {
            aqi: current.aqi,
            quality,
            recommendation,
        }),
    )
        .into_response()
}

async fn forecast<P: SnapshotProvider>(State(app): State<AppState<P>>) -> impl IntoResponse {
    // ---
    match app.controller.provider().fetch_forecast().await {
        Ok(days) => (StatusCode::OK, Json(json!(days))).into_response(),
        Err(e) => {
            error!("GET /api/forecast - {}", e);
            let status = match e {
                ProviderError::Unconfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Start a refresh of conditions and parks and return without waiting.
async fn refresh<P: SnapshotProvider>(State(app): State<AppState<P>>) -> impl IntoResponse {
    // ---
    info!("POST /api/refresh - refresh requested");
    app.controller.spawn_refresh();
    (StatusCode::ACCEPTED, Json(json!({ "status": "refreshing" })))
}

#[cfg(test)]
mod tests {
    // ---
    use super::super::testing::spawn_app;
    use crate::models::AqiPoint;
    use crate::provider::ProviderError;
    use crate::refresh::testing::report;
    use chrono::{TimeZone, Utc};
    use reqwest::{Client, StatusCode};
    use serde_json::Value;
    use std::time::Duration;

    #[tokio::test]
    async fn test_environment_before_and_after_load() {
        // ---
        let (base, controller) = spawn_app(vec![Ok(report(42, 5.0, 8.0))]).await;
        let url = format!("{}/api/environment", base);

        let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert!(body["snapshot"].is_null());
        assert_eq!(body["error_display"], "none");
        assert_eq!(body["city"], "San Jose");

        controller.refresh_conditions().await;
        let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body["snapshot"]["aqi"], 42);
        assert_eq!(body["aqi_info"]["label"], "Good");
        assert_eq!(body["aqi_info"]["category"], "good");
        assert_eq!(body["pollen_category"], "High");
        assert_eq!(body["uv_category"], "Very High");
        assert_eq!(body["loading"], false);
    }

    #[tokio::test]
    async fn test_environment_reports_full_page_error() {
        // ---
        let (base, controller) = spawn_app(vec![Err(ProviderError::InvalidKey)]).await;
        controller.refresh_conditions().await;

        let body: Value = reqwest::get(format!("{}/api/environment", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["error_display"], "full_page");
        assert!(body["error"].as_str().unwrap().contains("Invalid OpenWeatherMap API key"));
    }

    #[tokio::test]
    async fn test_exercise_uses_trend_when_available() {
        // ---
        let mut r = report(80, 0.0, 0.0);
        r.trends.aqi = vec![AqiPoint {
            time: Utc.with_ymd_and_hms(2025, 7, 4, 9, 0, 0).unwrap(),
            aqi: 70,
        }];
        let (base, controller) = spawn_app(vec![Ok(r)]).await;
        let url = format!("{}/api/exercise", base);

        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        controller.refresh_conditions().await;
        let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body["quality"]["label"], "Good");
        assert_eq!(
            body["recommendation"],
            "Best time for outdoor exercise: 9 AM - 1 PM (AQI: 70)"
        );
    }

    #[tokio::test]
    async fn test_forecast_error_maps_to_bad_gateway() {
        // ---
        let (base, _controller) = spawn_app(vec![Ok(report(30, 0.0, 0.0))]).await;

        let resp = reqwest::get(format!("{}/api/forecast", base)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("rate limit"));
    }

    #[tokio::test]
    async fn test_manual_refresh_runs_in_background() {
        // ---
        let (base, controller) = spawn_app(vec![Ok(report(160, 0.0, 0.0))]).await;

        let resp = Client::new()
            .post(format!("{}/api/refresh", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        for _ in 0..50 {
            if controller.state().lock().current.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let s = controller.state().lock();
        assert_eq!(s.current.as_ref().unwrap().aqi, 160);
        assert!(s.alerts.current().unwrap().takes_over_screen());
        assert_eq!(s.parks.len(), crate::parks::CITY_PARKS.len());
    }
}
