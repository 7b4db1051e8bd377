//! Alert endpoints: read the current alert and history, dismiss, and raise
//! demo scenarios.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use crate::alerts::{AlertStore, DemoScenario};
use crate::models::Alert;
use crate::provider::SnapshotProvider;

// ---

pub fn router<P: SnapshotProvider>() -> Router<AppState<P>> {
    // ---
    Router::new()
        .route("/api/alerts", get(current::<P>))
        .route("/api/alerts/dismiss", post(dismiss::<P>))
        .route("/api/alerts/demo/{scenario}", post(demo::<P>))
}

#[derive(Debug, Serialize)]
struct AlertsView {
    current: Option<Alert>,
    history: Vec<Alert>,
    /// The current alert owns the whole screen and cannot be closed.
    overlay: bool,
    /// The current alert is above informational.
    attention: bool,
}

impl AlertsView {
    fn from_store(store: &AlertStore) -> Self {
        // ---
        let current = store.current().cloned();
        AlertsView {
            overlay: current.as_ref().is_some_and(Alert::takes_over_screen),
            attention: current.as_ref().is_some_and(Alert::needs_attention),
            history: store.history().cloned().collect(),
            current,
        }
    }
}

async fn current<P: SnapshotProvider>(State(app): State<AppState<P>>) -> Json<AlertsView> {
    let s = app.controller.state().lock();
    Json(AlertsView::from_store(&s.alerts))
}

async fn dismiss<P: SnapshotProvider>(State(app): State<AppState<P>>) -> Json<AlertsView> {
    // ---
    let mut s = app.controller.state().lock();
    s.alerts.dismiss();
    Json(AlertsView::from_store(&s.alerts))
}

async fn demo<P: SnapshotProvider>(
    Path(scenario): Path<String>,
    State(app): State<AppState<P>>,
) -> impl IntoResponse {
    // ---
    let scenario: DemoScenario = match scenario.parse() {
        Ok(s) => s,
        Err(e) => {
            warn!("POST /api/alerts/demo - {}", e);
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response();
        }
    };

    info!("POST /api/alerts/demo/{} - triggering", scenario);
    let alert = app.controller.state().lock().alerts.trigger(scenario);
    (StatusCode::OK, Json(alert)).into_response()
}
