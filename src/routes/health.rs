// src/routes/health.rs
//! API health check endpoint for the envwatch backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is running. It follows the
//! Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: endpoint handler and response type
//! - Exports to the gateway (`mod.rs`): a subrouter containing `/health`
//!
//! The response also reports whether any environmental data has loaded yet,
//! without touching the external provider.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::provider::SnapshotProvider;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    data_loaded: bool,
    last_updated: Option<DateTime<Utc>>,
}

/// Handle `GET /health`.
async fn health<P: SnapshotProvider>(State(app): State<AppState<P>>) -> Json<HealthResponse> {
    // ---
    let s = app.controller.state().lock();
    Json(HealthResponse {
        status: "ok",
        data_loaded: s.current.is_some(),
        last_updated: s.last_updated,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router<P: SnapshotProvider>() -> Router<AppState<P>> {
    Router::new().route("/health", get(health::<P>))
}
