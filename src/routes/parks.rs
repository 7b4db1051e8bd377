//! Park explorer endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::debug;

use super::AppState;
use crate::parks::{self, ParkConditions, ParkQuery};
use crate::provider::SnapshotProvider;

// ---

/// Number of best-air parks highlighted as recommendations.
const RECOMMENDED: usize = 3;

pub fn router<P: SnapshotProvider>() -> Router<AppState<P>> {
    Router::new().route("/api/parks", get(handler::<P>))
}

#[derive(Debug, Serialize)]
struct ParksView {
    parks: Vec<ParkConditions>,
    recommended: Vec<ParkConditions>,
    activities: Vec<&'static str>,
    loading: bool,
    error: Option<String>,
}

async fn handler<P: SnapshotProvider>(
    Query(query): Query<ParkQuery>,
    State(app): State<AppState<P>>,
) -> Json<ParksView> {
    // ---
    debug!("GET /api/parks - {:?}", query);
    let s = app.controller.state().lock();

    Json(ParksView {
        parks: query.apply(&s.parks),
        recommended: s.parks.iter().take(RECOMMENDED).cloned().collect(),
        activities: parks::activities(&s.parks),
        loading: s.parks_loading(),
        error: s.parks_error.clone(),
    })
}
