use axum::Router;

use crate::provider::SnapshotProvider;
use crate::refresh::RefreshController;

mod alerts;
mod conditions;
mod health;
mod parks;

// ---

/// State shared by every route.
pub struct AppState<P> {
    pub controller: RefreshController<P>,
    pub city_name: String,
    pub utc_offset_hours: i32,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        AppState {
            controller: self.controller.clone(),
            city_name: self.city_name.clone(),
            utc_offset_hours: self.utc_offset_hours,
        }
    }
}

pub fn router<P: SnapshotProvider>(state: AppState<P>) -> Router {
    // ---
    Router::new()
        .merge(conditions::router())
        .merge(alerts::router())
        .merge(parks::router())
        .merge(health::router())
        .with_state(state)
}
