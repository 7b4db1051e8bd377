//! Data refresh controller.
//!
//! Every trigger (startup, the periodic timer, a user request) funnels through
//! [`RefreshController::refresh_all`]. Triggers are neither coalesced nor
//! cancelled: concurrent refreshes race and whichever finishes last wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::alerts::AlertStore;
use crate::models::{EnvironmentalSnapshot, Trends};
use crate::parks::{self, ParkConditions, CITY_PARKS};
use crate::provider::{ProviderError, SnapshotProvider};

// ---

/// Everything the dashboard reads. Mutated only by the controller and the
/// alert store's own operations.
pub struct DashboardState {
    // ---
    pub alerts: AlertStore,
    pub current: Option<EnvironmentalSnapshot>,
    pub trends: Trends,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub parks: Vec<ParkConditions>,
    pub parks_error: Option<String>,
    conditions_in_flight: usize,
    parks_in_flight: usize,
}

/// How the front end should surface the last fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDisplay {
    None,
    /// Stale data is still on screen; show a banner with a retry action.
    Banner,
    /// Nothing has ever loaded; show a full-page error with retry.
    FullPage,
}

impl DashboardState {
    // ---
    pub fn new(alerts: AlertStore) -> Self {
        DashboardState {
            alerts,
            current: None,
            trends: Trends::default(),
            error: None,
            last_updated: None,
            parks: Vec::new(),
            parks_error: None,
            conditions_in_flight: 0,
            parks_in_flight: 0,
        }
    }

    pub fn loading(&self) -> bool {
        self.conditions_in_flight > 0
    }

    pub fn parks_loading(&self) -> bool {
        self.parks_in_flight > 0
    }

    pub fn error_display(&self) -> ErrorDisplay {
        match (&self.error, &self.current) {
            (None, _) => ErrorDisplay::None,
            (Some(_), Some(_)) => ErrorDisplay::Banner,
            (Some(_), None) => ErrorDisplay::FullPage,
        }
    }
}

pub type SharedDashboard = Arc<Mutex<DashboardState>>;

pub struct RefreshController<P> {
    provider: Arc<P>,
    state: SharedDashboard,
}

impl<P> Clone for RefreshController<P> {
    fn clone(&self) -> Self {
        RefreshController {
            provider: Arc::clone(&self.provider),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P: SnapshotProvider> RefreshController<P> {
    // ---
    pub fn new(provider: Arc<P>, state: SharedDashboard) -> Self {
        RefreshController { provider, state }
    }

    pub fn state(&self) -> &SharedDashboard {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch current conditions and feed them to the alert store.
    ///
    /// On failure the error is recorded and every previously loaded value,
    /// including the current alert, is kept.
    pub async fn refresh_conditions(&self) {
        // ---
        let in_flight = InFlight::begin(&self.state, Fetch::Conditions);
        let result = self.provider.fetch_environment().await;

        let mut s = self.state.lock();
        in_flight.finish(&mut s);
        match result {
            Ok(report) => {
                let raised = s.alerts.ingest(&report.current);
                debug!(raised, aqi = report.current.aqi, "Conditions refreshed");
                s.current = Some(report.current);
                s.trends = report.trends;
                s.last_updated = Some(Utc::now());
            }
            Err(e) => {
                log_fetch_failure("conditions", &e);
                s.error = Some(e.to_string());
            }
        }
    }

    /// Fetch per-park air quality and re-rank the registry.
    pub async fn refresh_parks(&self) {
        // ---
        let in_flight = InFlight::begin(&self.state, Fetch::Parks);
        let result = self.provider.fetch_park_readings(CITY_PARKS).await;

        let mut s = self.state.lock();
        in_flight.finish(&mut s);
        match result {
            Ok(readings) => {
                s.parks = parks::rank_by_air_quality(CITY_PARKS, &readings);
            }
            Err(e) => {
                log_fetch_failure("parks", &e);
                s.parks_error = Some(e.to_string());
            }
        }
    }

    pub async fn refresh_all(&self) {
        tokio::join!(self.refresh_conditions(), self.refresh_parks());
    }

    /// Start an independent refresh without waiting for it.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        // ---
        let this = self.clone();
        tokio::spawn(async move { this.refresh_all().await })
    }

    /// Refresh immediately, then every `period`, forever.
    ///
    /// Each tick is spawned so a slow fetch never delays the next one.
    pub async fn run(self, period: Duration) {
        // ---
        info!("Refreshing every {:?}", period);
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            self.spawn_refresh();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Fetch {
    Conditions,
    Parks,
}

impl Fetch {
    // ---
    fn enter(self, s: &mut DashboardState) {
        match self {
            Fetch::Conditions => {
                s.conditions_in_flight += 1;
                s.error = None;
            }
            Fetch::Parks => {
                s.parks_in_flight += 1;
                s.parks_error = None;
            }
        }
    }

    fn leave(self, s: &mut DashboardState) {
        match self {
            Fetch::Conditions => s.conditions_in_flight -= 1,
            Fetch::Parks => s.parks_in_flight -= 1,
        }
    }
}

/// One fetch counted in the dashboard's loading state.
///
/// Dropping it without [`InFlight::finish`] (the refresh future was cancelled)
/// still releases the count, so `loading` cannot stick at true.
struct InFlight<'a> {
    state: &'a SharedDashboard,
    fetch: Fetch,
    finished: bool,
}

impl<'a> InFlight<'a> {
    // ---
    fn begin(state: &'a SharedDashboard, fetch: Fetch) -> Self {
        fetch.enter(&mut state.lock());
        InFlight {
            state,
            fetch,
            finished: false,
        }
    }

    /// Release the count under a lock the caller already holds, so the
    /// result lands in the same critical section.
    fn finish(mut self, s: &mut DashboardState) {
        self.fetch.leave(s);
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.fetch.leave(&mut self.state.lock());
        }
    }
}

fn log_fetch_failure(what: &str, e: &ProviderError) {
    // ---
    match e {
        ProviderError::Unconfigured => error!("{} fetch skipped: {}", what, e),
        ProviderError::InvalidKey | ProviderError::Http(_) | ProviderError::Parse(_) => {
            error!("{} fetch failed: {}", what, e)
        }
        ProviderError::RateLimited | ProviderError::Network(_) => {
            warn!("{} fetch failed: {}", what, e)
        }
    }
}
