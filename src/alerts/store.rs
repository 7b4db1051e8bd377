//! Alert state store.
//!
//! Owns the single "current" alert slot and the newest-first history. The
//! store is the only place either is mutated; readers get clones.

use std::collections::VecDeque;

use tracing::{debug, info};

use super::rules::{DemoScenario, RuleEngine};
use crate::models::{Alert, EnvironmentalSnapshot};

// ---

/// Maximum number of alerts kept in history.
pub const HISTORY_LIMIT: usize = 10;

pub struct AlertStore {
    // ---
    engine: RuleEngine,
    current: Option<Alert>,
    history: VecDeque<Alert>,
}

impl AlertStore {
    // ---
    pub fn new(engine: RuleEngine) -> Self {
        AlertStore {
            engine,
            current: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT + 1),
        }
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }

    /// History, newest first.
    pub fn history(&self) -> impl Iterator<Item = &Alert> {
        self.history.iter()
    }

    /// Replace the current alert.
    ///
    /// A new alert is also pushed to the front of history, evicting the
    /// oldest entry past [`HISTORY_LIMIT`]. Clearing leaves history alone.
    pub fn set_alert(&mut self, alert: Option<Alert>) {
        // ---
        if let Some(ref a) = alert {
            info!(id = %a.id, category = ?a.category, severity = ?a.severity, "alert raised");
            self.history.push_front(a.clone());
            self.history.truncate(HISTORY_LIMIT);
        }
        self.current = alert;
    }

    /// Clear the current alert if it is dismissible. Returns whether it was.
    pub fn dismiss(&mut self) -> bool {
        // ---
        match self.current {
            Some(ref a) if a.dismissible => {
                info!(id = %a.id, "alert dismissed");
                self.current = None;
                true
            }
            Some(ref a) => {
                debug!(id = %a.id, "ignoring dismiss of locked alert");
                false
            }
            None => false,
        }
    }

    /// Run the rule engine on a snapshot and apply its decision.
    ///
    /// When no rule matches the current alert is kept as-is. Returns whether a
    /// new alert was raised.
    pub fn ingest(&mut self, snapshot: &EnvironmentalSnapshot) -> bool {
        // ---
        match self.engine.evaluate(snapshot) {
            Some(alert) => {
                self.set_alert(Some(alert));
                true
            }
            None => {
                debug!(aqi = snapshot.aqi, "no alert rule matched, keeping current alert");
                false
            }
        }
    }

    /// Raise a canned alert and make it current.
    pub fn trigger(&mut self, scenario: DemoScenario) -> Alert {
        // ---
        let alert = self.engine.trigger(scenario);
        self.set_alert(Some(alert.clone()));
        alert
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::alerts::{FixedClock, SequentialIds};
    use crate::models::{AlertCategory, Severity};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn store() -> AlertStore {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 9, 2, 8, 0, 0).unwrap();
        AlertStore::new(RuleEngine::new(
            Arc::new(FixedClock(now)),
            Arc::new(SequentialIds::default()),
        ))
    }

    fn snapshot(aqi: u32, pollen_level: f64, uv_index: f64) -> EnvironmentalSnapshot {
        // ---
        EnvironmentalSnapshot {
            aqi,
            pm25: 0.0,
            pm10: 0.0,
            temperature: Some(20.0),
            feels_like: Some(19.0),
            humidity: Some(50),
            uv_index,
            pollen_level,
            pollen_types: Vec::new(),
            captured_at: Utc.with_ymd_and_hms(2025, 9, 2, 7, 55, 0).unwrap(),
            weather_available: true,
        }
    }

    #[test]
    fn test_locked_alert_survives_dismiss() {
        // ---
        let mut s = store();
        assert!(s.ingest(&snapshot(160, 0.0, 0.0)));

        assert!(!s.dismiss());
        let current = s.current().unwrap();
        assert_eq!(current.category, AlertCategory::Wildfire);
        assert_eq!(current.severity, Severity::Danger);
    }

    #[test]
    fn test_dismiss_clears_current_but_keeps_history() {
        // ---
        let mut s = store();
        s.ingest(&snapshot(40, 0.0, 0.0));
        assert_eq!(s.current().unwrap().category, AlertCategory::Normal);

        assert!(s.dismiss());
        assert!(s.current().is_none());
        assert_eq!(s.history().count(), 1);
        assert_eq!(s.history().next().unwrap().category, AlertCategory::Normal);
    }

    #[test]
    fn test_dismiss_without_alert_is_noop() {
        // ---
        let mut s = store();
        assert!(!s.dismiss());
        assert!(s.current().is_none());
    }

    #[test]
    fn test_history_is_bounded_newest_first() {
        // ---
        let mut s = store();
        for _ in 0..11 {
            s.ingest(&snapshot(40, 0.0, 0.0));
        }

        let ids: Vec<&str> = s.history().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), HISTORY_LIMIT);
        assert_eq!(ids[0], "normal-10");
        assert_eq!(ids[9], "normal-1");
        assert!(!ids.contains(&"normal-0"));
    }

    #[test]
    fn test_history_is_not_deduplicated() {
        // ---
        let mut s = store();
        s.trigger(DemoScenario::Pollen);
        s.trigger(DemoScenario::Pollen);
        assert_eq!(s.history().count(), 2);
    }

    #[test]
    fn test_gap_leaves_current_unchanged() {
        // ---
        let mut s = store();
        s.ingest(&snapshot(120, 0.0, 0.0));
        let before = s.current().cloned();

        assert!(!s.ingest(&snapshot(75, 2.0, 3.0)));
        assert_eq!(s.current().cloned(), before);
        assert_eq!(s.history().count(), 1);
    }

    #[test]
    fn test_gap_on_empty_store_stays_empty() {
        // ---
        let mut s = store();
        s.ingest(&snapshot(75, 2.0, 3.0));
        assert!(s.current().is_none());
        assert_eq!(s.history().count(), 0);
    }

    #[test]
    fn test_set_none_does_not_touch_history() {
        // ---
        let mut s = store();
        s.trigger(DemoScenario::Normal);
        s.set_alert(None);
        assert!(s.current().is_none());
        assert_eq!(s.history().count(), 1);
    }

    #[test]
    fn test_new_alert_replaces_locked_alert() {
        // ---
        let mut s = store();
        s.trigger(DemoScenario::Wildfire);
        s.ingest(&snapshot(30, 0.0, 0.0));
        assert_eq!(s.current().unwrap().category, AlertCategory::Normal);
        assert!(s.dismiss());
    }

    #[test]
    fn test_manual_wildfire_ignores_live_conditions() {
        // ---
        let mut s = store();
        s.ingest(&snapshot(20, 0.0, 0.0));
        let alert = s.trigger(DemoScenario::Wildfire);

        assert!(!alert.dismissible);
        assert_eq!(s.current(), Some(&alert));
        assert!(!s.dismiss());
    }
}
