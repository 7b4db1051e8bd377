//! Alert rule engine.
//!
//! Rules are checked in a fixed precedence order and the first match wins:
//!
//! | # | condition        | alert                        |
//! |---|------------------|------------------------------|
//! | 1 | AQI > 150        | wildfire / danger (locked)   |
//! | 2 | AQI > 100        | wildfire / warning           |
//! | 3 | pollen > 6       | pollen / warning             |
//! | 4 | pollen > 4       | pollen / info                |
//! | 5 | UV > 7           | uv / warning                 |
//! | 6 | AQI <= 50        | normal / info                |
//! | 7 | anything else    | no alert                     |
//!
//! The engine never touches the store; it only returns what it decided.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::clock::{Clock, IdSource};
use crate::models::{Alert, AlertCategory, EnvironmentalSnapshot, Severity};

// ---

const WILDFIRE_AQI: u32 = 150;
const UNHEALTHY_AQI: u32 = 100;
const CLEAR_AQI: u32 = 50;
const HIGH_POLLEN: f64 = 6.0;
const MODERATE_POLLEN: f64 = 4.0;
const HIGH_UV: f64 = 7.0;

/// Canned alerts that can be raised without live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoScenario {
    Normal,
    Pollen,
    Wildfire,
}

impl FromStr for DemoScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(DemoScenario::Normal),
            "pollen" => Ok(DemoScenario::Pollen),
            "wildfire" => Ok(DemoScenario::Wildfire),
            other => Err(format!("unknown demo scenario: {}", other)),
        }
    }
}

impl fmt::Display for DemoScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoScenario::Normal => write!(f, "normal"),
            DemoScenario::Pollen => write!(f, "pollen"),
            DemoScenario::Wildfire => write!(f, "wildfire"),
        }
    }
}

/// Classifies snapshots into alerts.
#[derive(Clone)]
pub struct RuleEngine {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
}

impl RuleEngine {
    // ---
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdSource>) -> Self {
        RuleEngine { clock, ids }
    }

    /// Select the single highest-priority alert for a snapshot, if any.
    pub fn evaluate(&self, data: &EnvironmentalSnapshot) -> Option<Alert> {
        // ---
        let now = self.clock.now();

        if data.aqi > WILDFIRE_AQI {
            return Some(self.wildfire_smoke(now));
        }

        if data.aqi > UNHEALTHY_AQI {
            return Some(Alert::new(
                self.ids.next_id("unhealthy", now),
                AlertCategory::Wildfire,
                Severity::Warning,
                "⚠️ Unhealthy Air Quality",
                format!("AQI is {} — Limit outdoor exposure", data.aqi),
                &[
                    "Reduce prolonged or heavy outdoor exertion",
                    "Sensitive groups should stay indoors",
                    "Keep windows closed",
                ],
                now,
            ));
        }

        if data.pollen_level > HIGH_POLLEN {
            return Some(self.high_pollen(now));
        }

        if data.pollen_level > MODERATE_POLLEN {
            let types = if data.pollen_types.is_empty() {
                "Mixed".to_string()
            } else {
                data.pollen_types.join(", ")
            };
            return Some(Alert::new(
                self.ids.next_id("pollen-moderate", now),
                AlertCategory::Pollen,
                Severity::Info,
                "Moderate Pollen Levels",
                format!("Pollen count: {:.1} — {}", data.pollen_level, types),
                &[
                    "Allergy sufferers may want to take precautions",
                    "Best times: early morning or after rain",
                ],
                now,
            ));
        }

        if data.uv_index > HIGH_UV {
            return Some(Alert::new(
                self.ids.next_id("uv", now),
                AlertCategory::Uv,
                Severity::Warning,
                "☀️ High UV Index",
                format!("UV Index: {:.1} — Protect your skin", data.uv_index),
                &[
                    "Apply SPF 30+ sunscreen",
                    "Wear hat and sunglasses",
                    "Seek shade between 10 AM - 4 PM",
                ],
                now,
            ));
        }

        if data.aqi <= CLEAR_AQI {
            return Some(self.all_clear(now));
        }

        None
    }

    /// Raise a canned alert, independent of any live snapshot.
    pub fn trigger(&self, scenario: DemoScenario) -> Alert {
        // ---
        let now = self.clock.now();
        match scenario {
            DemoScenario::Normal => self.all_clear(now),
            DemoScenario::Pollen => self.high_pollen(now),
            DemoScenario::Wildfire => self.wildfire_smoke(now),
        }
    }

    fn wildfire_smoke(&self, now: DateTime<Utc>) -> Alert {
        Alert::new(
            self.ids.next_id("wildfire", now),
            AlertCategory::Wildfire,
            Severity::Danger,
            "🔥 WILDFIRE SMOKE ALERT",
            "UNHEALTHY AIR QUALITY — Stay Indoors".to_string(),
            &[
                "DO NOT exercise outdoors",
                "Keep all windows and doors closed",
                "Run air purifiers on highest setting",
                "Wear N95 masks if you must go outside",
                "Check on elderly and sensitive individuals",
                "Monitor air quality frequently",
            ],
            now,
        )
    }

    fn high_pollen(&self, now: DateTime<Utc>) -> Alert {
        Alert::new(
            self.ids.next_id("pollen", now),
            AlertCategory::Pollen,
            Severity::Warning,
            "⚠️ High Pollen Alert",
            "Elevated pollen levels detected in your area.".to_string(),
            &[
                "Take allergy medication before going outside",
                "Keep windows closed during peak hours (6-10 AM)",
                "Shower and change clothes after outdoor activities",
                "Consider wearing a mask outdoors",
            ],
            now,
        )
    }

    fn all_clear(&self, now: DateTime<Utc>) -> Alert {
        Alert::new(
            self.ids.next_id("normal", now),
            AlertCategory::Normal,
            Severity::Info,
            "All Clear",
            "Air quality is excellent. Perfect for outdoor activities!".to_string(),
            &[
                "Great day for jogging, cycling, or hiking",
                "No health precautions needed",
                "Enjoy the fresh air!",
            ],
            now,
        )
    }
}
