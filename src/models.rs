//! Data models for the environmental dashboard.
//!
//! Raw provider payloads (`Raw*`) are deserialized straight from the
//! OpenWeatherMap responses and transformed into the immutable
//! [`EnvironmentalSnapshot`] that the alert core consumes.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::aqi;

// ---

/// One immutable read of environmental conditions.
///
/// Produced exactly once per successful fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalSnapshot {
    // ---
    pub aqi: u32,
    pub pm25: f64,
    pub pm10: f64,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<u8>,
    pub uv_index: f64,
    pub pollen_level: f64,
    pub pollen_types: Vec<String>,
    pub captured_at: DateTime<Utc>,
    pub weather_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pm25Point {
    pub time: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiPoint {
    pub time: DateTime<Utc>,
    pub aqi: u32,
}

/// Recent history used by the charts and the exercise-window finder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trends {
    pub pm25: Vec<Pm25Point>,
    pub aqi: Vec<AqiPoint>,
}

/// Result of one successful provider read: the current snapshot plus trends.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentReport {
    pub current: EnvironmentalSnapshot,
    pub trends: Trends,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Alert topic. Distinct from the air-quality tiers in [`aqi::AqiCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Normal,
    Pollen,
    Wildfire,
    Heat,
    Uv,
}

/// Alert urgency, ordered `Info < Warning < Danger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    // ---
    pub id: String,
    pub category: AlertCategory,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub active: bool,
    pub dismissible: bool,
}

impl Alert {
    // ---
    /// Build an active alert.
    ///
    /// Dismissibility is derived here and nowhere else: a wildfire alert at
    /// danger severity can never be dismissed, every other alert can.
    pub fn new(
        id: String,
        category: AlertCategory,
        severity: Severity,
        title: &str,
        message: String,
        recommendations: &[&str],
        timestamp: DateTime<Utc>,
    ) -> Self {
        // ---
        let dismissible = !(category == AlertCategory::Wildfire && severity == Severity::Danger);

        Alert {
            id,
            category,
            severity,
            title: title.to_string(),
            message,
            recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
            timestamp,
            active: true,
            dismissible,
        }
    }

    /// True when the alert must take exclusive control of the screen.
    pub fn takes_over_screen(&self) -> bool {
        self.category == AlertCategory::Wildfire
            && self.severity == Severity::Danger
            && !self.dismissible
    }

    /// True for anything above informational.
    pub fn needs_attention(&self) -> bool {
        self.severity > Severity::Info
    }
}

// ---------------------------------------------------------------------------
// Raw OpenWeatherMap payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawAirPollution {
    pub list: Vec<RawAirSample>,
}

#[derive(Debug, Deserialize)]
pub struct RawAirSample {
    pub components: RawComponents,
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawComponents {
    pub pm2_5: f64,
    pub pm10: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawWeather {
    pub main: RawWeatherMain,
    pub clouds: RawClouds,
}

#[derive(Debug, Deserialize)]
pub struct RawWeatherMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub struct RawClouds {
    pub all: u8,
}

impl RawAirSample {
    // ---
    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.dt, 0).unwrap_or_default()
    }
}

/// Transform the current air sample and weather into a snapshot.
///
/// `local_now` is wall-clock time at the monitored city and drives the UV
/// and pollen estimates; `captured_at` is stamped on the snapshot.
pub fn to_snapshot(
    air: &RawAirSample,
    weather: &RawWeather,
    local_now: NaiveDateTime,
    captured_at: DateTime<Utc>,
) -> EnvironmentalSnapshot {
    // ---
    let pm25 = air.components.pm2_5;
    let uv_index = estimate_uv_index(local_now.hour(), weather.clouds.all);
    let (pollen_level, pollen_types) = estimate_pollen(local_now.month0(), weather.main.humidity);

    EnvironmentalSnapshot {
        aqi: aqi::classify(pm25),
        pm25,
        pm10: air.components.pm10,
        temperature: Some(weather.main.temp),
        feels_like: Some(weather.main.feels_like),
        humidity: Some(weather.main.humidity),
        uv_index,
        pollen_level,
        pollen_types,
        captured_at,
        weather_available: true,
    }
}

/// Build chart trends from air-pollution history (oldest first).
pub fn to_trends(history: &[RawAirSample]) -> Trends {
    // ---
    let tail = |n: usize| &history[history.len().saturating_sub(n)..];

    Trends {
        pm25: tail(12)
            .iter()
            .map(|s| Pm25Point {
                time: s.time(),
                value: s.components.pm2_5,
            })
            .collect(),
        aqi: tail(24)
            .iter()
            .map(|s| AqiPoint {
                time: s.time(),
                aqi: aqi::classify(s.components.pm2_5),
            })
            .collect(),
    }
}

/// Estimate the UV index from local hour and cloud cover (percent).
///
/// Sine curve over daylight hours 6..=18 peaking at 10, attenuated by up to
/// 75% under full cloud cover.
pub fn estimate_uv_index(hour: u32, cloud_cover: u8) -> f64 {
    // ---
    const PEAK_UV: f64 = 10.0;

    if !(6..=18).contains(&hour) {
        return 0.0;
    }
    let hour_factor = (((hour as f64 - 6.0) / 12.0) * std::f64::consts::PI).sin();
    let cloud_factor = 1.0 - (cloud_cover as f64 / 100.0) * 0.75;
    round_tenth(PEAK_UV * hour_factor * cloud_factor)
}

/// Estimate pollen level and dominant types from the season.
///
/// `month0` is zero-based (January = 0). Higher humidity suppresses pollen.
pub fn estimate_pollen(month0: u32, humidity: u8) -> (f64, Vec<String>) {
    // ---
    let (base, types): (f64, &[&str]) = match month0 {
        1..=4 => (5.0, &["Tree", "Oak"]),
        5..=7 => (3.5, &["Grass"]),
        8..=10 => (2.5, &["Ragweed"]),
        _ => (0.75, &[]),
    };
    let level = base * (1.0 - humidity as f64 / 200.0);
    (round_tenth(level), types.iter().map(|t| t.to_string()).collect())
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn sample(pm25: f64, dt: i64) -> RawAirSample {
        // ---
        RawAirSample {
            components: RawComponents { pm2_5: pm25, pm10: pm25 * 1.5 },
            dt,
        }
    }

    fn weather(humidity: u8, clouds: u8) -> RawWeather {
        // ---
        RawWeather {
            main: RawWeatherMain {
                temp: 21.5,
                feels_like: 20.9,
                humidity,
            },
            clouds: RawClouds { all: clouds },
        }
    }

    fn local(month: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_wildfire_danger_is_never_dismissible() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let fire = Alert::new(
            "wildfire-1".into(),
            AlertCategory::Wildfire,
            Severity::Danger,
            "smoke",
            String::new(),
            &[],
            now,
        );
        assert!(!fire.dismissible);
        assert!(fire.takes_over_screen());

        let warn = Alert::new(
            "unhealthy-1".into(),
            AlertCategory::Wildfire,
            Severity::Warning,
            "unhealthy",
            String::new(),
            &[],
            now,
        );
        assert!(warn.dismissible);
        assert!(!warn.takes_over_screen());
        assert!(warn.needs_attention());
    }

    #[test]
    fn test_severity_ordering() {
        // ---
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Danger);
    }

    #[test]
    fn test_snapshot_transformation() {
        // ---
        let captured = Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap();
        let snap = to_snapshot(&sample(12.0, 0), &weather(40, 0), local(3, 12), captured);

        assert_eq!(snap.aqi, 50);
        assert_eq!(snap.pm10, 18.0);
        assert_eq!(snap.temperature, Some(21.5));
        assert_eq!(snap.humidity, Some(40));
        assert_eq!(snap.uv_index, 10.0);
        // Spring: 5.0 * (1 - 40/200)
        assert_eq!(snap.pollen_level, 4.0);
        assert_eq!(snap.pollen_types, vec!["Tree", "Oak"]);
        assert_eq!(snap.captured_at, captured);
        assert!(snap.weather_available);
    }

    #[test]
    fn test_uv_estimate() {
        // ---
        assert_eq!(estimate_uv_index(3, 0), 0.0);
        assert_eq!(estimate_uv_index(22, 0), 0.0);
        assert_eq!(estimate_uv_index(12, 0), 10.0);
        assert_eq!(estimate_uv_index(12, 100), 2.5);
        assert_eq!(estimate_uv_index(9, 0), 7.1);
    }

    #[test]
    fn test_pollen_estimate_by_season() {
        // ---
        assert_eq!(estimate_pollen(0, 0), (0.8, vec![]));
        assert_eq!(estimate_pollen(6, 0), (3.5, vec!["Grass".to_string()]));
        assert_eq!(estimate_pollen(9, 100), (1.3, vec!["Ragweed".to_string()]));
    }

    #[test]
    fn test_trends_keep_most_recent_points() {
        // ---
        let history: Vec<RawAirSample> = (0..30).map(|i| sample(i as f64, i * 3600)).collect();
        let trends = to_trends(&history);

        assert_eq!(trends.pm25.len(), 12);
        assert_eq!(trends.aqi.len(), 24);
        assert_eq!(trends.pm25[0].value, 18.0);
        assert_eq!(trends.pm25[11].value, 29.0);
        assert_eq!(trends.aqi[23].time.timestamp(), 29 * 3600);
    }

    #[test]
    fn test_trends_with_short_history() {
        // ---
        let history = vec![sample(5.0, 0), sample(6.0, 3600)];
        let trends = to_trends(&history);
        assert_eq!(trends.pm25.len(), 2);
        assert_eq!(trends.aqi.len(), 2);
    }
}
