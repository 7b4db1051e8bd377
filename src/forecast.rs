//! Five-day outlook built from the weather and air-pollution forecasts.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aqi;
use crate::models::RawAirSample;

// ---

const MAX_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct RawForecast {
    pub list: Vec<RawForecastEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RawForecastEntry {
    pub dt: i64,
    pub main: RawForecastMain,
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
pub struct RawForecastMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawCondition {
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub avg_aqi: u32,
    pub avg_temp: i32,
    pub conditions: String,
}

#[derive(Default)]
struct DayAccumulator {
    temps: Vec<f64>,
    aqis: Vec<u32>,
    conditions: Vec<String>,
}

fn utc_date(dt: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(dt, 0).map(|t| t.date_naive())
}

/// Group forecast entries by UTC date and average them.
///
/// Days come from the weather forecast; air samples for days outside it are
/// ignored. A day with no air samples reports AQI 0.
pub fn summarize(weather: &RawForecast, air: &[RawAirSample]) -> Vec<DailyForecast> {
    // ---
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for entry in &weather.list {
        let Some(date) = utc_date(entry.dt) else { continue };
        let day = days.entry(date).or_default();
        day.temps.push(entry.main.temp);
        if let Some(cond) = entry.weather.first() {
            day.conditions.push(cond.main.clone());
        }
    }

    for sample in air {
        if let Some(day) = utc_date(sample.dt).and_then(|d| days.get_mut(&d)) {
            day.aqis.push(aqi::classify(sample.components.pm2_5));
        }
    }

    days.into_iter()
        .take(MAX_DAYS)
        .map(|(date, day)| {
            let avg_aqi = if day.aqis.is_empty() {
                0
            } else {
                let sum: u32 = day.aqis.iter().sum();
                (sum as f64 / day.aqis.len() as f64).round() as u32
            };
            let avg_temp = (day.temps.iter().sum::<f64>() / day.temps.len() as f64).round() as i32;
            let conditions = day
                .conditions
                .get(day.conditions.len() / 2)
                .cloned()
                .unwrap_or_else(|| "Clear".to_string());

            DailyForecast {
                date,
                avg_aqi,
                avg_temp,
                conditions,
            }
        })
        .collect()
}
