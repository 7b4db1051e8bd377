//! Configuration loader for the `codemetal-envwatch` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Placeholder value shipped in the sample `.env`; treated as "not configured".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// OpenWeatherMap API key. `None` when unset or left at the placeholder.
    pub api_key: Option<String>,

    /// OpenWeatherMap data API base URL.
    pub api_url: String,

    /// Display name of the monitored city.
    pub city_name: String,

    pub city_lat: f64,
    pub city_lon: f64,

    /// Offset of the city's local time from UTC, in hours.
    pub utc_offset_hours: i32,

    /// Seconds between automatic refreshes.
    pub refresh_interval_secs: u64,

    /// HTTP port the dashboard API listens on.
    pub listen_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `OPENWEATHERMAP_API_KEY` – provider key (fetches fail with a
///   configuration error while unset)
/// - `OWM_BASE_URL` – provider base URL (default: OpenWeatherMap 2.5)
/// - `CITY_NAME`, `CITY_LAT`, `CITY_LON` – monitored city (default: San Jose)
/// - `CITY_UTC_OFFSET` – local offset in hours (default: -8)
/// - `REFRESH_INTERVAL_SECS` – auto-refresh period (default: 300)
/// - `LISTEN_PORT` – API port (default: 8080)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_key = env::var("OPENWEATHERMAP_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != API_KEY_PLACEHOLDER);
    let api_url = env::var("OWM_BASE_URL")
        .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5".to_string());
    let city_name = env::var("CITY_NAME").unwrap_or_else(|_| "San Jose".to_string());
    let city_lat = parse_env!("CITY_LAT", f64, 37.3382);
    let city_lon = parse_env!("CITY_LON", f64, -121.8863);
    let utc_offset_hours = parse_env!("CITY_UTC_OFFSET", i32, -8);
    let refresh_interval_secs = parse_env!("REFRESH_INTERVAL_SECS", u64, 300);
    let listen_port = parse_env!("LISTEN_PORT", u16, 8080);

    if refresh_interval_secs == 0 {
        return Err(anyhow!("Invalid REFRESH_INTERVAL_SECS: must be greater than 0"));
    }

    Ok(Config {
        api_key,
        api_url: api_url.trim_end_matches('/').to_string(),
        city_name,
        city_lat,
        city_lon,
        utc_offset_hours,
        refresh_interval_secs,
        listen_port,
    })
}

impl Config {
    // ---
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the API key while showing all other values that were loaded.
    pub fn log_config(&self) {
        // ---
        let masked_key = match self.api_key.as_deref() {
            Some(key) if key.len() > 4 => format!("****{}", &key[key.len() - 4..]),
            Some(_) => "****".to_string(),
            None => "<not configured>".to_string(),
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  OPENWEATHERMAP_API_KEY : {}", masked_key);
        tracing::info!("  OWM_BASE_URL           : {}", self.api_url);
        tracing::info!(
            "  CITY                   : {} ({}, {})",
            self.city_name,
            self.city_lat,
            self.city_lon
        );
        tracing::info!("  CITY_UTC_OFFSET        : {}", self.utc_offset_hours);
        tracing::info!("  REFRESH_INTERVAL_SECS  : {}", self.refresh_interval_secs);
        tracing::info!("  LISTEN_PORT            : {}", self.listen_port);
    }
}

#[cfg(test)]
impl Config {
    /// Configuration pointing at `api_url` with a dummy key.
    pub fn for_tests(api_url: &str) -> Self {
        Config {
            api_key: Some("test-key".to_string()),
            api_url: api_url.to_string(),
            city_name: "San Jose".to_string(),
            city_lat: 37.3382,
            city_lon: -121.8863,
            utc_offset_hours: -8,
            refresh_interval_secs: 300,
            listen_port: 0,
        }
    }
}
