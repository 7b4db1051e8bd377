//! Environmental data provider.
//!
//! [`SnapshotProvider`] is the seam between the refresh controller and the
//! outside world; [`OpenWeatherMap`] is the production implementation.

use std::future::Future;

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::forecast::{self, DailyForecast, RawForecast};
use crate::models::{self, EnvironmentReport, RawAirPollution, RawWeather};
use crate::parks::Park;
use crate::Config;

// ---

/// Failures on the fetch path. `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("OpenWeatherMap API key not configured. Please add OPENWEATHERMAP_API_KEY to your .env file.")]
    Unconfigured,
    #[error("Invalid OpenWeatherMap API key. Please check your OPENWEATHERMAP_API_KEY.")]
    InvalidKey,
    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Unable to reach the weather service: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Weather service returned HTTP {0}")]
    Http(u16),
    #[error("Unexpected response from weather service: {0}")]
    Parse(String),
}

/// Source of environmental readings.
pub trait SnapshotProvider: Send + Sync + 'static {
    /// Current conditions plus recent trends for the monitored city.
    fn fetch_environment(
        &self,
    ) -> impl Future<Output = Result<EnvironmentReport, ProviderError>> + Send;

    /// PM2.5 concentration at each park, keyed by park id.
    fn fetch_park_readings(
        &self,
        parks: &'static [Park],
    ) -> impl Future<Output = Result<Vec<(&'static str, f64)>, ProviderError>> + Send;

    fn fetch_forecast(
        &self,
    ) -> impl Future<Output = Result<Vec<DailyForecast>, ProviderError>> + Send;
}

pub struct OpenWeatherMap {
    // ---
    client: Client,
    config: Config,
}

impl OpenWeatherMap {
    // ---
    pub fn new(config: Config) -> Self {
        OpenWeatherMap {
            client: Client::new(),
            config,
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config.api_key.as_deref().ok_or(ProviderError::Unconfigured)
    }

    fn location_query(&self, key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.config.city_lat.to_string()),
            ("lon", self.config.city_lon.to_string()),
            ("appid", key.to_string()),
        ]
    }
}

/// GET a JSON document, mapping provider status codes onto [`ProviderError`].
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ProviderError> {
    // ---
    debug!("Fetching {}", url);

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(ProviderError::Network)?;

    match response.status() {
        StatusCode::UNAUTHORIZED => return Err(ProviderError::InvalidKey),
        StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
        s if !s.is_success() => return Err(ProviderError::Http(s.as_u16())),
        _ => {}
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

impl SnapshotProvider for OpenWeatherMap {
    // ---
    async fn fetch_environment(&self) -> Result<EnvironmentReport, ProviderError> {
        // ---
        let key = self.api_key()?;
        let base = &self.config.api_url;
        let captured_at = Utc::now();

        let location = self.location_query(key);
        let mut weather_query = location.clone();
        weather_query.push(("units", "metric".to_string()));
        let mut history_query = location.clone();
        history_query.push(("start", (captured_at - Duration::hours(24)).timestamp().to_string()));
        history_query.push(("end", captured_at.timestamp().to_string()));

        let air_url = format!("{}/air_pollution", base);
        let weather_url = format!("{}/weather", base);
        let history_url = format!("{}/air_pollution/history", base);

        let (air, weather, history) = tokio::try_join!(
            get_json::<RawAirPollution>(&self.client, &air_url, &location),
            get_json::<RawWeather>(&self.client, &weather_url, &weather_query),
            get_json::<RawAirPollution>(&self.client, &history_url, &history_query),
        )?;

        let sample = air
            .list
            .first()
            .ok_or_else(|| ProviderError::Parse("air pollution list is empty".to_string()))?;

        let local_now =
            (captured_at + Duration::hours(self.config.utc_offset_hours as i64)).naive_utc();
        let current = models::to_snapshot(sample, &weather, local_now, captured_at);
        let trends = models::to_trends(&history.list);

        info!(
            aqi = current.aqi,
            pm25 = current.pm25,
            uv = current.uv_index,
            pollen = current.pollen_level,
            "Fetched conditions for {}",
            self.config.city_name
        );

        Ok(EnvironmentReport { current, trends })
    }

    async fn fetch_park_readings(
        &self,
        parks: &'static [Park],
    ) -> Result<Vec<(&'static str, f64)>, ProviderError> {
        // ---
        let key = self.api_key()?.to_string();
        let url = format!("{}/air_pollution", self.config.api_url);

        let mut tasks = JoinSet::new();
        for park in parks {
            let client = self.client.clone();
            let url = url.clone();
            let query = vec![
                ("lat", park.lat.to_string()),
                ("lon", park.lon.to_string()),
                ("appid", key.clone()),
            ];
            tasks.spawn(async move {
                let air: RawAirPollution = get_json(&client, &url, &query).await?;
                let sample = air.list.first().ok_or_else(|| {
                    ProviderError::Parse(format!("no air sample for park {}", park.id))
                })?;
                Ok::<_, ProviderError>((park.id, sample.components.pm2_5))
            });
        }

        let mut readings = Vec::with_capacity(parks.len());
        while let Some(joined) = tasks.join_next().await {
            let reading = joined.map_err(|e| ProviderError::Parse(e.to_string()))??;
            readings.push(reading);
        }

        info!("Fetched air quality for {} parks", readings.len());
        Ok(readings)
    }

    async fn fetch_forecast(&self) -> Result<Vec<DailyForecast>, ProviderError> {
        // ---
        let key = self.api_key()?;
        let base = &self.config.api_url;

        let location = self.location_query(key);
        let mut weather_query = location.clone();
        weather_query.push(("units", "metric".to_string()));

        let weather_url = format!("{}/forecast", base);
        let air_url = format!("{}/air_pollution/forecast", base);

        let (weather, air) = tokio::try_join!(
            get_json::<RawForecast>(&self.client, &weather_url, &weather_query),
            get_json::<RawAirPollution>(&self.client, &air_url, &location),
        )?;

        Ok(forecast::summarize(&weather, &air.list))
    }
}
