//! Application entry point for the `codemetal-envwatch` backend service.
//!
//! This binary orchestrates the full startup sequence for the environmental
//! monitoring dashboard API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the OpenWeatherMap provider and the alert store
//! - Starting the periodic refresh loop (which also performs the initial fetch)
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `OPENWEATHERMAP_API_KEY` – provider key (see `config` for the rest)
//! - `ENVWATCH_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `ENVWATCH_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module follows the Explicit Module Boundary Pattern (EMBP) by
//! delegating configuration parsing to `config`, alert logic to `alerts`,
//! polling to `refresh`, and route registration to `routes`.
use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use parking_lot::Mutex;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod alerts;
mod aqi;
mod config;
mod forecast;
mod models;
mod parks;
mod provider;
mod refresh;
mod routes;

pub use config::Config;

use alerts::{AlertStore, RuleEngine, SystemClock, TimestampIds};
use provider::OpenWeatherMap;
use refresh::{DashboardState, RefreshController};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    if cfg.api_key.is_none() {
        tracing::warn!("OPENWEATHERMAP_API_KEY is not set; every refresh will report a configuration error");
    }

    let engine = RuleEngine::new(Arc::new(SystemClock), Arc::new(TimestampIds::default()));
    let state = Arc::new(Mutex::new(DashboardState::new(AlertStore::new(engine))));
    let provider = Arc::new(OpenWeatherMap::new(cfg.clone()));
    let controller = RefreshController::new(provider, state);

    tokio::spawn(controller.clone().run(cfg.refresh_interval()));

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(routes::AppState {
        controller,
        city_name: cfg.city_name.clone(),
        utc_offset_hours: cfg.utc_offset_hours,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `ENVWATCH_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, else the `ENVWATCH_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("ENVWATCH_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("ENVWATCH_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
