//! Black-box checks against a running deployment.
//!
//! Set `BASE_URL` (e.g. `http://localhost:8080`) to run them; without it the
//! tests return early. Tests that change the deployment's alert store take
//! [`DEPLOYMENT`] so they never interleave.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

static DEPLOYMENT: Mutex<()> = Mutex::const_new(());

#[derive(Debug, Deserialize)]
struct AlertView {
    category: String,
    severity: String,
    dismissible: bool,
}

#[derive(Debug, Deserialize)]
struct AlertsView {
    current: Option<AlertView>,
    history: Vec<AlertView>,
    overlay: bool,
}

fn base_url() -> Option<String> {
    // ---
    match std::env::var("BASE_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("BASE_URL not set, skipping");
            None
        }
    }
}

#[tokio::test]
async fn health_endpoint_ok() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };

    let resp = Client::new().get(format!("{}/health", base)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn wildfire_demo_locks_the_screen() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };
    let _serial = DEPLOYMENT.lock().await;
    let client = Client::new();

    let alert: AlertView = client
        .post(format!("{}/api/alerts/demo/wildfire", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(alert.category, "wildfire");
    assert_eq!(alert.severity, "danger");
    assert!(!alert.dismissible);

    let view: AlertsView = client
        .post(format!("{}/api/alerts/dismiss", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(view.overlay, "wildfire alert should survive dismiss");
    assert!(view.current.is_some());
    assert!(view.history.len() <= 10, "history exceeded 10 entries");

    // Clear the lock so the deployment is left usable
    client
        .post(format!("{}/api/alerts/demo/normal", base))
        .send()
        .await?;

    Ok(())
}

#[tokio::test]
async fn history_is_bounded() -> Result<()> {
    // ---
    let Some(base) = base_url() else { return Ok(()) };
    let _serial = DEPLOYMENT.lock().await;
    let client = Client::new();

    for _ in 0..12 {
        client
            .post(format!("{}/api/alerts/demo/pollen", base))
            .send()
            .await?;
    }

    let view: AlertsView = client.get(format!("{}/api/alerts", base)).send().await?.json().await?;
    // A timer refresh may land between the triggers, so only the bound and
    // the presence of the triggered alerts are stable
    assert_eq!(view.history.len(), 10);
    assert!(view.history.iter().any(|a| a.category == "pollen"));

    Ok(())
}
