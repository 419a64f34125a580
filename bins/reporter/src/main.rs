//! Costline reporter.
//!
//! Replays a project scenario file through the budget engine using in-memory
//! collaborators and prints the budget summary and cost suggestion as JSON.
//!
//! Usage: `costline-reporter <scenario.json>`

mod logging;
mod scenario;

use anyhow::Context;
use costline_shared::{AppConfig, AppError};
use tracing::info;

use scenario::Scenario;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init(&config.logging);

    let path = std::env::args()
        .nth(1)
        .context("usage: costline-reporter <scenario.json>")?;
    let raw =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read scenario {path}"))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("invalid scenario file {path}"))?;

    info!(project_id = %scenario.project_id, %path, "Replaying scenario");
    let report = scenario::replay(scenario, &config.engine)
        .await
        .map_err(AppError::from)
        .context("scenario replay failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
