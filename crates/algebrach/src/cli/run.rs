//! Command handlers.

use algebrach::{AlgebrachResult, BotServer, Settings, check_health};
use tracing::info;

/// Handle the `run` command.
pub async fn run_bot() -> AlgebrachResult<()> {
    let settings = Settings::load()?;
    info!(app = %settings.app_name, environment = %settings.environment, "Starting. Press Ctrl+C to stop.");
    BotServer::from_settings(settings).run().await
}

/// Handle the `health` command; true when the kek base answered.
pub async fn check_once() -> AlgebrachResult<bool> {
    let server = BotServer::from_settings(Settings::load()?);
    let report = check_health(server.storage()).await;
    println!("{}", report.body);
    server.storage().shutdown(false).await;
    Ok(report.is_healthy())
}
