//! Bot setup
//!
//! Wires the REST client and the service context together and runs the
//! gateway until shutdown or a fatal error.

use std::sync::Arc;

use desk_common::{AppConfig, AppResult};
use desk_service::{DeskContext, DeskContextBuilder, OccupancyTracker};
use tracing::info;

use crate::connection::run_sessions;
use crate::http::HttpPlatformClient;

/// Initialize all dependencies and create the `DeskContext`
pub fn create_context(config: &AppConfig, token: &str) -> AppResult<DeskContext> {
    let client = HttpPlatformClient::new(&config.discord.api_base_url, token)?;
    info!(api = %config.discord.api_base_url, "REST client ready");

    let ctx = DeskContextBuilder::new()
        .client(Arc::new(client))
        .occupancy(Arc::new(OccupancyTracker::new()))
        .settings(config.desk.clone())
        .build()?;
    Ok(ctx)
}

/// Run the bot with configuration
///
/// Only returns on a fatal gateway error or a configuration problem.
pub async fn run(config: AppConfig, token: String) -> AppResult<()> {
    let ctx = create_context(&config, &token)?;

    info!(
        category = %config.desk.category_name,
        announce = config.desk.announce_new_desks,
        "Desk engine configured"
    );

    run_sessions(
        &config.discord.gateway_url,
        &token,
        &ctx,
        config.discord.reconnect_delay(),
    )
    .await
}
