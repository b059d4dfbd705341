//! Connection management
//!
//! Runs gateway sessions back to back, identifying anew after each one ends.

mod heartbeat;
mod session;

pub use heartbeat::{first_beat_delay, HeartbeatState};
pub use session::{close_error, GatewaySession};

use std::time::Duration;

use desk_common::AppResult;
use desk_service::DeskContext;
use tracing::{error, info, warn};

use crate::events::EventDecoder;

/// Keep a gateway session alive until a fatal error
///
/// Every recoverable ending is followed by `reconnect_delay` and a fresh
/// IDENTIFY; the READY that follows rebuilds all shared state.
pub async fn run_sessions(
    url: &str,
    token: &str,
    ctx: &DeskContext,
    reconnect_delay: Duration,
) -> AppResult<()> {
    let decoder = EventDecoder::new();
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        info!(attempt, "Opening gateway session");
        match GatewaySession::new(url, token, ctx, &decoder).run().await {
            Ok(()) => warn!("Gateway stream ended"),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, code = e.error_code(), "Gateway session ended");
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Gateway refused the bot");
                return Err(e);
            }
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}
