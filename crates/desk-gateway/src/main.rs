//! Deskbot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p desk-gateway -- --token <TOKEN>
//! ```
//!
//! Everything except the token is configured through environment variables
//! (a `.env` file is honoured).

use clap::Parser;
use desk_common::{try_init_tracing_with_config, AppConfig, AppResult, TracingConfig};
use tracing::{error, info};

/// Private voice desks for every guild member
#[derive(Parser)]
#[command(name = "deskbot", version)]
#[command(about = "Gives every guild member a private voice desk that opens up while occupied")]
struct Cli {
    /// Bot token
    #[arg(short, long, env = "DESK_BOT_TOKEN", hide_env_values = true)]
    token: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_settings(&config.app)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config, cli.token).await {
        error!(error = %e, code = e.error_code(), "Deskbot stopped");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig, token: String) -> AppResult<()> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        "Starting deskbot..."
    );

    tokio::select! {
        result = desk_gateway::run(config, token) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
    }
}
