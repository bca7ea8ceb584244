//! Timesheet Overtime Allocation Engine server.
//!
//! Loads the rule set from `TIMESHEET_CONFIG_DIR` (default `./config/standard`)
//! and serves the calculation API on `TIMESHEET_BIND_ADDR`
//! (default `0.0.0.0:3000`).

use std::env;

use timesheet_engine::api::{create_router, AppState};
use timesheet_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/standard";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Initialize tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_dir = env::var("TIMESHEET_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let bind_addr = env::var("TIMESHEET_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        rule_set = %config.engine().name,
        version = %config.engine().version,
        shows = config.config().shows().len(),
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Timesheet engine listening");

    axum::serve(listener, router).await?;
    Ok(())
}
