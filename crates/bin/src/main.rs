//! domed - dome arcade node.
//!
//! Usage: `domed [config.toml]` (defaults to `dome.toml`).

use anyhow::anyhow;
use engine::{Config, Role};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Dome arcade v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate().map_err(|e| anyhow!("Invalid configuration: {e}"))?;
    info!("Loaded configuration");
    info!("  Role: {:?}", config.node.role);
    info!("  Frame rate: {}", config.node.frame_rate);
    info!("  Session: {}s, start {:?}", config.session.max_time, config.session.start);

    match config.node.role {
        Role::Master => {
            info!("  Relay: {}", config.relay.url);
            info!("  Sync bind: {}", config.node.sync_bind);
            engine::run_master(config).await?;
        }
        Role::Client => {
            info!("  Master: {}", config.node.master_addr);
            engine::run_client(config).await?;
        }
    }

    Ok(())
}
