//! rfnet collector - entry point.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rfnet_collector::{AppState, CollectorConfig};
use rfnet_persistence::SqliteStore;
use tracing::info;

/// Sensor reading collector
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via RFNET_COLLECTOR_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    rfnet_telemetry::init_logging()?;

    info!("Starting rfnet collector v{}", env!("CARGO_PKG_VERSION"));

    let config = CollectorConfig::resolve(args.config)?;
    info!(port = config.port, db_path = %config.db_path, "Configuration loaded");

    let store = SqliteStore::open(&config.db_path)?;
    let state = AppState::new(Arc::new(store), config);

    rfnet_collector::run_server(state).await?;

    info!("Collector stopped");
    Ok(())
}
