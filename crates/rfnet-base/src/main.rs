//! rfnet base station - entry point.

use anyhow::Result;
use clap::Parser;
use rfnet_base::{BaseConfig, BaseError, BaseStation, SHUTDOWN_GRACE};
use rfnet_core::FrameDecoder;
use rfnet_uplink::Uplink;
use tracing::info;

/// Radio base station for rfnet sensors
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via RFNET_BASE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Radio character device (overrides the config file)
    #[arg(short, long)]
    device: Option<String>,

    /// Collector base URL (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    rfnet_telemetry::init_logging()?;

    rfnet_base::block_on_bounded(run(args), SHUTDOWN_GRACE)?
}

async fn run(args: Args) -> Result<()> {
    info!("Starting rfnet base station v{}", env!("CARGO_PKG_VERSION"));

    let config = BaseConfig::resolve(args.config)?.with_overrides(args.device, args.endpoint);
    config.validate()?;
    info!(
        device = %config.device,
        float_policy = ?config.float_policy,
        "Configuration loaded"
    );

    let device = tokio::fs::File::open(&config.device)
        .await
        .map_err(|source| BaseError::DeviceOpen {
            path: config.device.clone(),
            source,
        })?;
    let uplink = Uplink::from_config(&config.uplink())?;
    let station = BaseStation::new(
        device,
        FrameDecoder::new(config.float_policy),
        uplink,
        config.read_buffer_len,
    );

    tokio::select! {
        result = station.run() => {
            let stats = result?;
            info!(?stats, "Base station stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
        }
    }

    Ok(())
}
