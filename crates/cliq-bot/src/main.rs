//! Clip liquidation bot - entry point.
//!
//! Sells the configured base-asset balance into quote currency as a
//! sequence of bounded IOC clips with randomized pauses in between.

use anyhow::Result;
use clap::Parser;
use cliq_bot::AppConfig;
use cliq_engine::{Liquidator, RunOutcome};
use cliq_exchange::{ApiCredentials, BinanceClient};
use std::time::Duration;
use tracing::{error, info};

/// Clip liquidation bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CLIQ_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    cliq_bot::logging::init_logging()?;

    info!("Starting cliq-bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > CLIQ_CONFIG env var > default
    let config = match args.config {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            AppConfig::from_file(&path)?
        }
        None => AppConfig::load()?,
    };
    info!(
        symbol = %config.trading.symbol,
        base_url = %config.exchange.base_url,
        "Configuration loaded"
    );

    let credentials = ApiCredentials::from_env()?;
    let client = BinanceClient::with_timeout(
        config.exchange.base_url.clone(),
        credentials,
        config.exchange.recv_window_ms,
        Duration::from_secs(config.exchange.request_timeout_secs),
    )?;

    let mut liquidator = Liquidator::new(
        client,
        Box::new(config.delay_source()),
        config.liquidator_config(),
    );

    let report = match liquidator.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Liquidation run failed");
            return Err(e.into());
        }
    };

    match &report.outcome {
        RunOutcome::AbortedMaintenance { details } => {
            info!(details = %details, "Run aborted: asset under maintenance");
        }
        RunOutcome::Completed => {
            let filled = report.clips.iter().filter(|c| c.is_filled()).count();
            info!(
                clips = report.clips.len(),
                filled,
                total_delay_ms = report.total_delay.as_millis() as u64,
                "Run complete"
            );
        }
    }

    Ok(())
}
