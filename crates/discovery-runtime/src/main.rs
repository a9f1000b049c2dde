//! Discovery backend executable.

use anyhow::{Context, Result};
use discovery_runtime::{init_tracing, load_config, DiscoveryRuntime};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("loading configuration")?;

    init_tracing(&config.logging)
        .map_err(anyhow::Error::msg)
        .context("initializing logging")?;

    info!(
        addr = %config.http_addr(),
        verify_identity = config.verification.verify_identity,
        storage = ?config.storage.backend,
        "Starting discovery runtime"
    );

    let runtime = DiscoveryRuntime::build(config).context("wiring components")?;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
    };

    runtime.run(shutdown).await.context("serving")?;
    Ok(())
}
