//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::service::Service;

/// Execute the `run` command
pub async fn run_service(args: &RunArgs) -> Result<()> {
    let mut config =
        config_loader::ConfigLoader::load_from_env().context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(port) = args.udp_port {
        info!(port, "Overriding UDP port from CLI");
        config.ingest.port = port;
    }
    if let Some(port) = args.http_port {
        info!(port, "Overriding HTTP port from CLI");
        config.api.port = port;
    }

    info!(
        udp_port = config.ingest.port,
        http_port = config.api.port,
        workers = config.ingest.workers,
        queue_capacity = config.ingest.queue_capacity,
        storage = config.database.is_some(),
        "Configuration loaded"
    );

    // Initialize metrics exporter (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!(port = args.metrics_port, "Metrics endpoint available");
    }

    let mut service = Service::new(config);
    service.start().await.context("Service startup failed")?;

    info!("Service running, press Ctrl+C to stop");
    shutdown_signal().await;
    warn!("Received shutdown signal, stopping service...");

    let stats = service.stop().await;
    stats.print_summary();

    info!("GeoTrack finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
