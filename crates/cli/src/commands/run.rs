//! `run` command implementation - wires and runs the pipeline.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use collectors::CollectorHandle;
use dispatcher::Dispatcher;

use crate::cli::RunArgs;

/// Capacity of each collector's outbound channel. Rendezvous-style: a send
/// completes only when the dispatcher side is keeping up, which is the
/// pipeline's backpressure.
const COLLECTOR_CHANNEL_CAPACITY: usize = 1;

/// Execute the `run` command
pub async fn run_agent(args: &RunArgs) -> Result<()> {
    let config = config_loader::read_config(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    for warning in config_loader::validate(&config) {
        warn!(%warning, "configuration warning");
    }

    // Handlers first: every collector's output fans out to all of them.
    let mut handles = Vec::with_capacity(config.handlers.len());
    for (name, options) in &config.handlers {
        match dispatcher::create_handler_handle(
            name,
            options,
            &config.prefix,
            &config.default_dimensions,
        ) {
            Ok(handle) => {
                info!(handler = %name, "handler started");
                handles.push(handle);
            }
            Err(e) => warn!(handler = %name, error = %e, "skipping handler"),
        }
    }
    if handles.is_empty() {
        anyhow::bail!("no usable handlers configured");
    }

    let mut pipeline = Dispatcher::new(handles);

    // Collectors, each with its private outbound channel.
    let default_interval = Duration::from_secs(config.polling_interval_secs());
    let mut collector_handles: Vec<CollectorHandle> = Vec::new();
    for name in &config.collectors {
        let options = match config.collector_config(name) {
            Ok(options) => options,
            Err(e) => {
                error!(collector = %name, error = %e, "cannot read collector config, skipping");
                continue;
            }
        };

        let (tx, rx) = mpsc::channel(COLLECTOR_CHANNEL_CAPACITY);
        if let Some(handle) = collectors::create_collector(name, tx, default_interval, &options) {
            pipeline.add_source(name.clone(), rx);
            collector_handles.push(handle);
        }
    }
    if pipeline.source_count() == 0 {
        anyhow::bail!("no usable collectors configured");
    }

    info!(
        collectors = collector_handles.len(),
        "agent started, press Ctrl-C to stop"
    );

    let mut pipeline_join = pipeline.spawn();

    tokio::select! {
        result = &mut pipeline_join => {
            // All sources closed without a shutdown signal - collectors died.
            result.context("pipeline task failed")?;
            warn!("pipeline stopped on its own");
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!("received shutdown signal, draining");
        }
    }

    // Stopping the collectors closes their channels; the dispatcher drains
    // the handlers and runs their final flushes before returning.
    for handle in &collector_handles {
        handle.abort();
    }
    pipeline_join.await.context("pipeline task failed")?;

    info!("olivine finished");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
