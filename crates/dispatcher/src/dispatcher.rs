//! Dispatcher - fan-in from collectors, fan-out to handlers

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use contracts::{AgentError, Measurement, Options};

use crate::handle::{HandlerConfig, HandlerHandle};
use crate::metrics::MetricsSnapshot;
use crate::sinks::{DebugEmitter, FileEmitter};

/// Create a HandlerHandle for a configured handler name
///
/// The engine-level options (`interval`, `max_buffer_size`,
/// `queue_capacity`) go through the shared coercion; everything else is the
/// emitter's business.
pub fn create_handler_handle(
    name: &str,
    options: &Options,
    prefix: &str,
    default_dimensions: &HashMap<String, String>,
) -> Result<HandlerHandle, AgentError> {
    let mut config = HandlerConfig {
        prefix: prefix.to_string(),
        default_dimensions: default_dimensions.clone(),
        ..Default::default()
    };
    config.apply_options(options);

    match name {
        "Debug" => Ok(HandlerHandle::spawn(DebugEmitter::new(name), config)),
        "File" => {
            let emitter = FileEmitter::from_options(name, options)
                .map_err(|e| AgentError::emitter_creation(name, e.to_string()))?;
            Ok(HandlerHandle::spawn(emitter, config))
        }
        other => Err(AgentError::emitter_creation(other, "unknown handler type")),
    }
}

/// The router connecting every collector to every handler.
///
/// Wiring is fixed before `run` and never mutated afterwards.
pub struct Dispatcher {
    sources: Vec<(String, mpsc::Receiver<Measurement>)>,
    handles: Vec<HandlerHandle>,
}

impl Dispatcher {
    /// Create a dispatcher over the given handler handles
    pub fn new(handles: Vec<HandlerHandle>) -> Self {
        Self {
            sources: Vec::new(),
            handles,
        }
    }

    /// Register a collector's outbound channel
    pub fn add_source(&mut self, name: impl Into<String>, rx: mpsc::Receiver<Measurement>) {
        self.sources.push((name.into(), rx));
    }

    /// Number of registered sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Get counters for all handlers
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher until every source channel closes.
    ///
    /// One forwarder task per source keeps per-source arrival order intact
    /// at every handler; `try_send` keeps one saturated handler from
    /// blocking delivery to the rest. On completion the handlers are shut
    /// down in turn, each draining its queue and running a final flush.
    pub async fn run(self) {
        let handles = Arc::new(self.handles);

        info!(
            sources = self.sources.len(),
            handlers = handles.len(),
            "dispatcher started"
        );

        let mut forwarders: Vec<JoinHandle<()>> = Vec::with_capacity(self.sources.len());
        for (source, mut rx) in self.sources {
            let handles = Arc::clone(&handles);
            forwarders.push(tokio::spawn(async move {
                while let Some(measurement) = rx.recv().await {
                    for handle in handles.iter() {
                        handle.try_send(measurement.clone());
                    }
                }
                debug!(source = %source, "source channel closed");
            }));
        }

        for forwarder in forwarders {
            if let Err(e) = forwarder.await {
                error!(error = ?e, "forwarder task panicked");
            }
        }

        info!("dispatcher inputs closed, shutting down handlers");
        match Arc::try_unwrap(handles) {
            Ok(handles) => {
                for handle in handles {
                    handle.shutdown().await;
                }
            }
            Err(_) => error!("handler handles still referenced at shutdown"),
        }

        info!("dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
