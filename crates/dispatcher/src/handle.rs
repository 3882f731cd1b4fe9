//! HandlerHandle - a handler's bounded queue, buffer, and flush worker
//!
//! The worker task is the single owner of the buffer: the inbound consume
//! loop and both flush triggers (size and time) run on it, so exactly one
//! flush can be in progress at any moment and nothing races on the buffer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use contracts::{get_as_int, Emitter, Measurement, Options};

use crate::metrics::HandlerMetrics;

/// Default flush interval in seconds.
const DEFAULT_INTERVAL_SECS: u64 = 10;
/// Default size trigger.
const DEFAULT_MAX_BUFFER_SIZE: usize = 100;
/// Default inbound queue capacity.
const DEFAULT_QUEUE_CAPACITY: usize = 500;

/// Buffering/flush engine configuration, shared by every handler type.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Time trigger: flush every `interval` regardless of buffer length
    pub interval: Duration,
    /// Size trigger: flush when the buffer reaches this length
    pub max_buffer_size: usize,
    /// Inbound queue capacity
    pub queue_capacity: usize,
    /// Prefix prepended to every measurement name
    pub prefix: String,
    /// Dimensions merged under each measurement's own
    pub default_dimensions: HashMap<String, String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            prefix: String::new(),
            default_dimensions: HashMap::new(),
        }
    }
}

impl HandlerConfig {
    /// Apply the common recognized options, keeping current values on
    /// absent keys and falling back with a warning on bad ones.
    pub fn apply_options(&mut self, options: &Options) {
        if let Some(value) = options.get("interval") {
            let secs = get_as_int(value, self.interval.as_secs() as i64).max(1);
            self.interval = Duration::from_secs(secs as u64);
        }
        if let Some(value) = options.get("max_buffer_size") {
            let size = get_as_int(value, self.max_buffer_size as i64).max(1);
            self.max_buffer_size = size as usize;
        }
        if let Some(value) = options.get("queue_capacity") {
            let capacity = get_as_int(value, self.queue_capacity as i64).max(1);
            self.queue_capacity = capacity as usize;
        }
    }
}

/// Handle to a running handler worker
pub struct HandlerHandle {
    /// Handler name
    name: String,
    /// Channel to send measurements to the worker
    tx: mpsc::Sender<Measurement>,
    /// Shared counters
    metrics: Arc<HandlerMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl HandlerHandle {
    /// Create a new HandlerHandle and spawn the worker task
    pub fn spawn<E: Emitter + Send + 'static>(emitter: E, config: HandlerConfig) -> Self {
        let name = emitter.name().to_string();
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let metrics = Arc::new(HandlerMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            handler_worker(emitter, rx, config, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get handler name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current counters
    pub fn metrics(&self) -> &Arc<HandlerMetrics> {
        &self.metrics
    }

    /// Send a measurement to the handler (non-blocking)
    ///
    /// Returns true if queued, false if the queue is full (measurement
    /// dropped for this handler only)
    pub fn try_send(&self, measurement: Measurement) -> bool {
        match self.tx.try_send(measurement) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(m)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    handler = %self.name,
                    measurement = %m.name,
                    "queue full, measurement dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(handler = %self.name, "handler worker closed unexpectedly");
                false
            }
        }
    }

    /// Shut the handler down gracefully: close the queue, let the worker
    /// drain it and run its final flush.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(handler = %self.name, error = ?e, "worker task panicked");
        }
        debug!(handler = %self.name, "handler shutdown complete");
    }
}

/// Worker task: consume the inbound queue, buffer, flush on size or time.
async fn handler_worker<E: Emitter>(
    mut emitter: E,
    mut rx: mpsc::Receiver<Measurement>,
    config: HandlerConfig,
    metrics: Arc<HandlerMetrics>,
    name: String,
) {
    let mut buffer: Vec<Measurement> = Vec::with_capacity(config.max_buffer_size);
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; consume it so the timer
    // measures a full interval from startup.
    ticker.tick().await;

    debug!(
        handler = %name,
        interval = ?config.interval,
        max_buffer_size = config.max_buffer_size,
        "handler worker started"
    );

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(measurement) => {
                    metrics.set_queue_len(rx.len());
                    let measurement = measurement
                        .with_prefix(&config.prefix)
                        .with_default_dimensions(&config.default_dimensions);
                    buffer.push(measurement);
                    metrics.inc_received_count();
                    if buffer.len() >= config.max_buffer_size {
                        flush(&mut emitter, &mut buffer, &metrics, &name).await;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                flush(&mut emitter, &mut buffer, &metrics, &name).await;
            }
        }
    }

    // Queue closed: deliver whatever is left before exiting.
    flush(&mut emitter, &mut buffer, &metrics, &name).await;
    debug!(handler = %name, "handler worker stopped");
}

/// One flush attempt.
///
/// The buffer is swapped for a fresh one before `emit` is awaited, so
/// measurements arriving mid-emit land in the new buffer and the in-flight
/// batch is an atomic snapshot. A failed emit drops the batch; any retry
/// policy belongs to the emitter.
async fn flush<E: Emitter>(
    emitter: &mut E,
    buffer: &mut Vec<Measurement>,
    metrics: &HandlerMetrics,
    name: &str,
) {
    if buffer.is_empty() {
        debug!(handler = %name, "nothing to flush");
        return;
    }

    let capacity = buffer.capacity();
    let batch = std::mem::replace(buffer, Vec::with_capacity(capacity));

    if emitter.emit(&batch).await {
        metrics.add_emitted_count(batch.len() as u64);
        metrics.inc_flush_count();
    } else {
        metrics.inc_emit_failure_count();
        warn!(
            handler = %name,
            measurements = batch.len(),
            "emit failed, dropping batch"
        );
    }
}
