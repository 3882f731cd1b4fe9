//! Diagnostic heartbeat collector
//!
//! Emits one random-valued gauge per tick. Useful for exercising the
//! pipeline end to end without any external dependency.

use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;

use contracts::{get_as_int, AgentError, Measurement, Options};

/// Default metric name when none is configured.
const DEFAULT_METRIC_NAME: &str = "DiagnosticMetric";

/// Collector emitting a synthetic gauge every tick.
pub struct DiagnosticCollector {
    name: String,
    interval: Duration,
    metric_name: String,
    outbound: mpsc::Sender<Measurement>,
}

impl DiagnosticCollector {
    pub fn new(
        name: impl Into<String>,
        outbound: mpsc::Sender<Measurement>,
        interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            interval,
            metric_name: DEFAULT_METRIC_NAME.to_string(),
            outbound,
        }
    }

    /// Configured metric name.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }
}

impl contracts::Collector for DiagnosticCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn configure(&mut self, options: &Options) {
        if let Some(value) = options.get("interval") {
            let secs = get_as_int(value, self.interval.as_secs() as i64).max(1);
            self.interval = Duration::from_secs(secs as u64);
        }
        if let Some(value) = options.get("metricName") {
            if let Some(name) = value.as_str() {
                self.metric_name = name.to_string();
            }
        }
    }

    async fn collect(&mut self) -> Result<(), AgentError> {
        let value = rand::rng().random_range(0.0..100.0);
        self.outbound
            .send(Measurement::gauge(&self.metric_name, value))
            .await
            .map_err(|_| AgentError::ChannelClosed {
                collector: self.name.clone(),
            })
    }
}
