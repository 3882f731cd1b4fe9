//! DebugEmitter - renders each measurement as one structured log line

use tracing::{info, warn};

use contracts::{Emitter, Measurement};

/// Diagnostic sink: one JSON log line per measurement of the batch
pub struct DebugEmitter {
    name: String,
}

impl DebugEmitter {
    /// Create a new DebugEmitter with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Emitter for DebugEmitter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn emit(&mut self, batch: &[Measurement]) -> bool {
        info!(emitter = %self.name, measurements = batch.len(), "starting to emit");

        if batch.is_empty() {
            warn!(emitter = %self.name, "skipping send because of an empty payload");
            return false;
        }

        for measurement in batch {
            match serde_json::to_string(measurement) {
                Ok(line) => info!(emitter = %self.name, measurement = %line),
                Err(e) => warn!(emitter = %self.name, error = %e, "unserializable measurement"),
            }
        }
        true
    }
}
